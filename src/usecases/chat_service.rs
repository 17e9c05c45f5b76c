//! Chat session state machine.
//!
//! Owns the ordered message log and the transient typing placeholder.
//! Each exchange runs Submitted -> AwaitingResponse -> Resolved | Errored:
//! the user message is appended optimistically, a single typing
//! placeholder is appended while exactly one flow call is in flight, and
//! the placeholder is removed exactly once when the response or error
//! arrives. Exchanges are serialized by the `&mut self` borrow; the log
//! is append-only except for the audio transcription update, which
//! mutates the originating user message in place, matched by id.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{
    AudioQuestionInput, ChatMessage, DomainError, Language, MedicalQuestionInput, Sender,
};
use crate::ports::SpeechPort;
use crate::usecases::{AudioQuestionFlow, MedicalQaFlows};

/// Provisional text shown on an audio message until its transcription
/// arrives.
pub const AUDIO_PROCESSING_TEXT: &str = "🎤 Processing audio...";

pub struct ChatService {
    qa: Arc<MedicalQaFlows>,
    audio_qa: Arc<AudioQuestionFlow>,
    speech: Arc<dyn SpeechPort>,
    messages: Vec<ChatMessage>,
    next_id: u64,
    language: Language,
    speaking: Option<tokio::task::AbortHandle>,
}

impl ChatService {
    pub fn new(
        qa: Arc<MedicalQaFlows>,
        audio_qa: Arc<AudioQuestionFlow>,
        speech: Arc<dyn SpeechPort>,
        language: Language,
    ) -> Self {
        Self {
            qa,
            audio_qa,
            speech,
            messages: Vec::new(),
            next_id: 0,
            language,
            speaking: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        info!(%language, "chat language switched");
        self.language = language;
    }

    /// Last bot answer in the log, if any (skips placeholders).
    pub fn last_bot_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Bot && !m.is_typing)
    }

    /// Submit a text question in the selected language.
    ///
    /// On error the placeholder is removed and a user-facing bot message
    /// is appended; the error is also returned so the UI can surface it.
    /// The session is never blocked by a failed exchange.
    pub async fn submit_text(&mut self, text: &str) -> Result<(), DomainError> {
        let language = self.language;
        self.push_message(Sender::User, Some(text.to_string()), None, false);
        self.push_typing();

        let input = MedicalQuestionInput {
            question: text.to_string(),
        };
        match self.qa.for_language(language, &input).await {
            Ok(response) => {
                self.remove_typing();
                self.push_message(Sender::Bot, Some(response.answer), None, false);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "text exchange failed");
                self.remove_typing();
                self.push_message(
                    Sender::Bot,
                    Some(format!("Sorry, I couldn't process your request. {}", err)),
                    None,
                    false,
                );
                Err(err)
            }
        }
    }

    /// Submit a recorded audio question.
    ///
    /// The user message is appended with provisional processing text and
    /// updated in place (matched by id, never by content) once the
    /// transcription arrives with the answer. If the composed flow fails,
    /// the provisional text is left untouched; no partial transcription
    /// is ever shown.
    pub async fn submit_audio(&mut self, audio_data_uri: String) -> Result<(), DomainError> {
        let user_id = self.push_message(
            Sender::User,
            Some(AUDIO_PROCESSING_TEXT.to_string()),
            Some(audio_data_uri.clone()),
            false,
        );
        self.push_typing();

        let input = AudioQuestionInput { audio_data_uri };
        match self.audio_qa.ask(&input).await {
            Ok(response) => {
                self.update_message_text(
                    user_id,
                    format!("🎤 Transcription: \"{}\"", response.transcription),
                );
                self.remove_typing();
                self.push_message(Sender::Bot, Some(response.answer), None, false);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "audio exchange failed");
                self.remove_typing();
                self.push_message(
                    Sender::Bot,
                    Some(format!("Sorry, I couldn't process your audio. {}", err)),
                    None,
                    false,
                );
                Err(err)
            }
        }
    }

    /// Speak a bot answer aloud. Starting a new utterance aborts any
    /// in-progress one; utterances are never queued.
    pub fn speak(&mut self, text: &str, language: Language) -> Result<(), DomainError> {
        self.stop_speaking();

        if !self.speech.supports(language) {
            return Err(DomainError::Device(format!(
                "no speech voice available for {}",
                language.display_name()
            )));
        }

        let speech = Arc::clone(&self.speech);
        let text = text.to_string();
        let task = tokio::spawn(async move {
            if let Err(err) = speech.speak(&text, language).await {
                warn!(error = %err, "speech synthesis failed");
            }
        });
        self.speaking = Some(task.abort_handle());
        Ok(())
    }

    /// Cancel an in-progress utterance, if any.
    pub fn stop_speaking(&mut self) {
        if let Some(handle) = self.speaking.take() {
            handle.abort();
        }
    }

    fn push_message(
        &mut self,
        sender: Sender,
        text: Option<String>,
        audio_data_uri: Option<String>,
        is_typing: bool,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text,
            audio_data_uri,
            language: self.language,
            is_typing,
            timestamp: Utc::now(),
        });
        id
    }

    fn push_typing(&mut self) {
        debug_assert_eq!(self.typing_count(), 0, "typing placeholder already present");
        self.push_message(Sender::Bot, None, None, true);
    }

    fn remove_typing(&mut self) {
        debug_assert!(self.typing_count() <= 1);
        self.messages.retain(|m| !m.is_typing);
    }

    fn update_message_text(&mut self, id: u64, text: String) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.text = Some(text);
        }
    }

    fn typing_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_typing).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockModelAdapter;
    use crate::shared::data_uri;
    use std::time::Duration;

    struct SilentSpeech;

    #[async_trait::async_trait]
    impl SpeechPort for SilentSpeech {
        async fn speak(&self, _text: &str, _language: Language) -> Result<(), DomainError> {
            Ok(())
        }

        fn supports(&self, language: Language) -> bool {
            language != Language::Wo
        }
    }

    fn service(mock: Arc<MockModelAdapter>) -> ChatService {
        let timeout = Duration::from_secs(5);
        ChatService::new(
            Arc::new(MedicalQaFlows::new(mock.clone(), timeout)),
            Arc::new(AudioQuestionFlow::new(mock, timeout)),
            Arc::new(SilentSpeech),
            Language::En,
        )
    }

    fn typing_count(chat: &ChatService) -> usize {
        chat.messages().iter().filter(|m| m.is_typing).count()
    }

    #[tokio::test]
    async fn test_resolved_exchange_appends_user_and_bot() {
        let mock = Arc::new(MockModelAdapter::scripted(vec![Ok(
            r#"{"answer": "Rest and hydrate."}"#.to_string(),
        )]));
        let mut chat = service(mock);

        chat.submit_text("I have a fever").await.unwrap();

        let log = chat.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, Sender::User);
        assert_eq!(log[1].sender, Sender::Bot);
        assert_eq!(log[1].text.as_deref(), Some("Rest and hydrate."));
        assert_eq!(typing_count(&chat), 0);
        assert!(log[0].id < log[1].id);
    }

    #[tokio::test]
    async fn test_errored_exchange_does_not_block_session() {
        let mock = Arc::new(MockModelAdapter::scripted(vec![
            Err(DomainError::Remote("upstream down".into())),
            Ok(r#"{"answer": "Better now."}"#.to_string()),
        ]));
        let mut chat = service(mock);

        let err = chat.submit_text("first try").await.unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));
        assert_eq!(typing_count(&chat), 0);
        let error_msg = chat.last_bot_message().unwrap();
        assert!(error_msg.text.as_deref().unwrap().starts_with("Sorry"));

        // The user may submit again immediately.
        chat.submit_text("second try").await.unwrap();
        assert_eq!(typing_count(&chat), 0);
        assert_eq!(
            chat.last_bot_message().unwrap().text.as_deref(),
            Some("Better now.")
        );
    }

    #[tokio::test]
    async fn test_audio_exchange_updates_user_message_in_place() {
        let mock = Arc::new(MockModelAdapter::scripted(vec![
            Ok(r#"{"transcription": "what is hypertension"}"#.to_string()),
            Ok(r#"{"answer": "High blood pressure."}"#.to_string()),
        ]));
        let mut chat = service(mock);
        let uri = data_uri::encode("audio/wav", b"fake");

        chat.submit_audio(uri.clone()).await.unwrap();

        let log = chat.messages();
        assert_eq!(log.len(), 2);
        let user_msg = &log[0];
        assert_eq!(
            user_msg.text.as_deref(),
            Some("🎤 Transcription: \"what is hypertension\"")
        );
        assert_eq!(user_msg.audio_data_uri.as_deref(), Some(uri.as_str()));
        assert_eq!(
            chat.last_bot_message().unwrap().text.as_deref(),
            Some("High blood pressure.")
        );
        assert_eq!(typing_count(&chat), 0);
    }

    #[tokio::test]
    async fn test_failed_audio_exchange_keeps_provisional_text() {
        // Transcription succeeds but answering fails: the composed flow
        // surfaces no partial result, so the provisional text stays.
        let mock = Arc::new(MockModelAdapter::scripted(vec![
            Ok(r#"{"transcription": "should not appear"}"#.to_string()),
            Err(DomainError::Remote("upstream down".into())),
        ]));
        let mut chat = service(mock);

        let err = chat
            .submit_audio(data_uri::encode("audio/wav", b"fake"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));

        let user_msg = &chat.messages()[0];
        assert_eq!(user_msg.text.as_deref(), Some(AUDIO_PROCESSING_TEXT));
        assert!(chat
            .last_bot_message()
            .unwrap()
            .text
            .as_deref()
            .unwrap()
            .starts_with("Sorry, I couldn't process your audio."));
        assert_eq!(typing_count(&chat), 0);
    }

    #[tokio::test]
    async fn test_speak_rejects_unsupported_language() {
        let mut chat = service(Arc::new(MockModelAdapter::new()));
        let err = chat.speak("Dalal ak jamm", Language::Wo).unwrap_err();
        assert!(matches!(err, DomainError::Device(_)));
    }

    #[tokio::test]
    async fn test_new_utterance_replaces_previous() {
        let mut chat = service(Arc::new(MockModelAdapter::new()));
        chat.speak("first", Language::En).unwrap();
        chat.speak("second", Language::Fr).unwrap();
        // Only the latest utterance is tracked; stopping clears it.
        chat.stop_speaking();
        assert!(chat.speaking.is_none());
    }
}
