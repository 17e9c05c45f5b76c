//! Audio question flow: transcribe, then answer.
//!
//! Two sequential remote calls composed atomically from the caller's
//! perspective: if transcription succeeds but answering fails, the whole
//! flow fails and no partial result is observable.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::domain::{AudioAnswer, AudioQuestionInput, DomainError};
use crate::ports::{ModelAudio, ModelPort, ModelRequest};
use crate::shared::data_uri;
use crate::usecases::question_flows::{call_model, parse_answer};

const TRANSCRIBE_SYSTEM: &str =
    "Transcribe the attached audio recording of a medical question. \
     Respond with valid JSON only, in the form {\"transcription\": \"...\"}.";

const ANSWER_SYSTEM: &str =
    "Answer the following medical question accurately and helpfully. \
     Respond with valid JSON only, in the form {\"answer\": \"...\"}.";

/// Composed transcription + question-answering flow.
pub struct AudioQuestionFlow {
    model: Arc<dyn ModelPort>,
    timeout: Duration,
}

impl AudioQuestionFlow {
    pub fn new(model: Arc<dyn ModelPort>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub async fn ask(&self, input: &AudioQuestionInput) -> Result<AudioAnswer, DomainError> {
        input.validate()?;

        // Already validated; parse again for the MIME type and payload.
        let uri = data_uri::parse(&input.audio_data_uri).map_err(|reason| {
            DomainError::Validation {
                field: "audio_data_uri",
                reason,
            }
        })?;
        let format = audio_format(&uri.mime_type);

        info!(mime = %uri.mime_type, "transcribing audio question");
        let transcribe = ModelRequest::text(TRANSCRIBE_SYSTEM, "Transcribe this recording.")
            .with_audio(ModelAudio {
                base64_data: uri.base64_payload,
                format: format.to_string(),
            });
        let raw = call_model(self.model.as_ref(), transcribe, self.timeout).await?;
        let transcription = parse_transcription(&raw)?;

        info!(
            transcription_len = transcription.len(),
            "answering transcribed question"
        );
        let answer_req = ModelRequest::text(ANSWER_SYSTEM, transcription.clone());
        let raw = call_model(self.model.as_ref(), answer_req, self.timeout).await?;
        let answer = parse_answer(&raw)?;

        Ok(AudioAnswer {
            transcription,
            answer: answer.answer,
        })
    }
}

/// Container format for the model attachment, from the MIME subtype
/// ("audio/wav" -> "wav").
fn audio_format(mime_type: &str) -> &str {
    mime_type.split_once('/').map_or(mime_type, |(_, sub)| sub)
}

fn parse_transcription(raw: &str) -> Result<String, DomainError> {
    #[derive(Deserialize)]
    struct TranscriptionPayload {
        transcription: String,
    }

    let payload: TranscriptionPayload = serde_json::from_str(raw).map_err(|e| {
        DomainError::OutputSchema(format!("expected {{\"transcription\"}}: {}", e))
    })?;
    if payload.transcription.trim().is_empty() {
        return Err(DomainError::OutputSchema("empty transcription".into()));
    }
    Ok(payload.transcription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockModelAdapter;

    fn wav_uri() -> String {
        data_uri::encode("audio/wav", b"RIFF-fake-bytes")
    }

    #[tokio::test]
    async fn test_transcribe_then_answer() {
        let mock = Arc::new(MockModelAdapter::scripted(vec![
            Ok(r#"{"transcription": "what causes malaria"}"#.to_string()),
            Ok(r#"{"answer": "Malaria is caused by Plasmodium parasites."}"#.to_string()),
        ]));
        let flow = AudioQuestionFlow::new(mock.clone(), Duration::from_secs(5));

        let out = flow
            .ask(&AudioQuestionInput {
                audio_data_uri: wav_uri(),
            })
            .await
            .unwrap();

        assert_eq!(out.transcription, "what causes malaria");
        assert!(out.answer.contains("Plasmodium"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_answer_failure_discards_transcription() {
        // Transcription succeeds, answering fails: the composed call must
        // fail as a whole with no partial result.
        let mock = Arc::new(MockModelAdapter::scripted(vec![
            Ok(r#"{"transcription": "what causes malaria"}"#.to_string()),
            Err(DomainError::Remote("model unavailable".into())),
        ]));
        let flow = AudioQuestionFlow::new(mock.clone(), Duration::from_secs(5));

        let err = flow
            .ask(&AudioQuestionInput {
                audio_data_uri: wav_uri(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Remote(_)));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_data_uri_fails_before_any_call() {
        let mock = Arc::new(MockModelAdapter::new());
        let flow = AudioQuestionFlow::new(mock.clone(), Duration::from_secs(5));

        let err = flow
            .ask(&AudioQuestionInput {
                audio_data_uri: "not-a-data-uri".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation {
                field: "audio_data_uri",
                ..
            }
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transcription_failure_skips_answer_call() {
        let mock = Arc::new(MockModelAdapter::scripted(vec![Err(DomainError::Remote(
            "bad audio".into(),
        ))]));
        let flow = AudioQuestionFlow::new(mock.clone(), Duration::from_secs(5));

        let err = flow
            .ask(&AudioQuestionInput {
                audio_data_uri: wav_uri(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Remote(_)));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_audio_format_from_mime() {
        assert_eq!(audio_format("audio/wav"), "wav");
        assert_eq!(audio_format("audio/webm"), "webm");
    }
}
