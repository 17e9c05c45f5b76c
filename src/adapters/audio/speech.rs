//! Speech synthesis via an external TTS command.
//!
//! Shells out to a speech program (espeak-ng by default) rather than
//! binding a synthesis library. The child is killed on drop, so
//! aborting the task driving `speak` cancels the utterance mid-word.

use tokio::process::Command;
use tracing::debug;

use crate::domain::{DomainError, Language};
use crate::ports::SpeechPort;

pub struct CommandSpeech {
    program: String,
}

impl CommandSpeech {
    pub fn new(program: String) -> Self {
        Self { program }
    }

    /// espeak-ng voice identifier, if one exists for the language.
    fn voice(language: Language) -> Option<&'static str> {
        match language {
            Language::En => Some("en"),
            Language::Fr => Some("fr"),
            // No synthesis voice exists for Wolof.
            Language::Wo => None,
        }
    }
}

#[async_trait::async_trait]
impl SpeechPort for CommandSpeech {
    async fn speak(&self, text: &str, language: Language) -> Result<(), DomainError> {
        let voice = Self::voice(language).ok_or_else(|| {
            DomainError::Device(format!("no speech voice for language: {}", language))
        })?;

        debug!(%language, chars = text.len(), "speaking");
        let status = Command::new(&self.program)
            .arg("-v")
            .arg(voice)
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                DomainError::Device(format!("failed to launch {}: {}", self.program, e))
            })?;

        if !status.success() {
            return Err(DomainError::Device(format!(
                "{} exited with status {}",
                self.program, status
            )));
        }
        Ok(())
    }

    fn supports(&self, language: Language) -> bool {
        Self::voice(language).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_support_by_language() {
        let speech = CommandSpeech::new("espeak-ng".into());
        assert!(speech.supports(Language::En));
        assert!(speech.supports(Language::Fr));
        assert!(!speech.supports(Language::Wo));
    }

    #[tokio::test]
    async fn test_unsupported_language_is_device_error() {
        let speech = CommandSpeech::new("espeak-ng".into());
        let err = speech.speak("Salaam", Language::Wo).await.unwrap_err();
        assert!(matches!(err, DomainError::Device(_)));
    }
}
