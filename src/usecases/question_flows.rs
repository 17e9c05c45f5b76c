//! Per-language medical question flows.
//!
//! Each flow validates its input, issues exactly one remote model call
//! with a language-specific instruction, and re-validates the model's
//! structured output before returning it. A malformed model response is
//! an `OutputSchema` error, never passed through.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{DomainError, Language, MedicalAnswer, MedicalQuestionInput};
use crate::ports::{ModelPort, ModelRequest};

/// Medical question-answering flows, one named operation per language.
pub struct MedicalQaFlows {
    model: Arc<dyn ModelPort>,
    timeout: Duration,
}

impl MedicalQaFlows {
    pub fn new(model: Arc<dyn ModelPort>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Answer a medical question in English.
    pub async fn english(&self, input: &MedicalQuestionInput) -> Result<MedicalAnswer, DomainError> {
        self.ask(Language::En, input).await
    }

    /// Answer a medical question in French.
    pub async fn french(&self, input: &MedicalQuestionInput) -> Result<MedicalAnswer, DomainError> {
        self.ask(Language::Fr, input).await
    }

    /// Answer a medical question in Wolof.
    pub async fn wolof(&self, input: &MedicalQuestionInput) -> Result<MedicalAnswer, DomainError> {
        self.ask(Language::Wo, input).await
    }

    /// Route to the flow matching the given language.
    pub async fn for_language(
        &self,
        language: Language,
        input: &MedicalQuestionInput,
    ) -> Result<MedicalAnswer, DomainError> {
        self.ask(language, input).await
    }

    async fn ask(
        &self,
        language: Language,
        input: &MedicalQuestionInput,
    ) -> Result<MedicalAnswer, DomainError> {
        input.validate()?;

        info!(
            %language,
            question_len = input.question.len(),
            "sending medical question to model"
        );

        let request = ModelRequest::text(system_prompt(language), input.question.clone());
        let raw = call_model(self.model.as_ref(), request, self.timeout).await?;
        let answer = parse_answer(&raw)?;

        debug!(%language, answer_len = answer.answer.len(), "medical question answered");
        Ok(answer)
    }
}

/// Invoke the model with the configured deadline. A hung remote call must
/// not hang the session indefinitely.
pub(crate) async fn call_model(
    model: &dyn ModelPort,
    request: ModelRequest,
    timeout: Duration,
) -> Result<String, DomainError> {
    tokio::time::timeout(timeout, model.generate(request))
        .await
        .map_err(|_| DomainError::Timeout {
            secs: timeout.as_secs(),
        })?
}

/// Parse and re-validate the `{ "answer": ... }` output shape.
pub(crate) fn parse_answer(raw: &str) -> Result<MedicalAnswer, DomainError> {
    #[derive(Deserialize)]
    struct AnswerPayload {
        answer: String,
    }

    let payload: AnswerPayload = serde_json::from_str(raw)
        .map_err(|e| DomainError::OutputSchema(format!("expected {{\"answer\"}}: {}", e)))?;
    if payload.answer.trim().is_empty() {
        return Err(DomainError::OutputSchema("empty answer".into()));
    }
    Ok(MedicalAnswer {
        answer: payload.answer,
    })
}

fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::En => {
            "You are a helpful AI assistant that answers medical questions in English. \
             Answer the user's question accurately and provide helpful information. \
             Respond with valid JSON only, in the form {\"answer\": \"...\"}."
        }
        Language::Fr => {
            "You are a helpful AI assistant that answers medical questions in French. \
             Answer the user's question in French, accurately and helpfully. \
             Respond with valid JSON only, in the form {\"answer\": \"...\"}."
        }
        Language::Wo => {
            "You are a helpful AI assistant specializing in providing medical \
             information in Wolof. Answer the user's question in Wolof. \
             Respond with valid JSON only, in the form {\"answer\": \"...\"}."
        }
    }
}
