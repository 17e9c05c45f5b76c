//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use tokio::sync::watch;

use crate::domain::{DomainError, DoctorSearchCriteria, ExternalDoctorProfile, Language};

/// A rendered prompt for one remote model invocation.
///
/// Flows own the templates and the output schemas; the adapter owns the
/// transport. `json_output` asks the backend for a JSON object response;
/// the flow re-validates the shape regardless.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: Option<String>,
    pub user: String,
    /// Inline audio attachment for transcription requests.
    pub audio: Option<ModelAudio>,
    pub json_output: bool,
}

impl ModelRequest {
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
            audio: None,
            json_output: true,
        }
    }

    pub fn with_audio(mut self, audio: ModelAudio) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// Audio payload attached to a model request, as carried by the data URI.
#[derive(Debug, Clone)]
pub struct ModelAudio {
    /// Base64-encoded audio bytes.
    pub base64_data: String,
    /// Container format derived from the MIME type, e.g. "wav".
    pub format: String,
}

/// Remote model gateway. One call per invocation; the adapter returns the
/// raw (sanitized) response text and the flow validates it.
#[async_trait::async_trait]
pub trait ModelPort: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<String, DomainError>;
}

/// External doctor lookup tool (mocked; no real network search).
#[async_trait::async_trait]
pub trait ExternalSearchPort: Send + Sync {
    /// Search for out-of-network doctors. Returns 0-2 fabricated results,
    /// deterministic for the same criteria.
    async fn search(
        &self,
        criteria: &DoctorSearchCriteria,
    ) -> Result<Vec<ExternalDoctorProfile>, DomainError>;
}

/// A signed-in identity-provider user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Third-party identity provider boundary.
#[async_trait::async_trait]
pub trait IdentityPort: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, DomainError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DomainError>;

    /// Federated (OAuth popup) sign-in. Not available in a console
    /// session; adapters surface the popup error conditions instead.
    async fn sign_in_federated(&self) -> Result<AuthUser, DomainError>;

    async fn sign_out(&self) -> Result<(), DomainError>;

    /// Observable current-user stream. Emits on sign-in and sign-out.
    fn current_user(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Speech synthesis output. One utterance at a time; the caller cancels
/// an in-progress utterance by aborting the task driving `speak`.
#[async_trait::async_trait]
pub trait SpeechPort: Send + Sync {
    /// Speak the text aloud. Resolves when the utterance finishes.
    async fn speak(&self, text: &str, language: Language) -> Result<(), DomainError>;

    /// Whether a voice exists for the language (no Wolof voice exists).
    fn supports(&self, language: Language) -> bool;
}
