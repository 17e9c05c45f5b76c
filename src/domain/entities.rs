//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/audio-device types here; these are mapped from adapters.
//! Flow inputs carry their own `validate()` so malformed data is rejected
//! at the boundary, before any remote call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::shared::data_uri;

/// Supported assistant languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    Wo,
}

impl Language {
    /// Human-readable language name as shown in the UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "Français",
            Language::Wo => "Wolof",
        }
    }

    /// Input prompt placeholder for the chat composer.
    pub fn placeholder(self) -> &'static str {
        match self {
            Language::En => "Type your question in English...",
            Language::Fr => "Tapez votre question en Français...",
            Language::Wo => "Bindal sa laaj ci Wolof...",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Wo => "wo",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the chat log.
///
/// Ids are handed out monotonically by the chat session; the
/// `is_typing` placeholder is a transient entry removed once the
/// corresponding response (or error) arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: Option<String>,
    /// Recorded audio for user messages, as a base64 data URI.
    pub audio_data_uri: Option<String>,
    pub language: Language,
    #[serde(default)]
    pub is_typing: bool,
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────
// Flow contracts
// ─────────────────────────────────────────────────────────────────────────

/// Input for the per-language medical question flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalQuestionInput {
    pub question: String,
}

impl MedicalQuestionInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.question.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "question",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Output of the medical question flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalAnswer {
    pub answer: String,
}

/// Input for the audio question flow: a recorded question as a
/// `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioQuestionInput {
    pub audio_data_uri: String,
}

impl AudioQuestionInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        data_uri::parse(&self.audio_data_uri).map_err(|reason| DomainError::Validation {
            field: "audio_data_uri",
            reason,
        })?;
        Ok(())
    }
}

/// Output of the audio question flow. Never partial: either both fields
/// are present or the whole flow failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAnswer {
    pub transcription: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Patient,
    Doctor,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Patient => write!(f, "patient"),
            AccountType::Doctor => write!(f, "doctor"),
        }
    }
}

/// Input for the registration flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub account_type: AccountType,
}

impl RegistrationInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "first_name",
                reason: "must not be empty".into(),
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "last_name",
                reason: "must not be empty".into(),
            });
        }
        if !is_valid_email(&self.email) {
            return Err(DomainError::Validation {
                field: "email",
                reason: "not a valid email address".into(),
            });
        }
        if self.password.len() < 6 {
            return Err(DomainError::Validation {
                field: "password",
                reason: "must be at least 6 characters".into(),
            });
        }
        Ok(())
    }
}

/// Output of the registration flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Minimal email shape check: one `@` with a dotted, non-empty domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Doctor search
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Criteria entered in the doctor search form. Absent fields match
/// everything in the internal filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorSearchCriteria {
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub radius_km: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    NotInvited,
    Invited,
}

/// Directory entry from the platform's own network. Immutable reference
/// data, never created or destroyed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalDoctorProfile {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub languages: Vec<String>,
    pub location: String,
    pub avatar_seed: String,
    pub bio: String,
}

/// A fabricated result from the mocked external search tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDoctorProfile {
    pub id: String,
    pub name: String,
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub languages: Option<Vec<String>>,
    pub external_profile_url: Option<String>,
    pub invite_status: InviteStatus,
}

/// Display-agnostic combined result, discriminated by `source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DoctorProfile {
    Internal(InternalDoctorProfile),
    External(ExternalDoctorProfile),
}

impl DoctorProfile {
    pub fn id(&self) -> &str {
        match self {
            DoctorProfile::Internal(d) => &d.id,
            DoctorProfile::External(d) => &d.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DoctorProfile::Internal(d) => &d.name,
            DoctorProfile::External(d) => &d.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_validation_rejects_blank() {
        let input = MedicalQuestionInput {
            question: "   ".into(),
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "question", .. }
        ));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("awa@example.com"));
        assert!(is_valid_email("a.b@clinic.sn"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.x"));
    }

    #[test]
    fn test_registration_validation_names_field() {
        let input = RegistrationInput {
            first_name: "Awa".into(),
            last_name: "Ndiaye".into(),
            email: "not-an-email".into(),
            password: "secret1".into(),
            account_type: AccountType::Patient,
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));
    }

    #[test]
    fn test_doctor_profile_tagged_by_source() {
        let external = DoctorProfile::External(ExternalDoctorProfile {
            id: "ext_1".into(),
            name: "Dr. Remote".into(),
            specialty: None,
            location: None,
            languages: None,
            external_profile_url: None,
            invite_status: InviteStatus::NotInvited,
        });
        let json = serde_json::to_value(&external).unwrap();
        assert_eq!(json["source"], "external");
        assert_eq!(json["invite_status"], "not_invited");

        let back: DoctorProfile = serde_json::from_value(json).unwrap();
        assert!(matches!(back, DoctorProfile::External(_)));
    }
}
