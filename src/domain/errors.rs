//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Validation and schema
//! errors are never retried; remote errors are converted to user-facing
//! messages at the call site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input, rejected at the flow boundary before any remote call.
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The remote model replied, but its output failed the declared shape.
    #[error("Model output did not match the expected schema: {0}")]
    OutputSchema(String),

    /// Network or model failure during a remote invocation.
    #[error("Remote invocation failed: {0}")]
    Remote(String),

    /// A remote call exceeded the configured deadline.
    #[error("Remote call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Authentication failed: {}", .0.user_message())]
    Auth(AuthErrorKind),

    /// Microphone or audio device access failure.
    #[error("Device access failed: {0}")]
    Device(String),

    /// Interactive prompt failure in the console UI.
    #[error("Input error: {0}")]
    Input(String),
}

/// The fixed set of identity-provider error conditions the UI reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    EmailAlreadyInUse,
    InvalidEmail,
    OperationNotAllowed,
    WeakPassword,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    PopupClosed,
    PopupDuplicate,
    CredentialConflict,
    Other(String),
}

impl AuthErrorKind {
    /// Stable user-facing message for each condition.
    pub fn user_message(&self) -> String {
        match self {
            AuthErrorKind::EmailAlreadyInUse => {
                "This email address is already in use.".into()
            }
            AuthErrorKind::InvalidEmail => "The email address is not valid.".into(),
            AuthErrorKind::OperationNotAllowed => {
                "This operation is not allowed. Please contact support.".into()
            }
            AuthErrorKind::WeakPassword => "The password is too weak.".into(),
            AuthErrorKind::UserDisabled => "This user account has been disabled.".into(),
            AuthErrorKind::UserNotFound => "No user found with this email.".into(),
            AuthErrorKind::WrongPassword => "Incorrect password.".into(),
            AuthErrorKind::PopupClosed => "Sign-in was cancelled before completing.".into(),
            AuthErrorKind::PopupDuplicate => {
                "Multiple sign-in attempts opened. Please try again.".into()
            }
            AuthErrorKind::CredentialConflict => {
                "An account already exists with the same email address but different \
                 sign-in credentials. Sign in using a provider associated with this \
                 email address."
                    .into()
            }
            AuthErrorKind::Other(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_names_offending_field() {
        let err = DomainError::Validation {
            field: "question",
            reason: "must not be empty".into(),
        };
        assert_eq!(err.to_string(), "Invalid question: must not be empty");
    }

    #[test]
    fn test_auth_error_carries_user_message() {
        let err = DomainError::Auth(AuthErrorKind::WrongPassword);
        assert!(err.to_string().contains("Incorrect password."));
    }
}
