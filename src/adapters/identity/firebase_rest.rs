//! Firebase-style REST identity adapter.
//!
//! Targets the Identity Toolkit password endpoints and maps the
//! provider's error codes onto the fixed `AuthErrorKind` set the UI
//! reacts to. The current user is published over a watch channel so
//! auth-dependent screens can observe presence changes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{AuthErrorKind, DomainError};
use crate::ports::{AuthUser, IdentityPort};

pub struct FirebaseRestIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    current: watch::Sender<Option<AuthUser>>,
}

impl FirebaseRestIdentity {
    /// Create a new identity adapter.
    ///
    /// # Arguments
    /// * `base_url` - API base (e.g., "https://identitytoolkit.googleapis.com/v1")
    /// * `api_key` - Web API key of the identity project
    pub fn new(base_url: String, api_key: String) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            current,
        }
    }

    async fn password_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, DomainError> {
        let url = format!(
            "{}/accounts:{}?key={}",
            self.base_url, endpoint, self.api_key
        );
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("identity request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let payload: ErrorEnvelope = response.json().await.unwrap_or_default();
            let code = payload.error.message;
            warn!(status = %status, code = %code, "identity API returned error");
            return Err(DomainError::Auth(map_error_code(&code)));
        }

        let payload: AuthResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Remote(format!("malformed identity response: {}", e)))?;

        let user = AuthUser {
            uid: payload.local_id,
            email: payload.email,
            display_name: payload.display_name,
        };
        self.current.send_replace(Some(user.clone()));
        info!(uid = %user.uid, "signed in");
        Ok(user)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a provider error code to the fixed condition set.
///
/// Codes may carry a trailing explanation ("WEAK_PASSWORD : Password
/// should be at least 6 characters"); only the leading token counts.
fn map_error_code(code: &str) -> AuthErrorKind {
    let token = code
        .split([' ', ':'])
        .next()
        .unwrap_or(code)
        .trim();
    match token {
        "EMAIL_EXISTS" => AuthErrorKind::EmailAlreadyInUse,
        "INVALID_EMAIL" => AuthErrorKind::InvalidEmail,
        "OPERATION_NOT_ALLOWED" => AuthErrorKind::OperationNotAllowed,
        "WEAK_PASSWORD" => AuthErrorKind::WeakPassword,
        "USER_DISABLED" => AuthErrorKind::UserDisabled,
        "EMAIL_NOT_FOUND" => AuthErrorKind::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthErrorKind::WrongPassword,
        "ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL" | "FEDERATED_USER_ID_ALREADY_LINKED" => {
            AuthErrorKind::CredentialConflict
        }
        "POPUP_CLOSED_BY_USER" => AuthErrorKind::PopupClosed,
        "CANCELLED_POPUP_REQUEST" => AuthErrorKind::PopupDuplicate,
        other => AuthErrorKind::Other(other.to_string()),
    }
}

#[async_trait::async_trait]
impl IdentityPort for FirebaseRestIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, DomainError> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DomainError> {
        self.password_request("signInWithPassword", email, password)
            .await
    }

    async fn sign_in_federated(&self) -> Result<AuthUser, DomainError> {
        // The OAuth popup flow needs a browser session; report the same
        // condition the UI already handles for a closed popup.
        Err(DomainError::Auth(AuthErrorKind::PopupClosed))
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.current.send_replace(None);
        info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(map_error_code("EMAIL_EXISTS"), AuthErrorKind::EmailAlreadyInUse);
        assert_eq!(map_error_code("INVALID_EMAIL"), AuthErrorKind::InvalidEmail);
        assert_eq!(map_error_code("EMAIL_NOT_FOUND"), AuthErrorKind::UserNotFound);
        assert_eq!(map_error_code("INVALID_PASSWORD"), AuthErrorKind::WrongPassword);
        assert_eq!(map_error_code("USER_DISABLED"), AuthErrorKind::UserDisabled);
        assert_eq!(
            map_error_code("ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL"),
            AuthErrorKind::CredentialConflict
        );
    }

    #[test]
    fn test_error_code_with_trailing_explanation() {
        assert_eq!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorKind::WeakPassword
        );
    }

    #[test]
    fn test_unknown_code_preserved() {
        assert_eq!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthErrorKind::Other("TOO_MANY_ATTEMPTS_TRY_LATER".into())
        );
    }

    #[tokio::test]
    async fn test_sign_out_publishes_absence() {
        let adapter = FirebaseRestIdentity::new("http://localhost".into(), "key".into());
        let rx = adapter.current_user();

        adapter.current.send_replace(Some(AuthUser {
            uid: "u1".into(),
            email: "awa@example.com".into(),
            display_name: None,
        }));
        assert!(rx.borrow().is_some());

        adapter.sign_out().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_federated_sign_in_reports_popup_condition() {
        let adapter = FirebaseRestIdentity::new("http://localhost".into(), "key".into());
        let err = adapter.sign_in_federated().await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Auth(AuthErrorKind::PopupClosed)
        ));
    }
}
