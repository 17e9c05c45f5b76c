//! User registration flow (simulated).
//!
//! Validates the registration contract and simulates the provider
//! outcome: an email containing "testfail" is reported as already taken,
//! anything else succeeds with a generated user id. No remote model call
//! is involved; real account creation lives behind the identity port.

use chrono::Utc;
use std::time::Duration;
use tracing::info;

use crate::domain::{DomainError, RegistrationInput, RegistrationOutput};

/// Default simulated provider latency.
const DEFAULT_DELAY_MS: u64 = 1000;

pub struct RegistrationFlow {
    delay: Duration,
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Register a new account. Input is validated before anything else;
    /// a validation failure never produces a `success: false` output.
    pub async fn register(
        &self,
        input: &RegistrationInput,
    ) -> Result<RegistrationOutput, DomainError> {
        input.validate()?;

        info!(
            email = %input.email,
            account_type = %input.account_type,
            "registering user (simulated)"
        );

        if input.email.contains("testfail") {
            return Ok(RegistrationOutput {
                success: false,
                message: Some("This email address is already registered.".into()),
                user_id: None,
            });
        }

        tokio::time::sleep(self.delay).await;

        let user_id = format!("{}-{}", input.account_type, Utc::now().timestamp_millis());
        Ok(RegistrationOutput {
            success: true,
            message: Some(format!(
                "User {} registered successfully as a {}.",
                input.first_name, input.account_type
            )),
            user_id: Some(user_id),
        })
    }
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}
