//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: console UI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive session (main menu -> chat / doctor search /
    /// registration / auth). Returns when the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
