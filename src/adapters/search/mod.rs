//! External doctor lookup adapters. Implement ExternalSearchPort.

pub mod mock_external;

pub use mock_external::MockExternalSearch;
