//! Infrastructure adapters. Implement outbound ports.
//!
//! Model backend, mock external search, identity provider, audio
//! devices, console UI. Map infrastructure errors to DomainError.

pub mod ai;
pub mod audio;
pub mod identity;
pub mod search;
pub mod ui;
