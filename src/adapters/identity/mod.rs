//! Identity provider adapters. Implement IdentityPort.

pub mod firebase_rest;

pub use firebase_rest::FirebaseRestIdentity;
