//! Shared infrastructure helpers: configuration and the audio data-URI codec.

pub mod config;
pub mod data_uri;
