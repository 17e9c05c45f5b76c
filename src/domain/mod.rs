//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod directory;
pub mod entities;
pub mod errors;

pub use directory::{filter_internal, in_network_doctors};
pub use entities::{
    AccountType, AudioAnswer, AudioQuestionInput, ChatMessage, Coordinates, DoctorProfile,
    DoctorSearchCriteria, ExternalDoctorProfile, InternalDoctorProfile, InviteStatus, Language,
    MedicalAnswer, MedicalQuestionInput, RegistrationInput, RegistrationOutput, Sender,
};
pub use errors::{AuthErrorKind, DomainError};
