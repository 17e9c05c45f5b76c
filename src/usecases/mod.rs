//! Application use cases. Orchestrate domain logic via ports.

pub mod audio_flow;
pub mod chat_service;
pub mod doctor_search;
pub mod question_flows;
pub mod registration;

pub use audio_flow::AudioQuestionFlow;
pub use chat_service::ChatService;
pub use doctor_search::{DoctorSearchService, SearchOutcome};
pub use question_flows::MedicalQaFlows;
pub use registration::RegistrationFlow;
