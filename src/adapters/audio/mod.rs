//! Audio infrastructure adapters: microphone capture and speech output.

pub mod recorder;
pub mod speech;

pub use recorder::{MicRecorder, RecordingSession};
pub use speech::CommandSpeech;
