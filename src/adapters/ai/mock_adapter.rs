//! Mock model adapter for testing without API calls.
//!
//! Returns scripted responses in order, or canned responses when no
//! script is loaded. Counts invocations so tests can assert how many
//! remote calls a flow issued.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

use crate::domain::DomainError;
use crate::ports::{ModelPort, ModelRequest};

/// Mock model adapter.
///
/// Scripted responses are consumed front to back; with an empty script
/// the adapter fabricates a plausible response from the request shape.
/// Simulates network latency with a configurable delay.
pub struct MockModelAdapter {
    responses: Mutex<VecDeque<Result<String, DomainError>>>,
    calls: AtomicUsize,
    delay_ms: u64,
}

impl MockModelAdapter {
    /// Create a mock adapter with canned responses and no delay.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            delay_ms: 0,
        }
    }

    /// Create a mock adapter with canned responses and a custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            delay_ms,
        }
    }

    /// Create a mock adapter that replays the given responses in order.
    pub fn scripted(responses: Vec<Result<String, DomainError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            delay_ms: 0,
        }
    }

    /// Number of `generate` invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fabricate a response from the request shape when no script is
    /// loaded: transcription for audio requests, an answer otherwise.
    fn canned(request: &ModelRequest) -> String {
        if request.audio.is_some() {
            r#"{"transcription": "[MOCK] What should I do about a persistent cough?"}"#
                .to_string()
        } else {
            r#"{"answer": "[MOCK] This is a simulated assistant answer. Configure MEDILINGUA_MODEL_API_KEY for real responses, and consult a healthcare professional for medical advice."}"#
                .to_string()
        }
    }
}

impl Default for MockModelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelPort for MockModelAdapter {
    async fn generate(&self, request: ModelRequest) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        info!(
            has_audio = request.audio.is_some(),
            user_len = request.user.len(),
            "[MOCK] simulating model call"
        );

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match scripted {
            Some(response) => response,
            None => Ok(Self::canned(&request)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ModelAudio;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockModelAdapter::scripted(vec![
            Ok("first".to_string()),
            Err(DomainError::Remote("boom".into())),
        ]);

        let first = mock
            .generate(ModelRequest::text("s", "u"))
            .await
            .unwrap();
        assert_eq!(first, "first");

        let second = mock.generate(ModelRequest::text("s", "u")).await;
        assert!(matches!(second, Err(DomainError::Remote(_))));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_canned_response_follows_request_shape() {
        let mock = MockModelAdapter::new();

        let audio_request = ModelRequest::text("s", "u").with_audio(ModelAudio {
            base64_data: "AAAA".into(),
            format: "wav".into(),
        });
        let transcription = mock.generate(audio_request).await.unwrap();
        assert!(transcription.contains("transcription"));

        let answer = mock.generate(ModelRequest::text("s", "u")).await.unwrap();
        assert!(answer.contains("answer"));
    }
}
