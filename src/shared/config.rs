//! Application configuration. Model API credentials, timeouts, identity API.

use serde::Deserialize;

/// Default per-call deadline for remote model invocations (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default artificial latency of the mocked external doctor search (ms).
pub const DEFAULT_EXTERNAL_SEARCH_DELAY_MS: u64 = 1500;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Model API key (e.g., OpenAI). Read from MEDILINGUA_MODEL_API_KEY.
    #[serde(default)]
    pub model_api_key: Option<String>,

    /// Model API URL. Defaults to OpenAI. Read from MEDILINGUA_MODEL_API_URL.
    #[serde(default)]
    pub model_api_url: Option<String>,

    /// Model name. Defaults to "gpt-4o-mini". Read from MEDILINGUA_MODEL_NAME.
    #[serde(default)]
    pub model_name: Option<String>,

    /// Per-call deadline for remote model invocations, in seconds.
    /// Read from MEDILINGUA_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Artificial latency of the mocked external doctor search, in ms.
    /// Read from MEDILINGUA_EXTERNAL_SEARCH_DELAY_MS.
    #[serde(default)]
    pub external_search_delay_ms: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────
    // Identity provider (Firebase-style REST API)
    // ─────────────────────────────────────────────────────────────────────
    /// Identity API key. Read from MEDILINGUA_IDENTITY_API_KEY.
    #[serde(default)]
    pub identity_api_key: Option<String>,

    /// Identity API base URL. Read from MEDILINGUA_IDENTITY_API_URL.
    #[serde(default)]
    pub identity_api_url: Option<String>,

    /// External speech synthesizer command. Read from MEDILINGUA_TTS_COMMAND.
    #[serde(default)]
    pub tts_command: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("MEDILINGUA"));
        if let Ok(path) = std::env::var("MEDILINGUA_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the model API key if configured.
    pub fn model_api_key(&self) -> Option<String> {
        self.model_api_key
            .clone()
            .or_else(|| std::env::var("MEDILINGUA_MODEL_API_KEY").ok())
    }

    /// Returns the model API URL. Defaults to the OpenAI chat completions endpoint.
    pub fn model_api_url_or_default(&self) -> String {
        self.model_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the model name. Defaults to "gpt-4o-mini".
    pub fn model_name_or_default(&self) -> String {
        self.model_name
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// Returns true if a remote model backend is configured (API key present).
    pub fn is_model_configured(&self) -> bool {
        self.model_api_key().is_some()
    }

    /// Per-call deadline for remote invocations. Defaults to 30s.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Mock external search latency. Defaults to 1500ms.
    pub fn external_search_delay_ms_or_default(&self) -> u64 {
        self.external_search_delay_ms
            .unwrap_or(DEFAULT_EXTERNAL_SEARCH_DELAY_MS)
    }

    /// Returns the identity API key if configured.
    pub fn identity_api_key(&self) -> Option<String> {
        self.identity_api_key
            .clone()
            .or_else(|| std::env::var("MEDILINGUA_IDENTITY_API_KEY").ok())
    }

    /// Returns the identity API base URL. Defaults to the Google Identity
    /// Toolkit endpoint.
    pub fn identity_api_url_or_default(&self) -> String {
        self.identity_api_url
            .clone()
            .unwrap_or_else(|| "https://identitytoolkit.googleapis.com/v1".to_string())
    }

    /// Returns true if the identity provider is configured.
    pub fn is_identity_configured(&self) -> bool {
        self.identity_api_key().is_some()
    }

    /// Speech synthesizer command. Defaults to "espeak-ng".
    pub fn tts_command_or_default(&self) -> String {
        self.tts_command
            .clone()
            .unwrap_or_else(|| "espeak-ng".to_string())
    }
}
