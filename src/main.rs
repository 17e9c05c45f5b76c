//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;

use medilingua::adapters::ai::{MockModelAdapter, OpenAiAdapter};
use medilingua::adapters::audio::CommandSpeech;
use medilingua::adapters::identity::FirebaseRestIdentity;
use medilingua::adapters::search::MockExternalSearch;
use medilingua::adapters::ui::tui::TuiInputPort;
use medilingua::domain::Language;
use medilingua::ports::{ExternalSearchPort, IdentityPort, InputPort, ModelPort, SpeechPort};
use medilingua::usecases::{
    AudioQuestionFlow, ChatService, DoctorSearchService, MedicalQaFlows, RegistrationFlow,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    medilingua::adapters::ui::init_ui();

    let cfg = medilingua::shared::config::AppConfig::load().unwrap_or_default();

    // --- Model backend (remote when configured, canned mock otherwise) ---
    let model: Arc<dyn ModelPort> = if cfg.is_model_configured() {
        info!(
            model = %cfg.model_name_or_default(),
            url = %cfg.model_api_url_or_default(),
            "remote model backend enabled"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.model_api_url_or_default(),
            cfg.model_api_key().unwrap_or_default(),
            cfg.model_name_or_default(),
        ))
    } else {
        warn!("MEDILINGUA_MODEL_API_KEY not set, using mock model adapter");
        Arc::new(MockModelAdapter::new())
    };

    let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());

    // --- Flows and chat session ---
    let qa = Arc::new(MedicalQaFlows::new(Arc::clone(&model), timeout));
    let audio_qa = Arc::new(AudioQuestionFlow::new(Arc::clone(&model), timeout));
    let speech: Arc<dyn SpeechPort> = Arc::new(CommandSpeech::new(cfg.tts_command_or_default()));
    let chat = ChatService::new(qa, audio_qa, speech, Language::En);

    // --- Doctor search: in-network directory + mocked external tool ---
    let external: Arc<dyn ExternalSearchPort> = Arc::new(MockExternalSearch::with_delay(
        cfg.external_search_delay_ms_or_default(),
    ));
    let search = Arc::new(DoctorSearchService::with_default_directory(external));

    let registration = Arc::new(RegistrationFlow::new());

    // --- Identity provider (optional) ---
    let identity: Option<Arc<dyn IdentityPort>> = if cfg.is_identity_configured() {
        info!(url = %cfg.identity_api_url_or_default(), "identity provider enabled");
        Some(Arc::new(FirebaseRestIdentity::new(
            cfg.identity_api_url_or_default(),
            cfg.identity_api_key().unwrap_or_default(),
        )))
    } else {
        info!("MEDILINGUA_IDENTITY_API_KEY not set, sign-in disabled");
        None
    };

    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(chat, search, registration, identity));

    // --- Run (main menu -> chat / doctor search / registration / auth) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
