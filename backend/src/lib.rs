pub mod auth;
pub mod charts;
pub mod chat;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod recommendation;
pub mod report;
pub mod routes;
pub mod scoring;
pub mod session;
pub mod storage;

use std::sync::Arc;

use auth::{CredentialStore, JwtService};
use chat::{ChatError, CompletionService, GeminiService, UnconfiguredService};
use cleanup::CleanupScheduler;
use config::{AppConfig, ConfigError};
use model::{ModelRegistry, RegistryError};
use pipeline::PredictionPipeline;
use routes::AppState;
use session::SessionStore;
use storage::{ArtifactStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("model registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("output directory error: {0}")]
    Storage(#[from] StorageError),
    #[error("chat service error: {0}")]
    Chat(#[from] ChatError),
}

/// Wires every service from configuration. Must run inside a tokio runtime,
/// since it starts the cleanup worker.
pub fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let registry = ModelRegistry::load_from_dir(&config.models_dir)?;

    let store = ArtifactStore::new(&config.reports_dir, &config.charts_dir);
    store.ensure_dirs()?;

    let chat: Arc<dyn CompletionService> = match GeminiService::from_config(&config.gemini)? {
        Some(service) => {
            log::info!("Chat assistant using {}", service.endpoint());
            Arc::new(service)
        }
        None => {
            log::warn!("GEMINI_API_KEY is not set; chat replies will report an error");
            Arc::new(UnconfiguredService)
        }
    };

    let pipeline = PredictionPipeline::new(
        registry,
        store,
        config.portal.organization.clone(),
        CleanupScheduler::start(),
        config.portal.cleanup,
    );

    let jwt = JwtService::new(&config.jwt_secret);
    Ok(AppState {
        pipeline,
        sessions: SessionStore::with_lifetime(jwt.lifetime()),
        credentials: CredentialStore::new(),
        jwt,
        chat,
    })
}
