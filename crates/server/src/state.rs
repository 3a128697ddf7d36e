//! # Application State
//!
//! The shared application state (`AppState`) and the logic for building it at
//! startup. It holds the configuration and the answer orchestrator with its
//! instantiated provider clients, making them accessible to all request handlers.

use crate::config::AppConfig;
use sparky::{
    providers::factory::{create_ai_provider, create_embedding_provider, create_vector_index},
    Orchestrator, PersonaTable,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Loads the persona table from the configured override, or the built-in one.
pub fn load_personas(config: &AppConfig) -> anyhow::Result<PersonaTable> {
    match config.personas_path() {
        Some(path) => {
            info!("Loading personas from '{}'.", path.display());
            Ok(PersonaTable::from_path(path)?)
        }
        None => Ok(PersonaTable::embedded()?),
    }
}

/// Builds the shared application state from the configuration.
///
/// Sections with missing credentials leave their client unset; the server
/// still starts and `/ask` answers with the "not configured" message.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let orchestrator = Orchestrator::builder()
        .ai_provider(create_ai_provider(&config.completion)?)
        .embedder(create_embedding_provider(&config.embedding)?)
        .vector_index(create_vector_index(&config.vector_index)?)
        .personas(load_personas(&config)?)
        .settings(config.answer)
        .build()?;

    info!(
        configured = orchestrator.is_configured(),
        languages = orchestrator.personas().languages().count(),
        "Answer orchestrator ready"
    );

    Ok(AppState {
        config: Arc::new(config),
        orchestrator: Arc::new(orchestrator),
    })
}
