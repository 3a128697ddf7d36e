//! # Application Configuration
//!
//! Loads the `sparky-server` configuration from a `config.yml` file layered
//! with environment variables. `${VAR}` placeholders in the file are replaced
//! with the variable's value (or an empty string) before parsing, so secrets
//! never need to be written into the file itself.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sparky::{
    providers::factory::{EmbeddingConfig, ProviderConfig, VectorIndexConfig},
    AnswerSettings,
};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// An explicitly requested configuration file does not exist.
    #[error("Config file not found at '{0}'")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The `<grade>/<subject>/*.pdf` library root. Loaded from `BOOKS_DIR` env var.
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,
    /// An optional persona YAML replacing the built-in language table.
    #[serde(default)]
    pub personas_path: Option<PathBuf>,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub completion: ProviderConfig,
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
    #[serde(default)]
    pub answer: AnswerSettings,
}

fn default_port() -> u16 {
    9090
}

fn default_books_dir() -> PathBuf {
    PathBuf::from("books")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            books_dir: default_books_dir(),
            personas_path: None,
            embedding: EmbeddingConfig::default(),
            completion: ProviderConfig::default(),
            vector_index: VectorIndexConfig::default(),
            answer: AnswerSettings::default(),
        }
    }
}

impl AppConfig {
    /// The persona override path, ignoring a blank value left by substitution.
    pub fn personas_path(&self) -> Option<&Path> {
        self.personas_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Replaces every `${VAR}` in `content` with the variable's value, or an
/// empty string when it is unset.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded = re.replace_all(content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });
    Ok(expanded.into_owned())
}

// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;
    substitute_env_vars(&content).map(Some)
}

/// The first `config.yml` found in the working directory or the crate directory.
fn default_config_path() -> Option<PathBuf> {
    [
        PathBuf::from("config.yml"),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yml"),
    ]
    .into_iter()
    .find(|p| p.exists())
}

/// Loads the application configuration from a file and environment variables.
///
/// - An explicit `config_path_override` must exist. Without one, a missing
///   `config.yml` is not an error: defaults and the environment are used.
/// - Top-level keys like `port` and `books_dir` are overridden by `PORT` and `BOOKS_DIR`.
/// - Nested keys are overridden by `SPARKY_...` variables (e.g. `SPARKY_COMPLETION__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("port", i64::from(default_port()))?
        .set_default("books_dir", "books")?;

    // Layer 2: Main config file, if any.
    let config_path = match config_path_override {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            Some(path)
        }
        None => default_config_path(),
    };
    match config_path {
        Some(path) => {
            if let Some(content) = read_and_substitute(&path)? {
                info!("Loading configuration from '{}'.", path.display());
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
        }
        None => info!("No config.yml found; using defaults and environment variables."),
    }

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for nested overrides.
        .add_source(
            Environment::with_prefix("SPARKY")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
