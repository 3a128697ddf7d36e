//! # Persona Table
//!
//! Per-language tutor personas, loaded from YAML. The shipped table is embedded
//! from `data/personas.yml`; deployments may point `personas_path` at their own
//! file. Lookups never fail: unknown language codes resolve to the baseline.

use crate::errors::SparkyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const EMBEDDED_PERSONAS: &str = include_str!("../data/personas.yml");

/// One language's display name and tutor system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// The name shown in the language picker, in the language itself.
    pub name: String,
    pub english_name: String,
    /// Placeholders: `{name}` (the child's name).
    pub system_prompt: String,
}

impl PersonaConfig {
    pub fn render(&self, child_name: &str) -> String {
        self.system_prompt.replace("{name}", child_name)
    }
}

#[derive(Deserialize)]
struct PersonaFile {
    baseline: String,
    languages: BTreeMap<String, PersonaConfig>,
}

/// A lookup table from language code to persona, with a defined fallback key.
///
/// The baseline entry is guaranteed to exist once a table has been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaTable {
    baseline: String,
    baseline_persona: PersonaConfig,
    languages: BTreeMap<String, PersonaConfig>,
}

impl PersonaTable {
    /// The persona table compiled into the binary.
    pub fn embedded() -> Result<Self, SparkyError> {
        Self::from_yaml_str(EMBEDDED_PERSONAS)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SparkyError> {
        let PersonaFile {
            baseline,
            languages,
        } = serde_yaml::from_str(content)?;
        let Some(baseline_persona) = languages.get(&baseline).cloned() else {
            return Err(SparkyError::PersonaConfig(format!(
                "baseline language '{baseline}' has no persona entry"
            )));
        };
        let table = PersonaTable {
            baseline,
            baseline_persona,
            languages,
        };
        debug!(
            languages = table.languages.len(),
            baseline = %table.baseline,
            "Loaded persona table"
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SparkyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SparkyError::PersonaConfig(format!(
                "failed to read persona file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn baseline_code(&self) -> &str {
        &self.baseline
    }

    pub fn contains(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Returns the persona for `code`, or the baseline persona on a miss.
    pub fn get(&self, code: &str) -> &PersonaConfig {
        match self.languages.get(code) {
            Some(persona) => persona,
            None => {
                debug!(code, baseline = %self.baseline, "Unknown language code, using baseline persona");
                &self.baseline_persona
            }
        }
    }

    /// The tutor system prompt for `code` with the child's name filled in.
    pub fn render_system_prompt(&self, code: &str, child_name: &str) -> String {
        self.get(code).render(child_name)
    }

    /// All languages in code order, for building a language picker.
    pub fn languages(&self) -> impl Iterator<Item = (&str, &PersonaConfig)> {
        self.languages.iter().map(|(code, p)| (code.as_str(), p))
    }
}
