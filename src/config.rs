use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::hybrid::{HybridOptions, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::review_session::SessionOptions;
use crate::segmenter::DEFAULT_LONG_CLAUSE_CHARS;

/// Persisted configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    /// Language tag sent with analysis requests
    pub language: String,
    /// Classification service base URL; local rules when unset
    pub classifier_url: Option<String>,
    pub classifier_api_key: String,
    /// Minimum top probability for a model label to be accepted
    pub confidence_threshold: f64,
    pub with_concepts: bool,
    pub clear_after_submit: bool,
    /// Apply signal-based refinement to service labels (voice overlay mode)
    pub refine_service_labels: bool,
    pub long_clause_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            language: "en".to_string(),
            classifier_url: None,
            classifier_api_key: String::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            with_concepts: false,
            clear_after_submit: true,
            refine_service_labels: false,
            long_clause_chars: DEFAULT_LONG_CLAUSE_CHARS,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".voicescribe"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file or return default
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`; a missing file yields the default
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn hybrid_options(&self) -> HybridOptions {
        HybridOptions {
            threshold: self.confidence_threshold,
            with_concepts: self.with_concepts,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            language: self.language.clone(),
            clear_after_submit: self.clear_after_submit,
            long_clause_chars: self.long_clause_chars,
        }
    }
}
