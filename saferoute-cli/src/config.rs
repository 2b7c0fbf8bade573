//! `saferoute.toml` loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use saferoute_core::ScoringConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    pub scoring: ScoringConfig,
    pub data: DataConfig,
}

/// Input files; command line flags take precedence
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Attributed street graph as JSON
    pub graph: Option<PathBuf>,
    /// Business list as JSON
    pub businesses: Option<PathBuf>,
}

impl CliConfig {
    /// Reads `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .scoring
            .validate()
            .with_context(|| format!("Invalid scoring section in {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_overrides(mut self, graph: Option<PathBuf>, businesses: Option<PathBuf>) -> Self {
        if graph.is_some() {
            self.data.graph = graph;
        }
        if businesses.is_some() {
            self.data.businesses = businesses;
        }
        self
    }
}
