use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use contract_guard_core::{Role, Sector};
use serde::Deserialize;

const ENV_PREFIX: &str = "CONTRACT_GUARD";

/// Defaults for the CLI, layered as config file < `CONTRACT_GUARD_*` environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sector: Sector,
    #[serde(default)]
    pub role: Role,
    /// Extra rule pack appended to the built-in catalog.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::from_sources(config_path, None)
    }

    fn from_sources(
        config_path: Option<&Path>,
        env_override: Option<Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env_override));
        let config = builder.build().with_context(|| match config_path {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load configuration from environment".to_string(),
        })?;
        config
            .try_deserialize()
            .context("invalid contract-guard configuration")
    }
}
