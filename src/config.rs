//! Engine configuration
//!
//! Loaded in layers: built-in defaults, an optional config file, then
//! `RHYTHM_FLOWS__*` environment variables (a `.env` file is honoured).
//!
//! ```ignore
//! let config = Config::builder()
//!     .config_path(Some("flows.toml".into()))
//!     .max_steps_per_sprint(50)
//!     .build()?;
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_PREFIX: &str = "RHYTHM_FLOWS";
const CONFIG_PATH_VAR: &str = "RHYTHM_FLOWS_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Limits and knobs for the interpreter loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Node visits allowed in a single start/resume call
    pub max_steps_per_sprint: usize,
    /// Waits allowed across the lifetime of a session
    pub max_resumes_per_session: usize,
    pub max_template_chars: usize,
    pub max_result_chars: usize,
    /// Seed for random routers, entropy when unset
    pub random_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps_per_sprint: 100,
            max_resumes_per_session: 500,
            max_template_chars: 10_000,
            max_result_chars: 640,
            random_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from the default sources
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/* ===================== Builder ===================== */

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    max_steps_per_sprint: Option<usize>,
    max_resumes_per_session: Option<usize>,
    random_seed: Option<u64>,
}

impl ConfigBuilder {
    /// Config file path (overrides `RHYTHM_FLOWS_CONFIG_PATH`)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn max_steps_per_sprint(mut self, limit: usize) -> Self {
        self.max_steps_per_sprint = Some(limit);
        self
    }

    pub fn max_resumes_per_session(mut self, limit: usize) -> Self {
        self.max_resumes_per_session = Some(limit);
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Config> {
        dotenvy::dotenv().ok();

        let defaults = EngineConfig::default();
        let mut builder = config::Config::builder()
            .set_default(
                "engine.max_steps_per_sprint",
                defaults.max_steps_per_sprint as u64,
            )?
            .set_default(
                "engine.max_resumes_per_session",
                defaults.max_resumes_per_session as u64,
            )?
            .set_default(
                "engine.max_template_chars",
                defaults.max_template_chars as u64,
            )?
            .set_default("engine.max_result_chars", defaults.max_result_chars as u64)?;

        let path = self
            .config_path
            .clone()
            .or_else(|| std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from));
        if let Some(path) = &path {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        if let Some(limit) = self.max_steps_per_sprint {
            builder = builder.set_override("engine.max_steps_per_sprint", limit as u64)?;
        }
        if let Some(limit) = self.max_resumes_per_session {
            builder = builder.set_override("engine.max_resumes_per_session", limit as u64)?;
        }
        if let Some(seed) = self.random_seed {
            builder = builder.set_override("engine.random_seed", seed)?;
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if config.engine.max_steps_per_sprint == 0 {
            anyhow::bail!("engine.max_steps_per_sprint must be greater than zero");
        }

        Ok(config)
    }
}
