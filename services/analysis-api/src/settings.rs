//! Service settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `ANALYSIS_API__*` environment variables. A `.env` file is read
//! first so local overrides behave like real environment variables.

use bias_engine::AnalysisConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "analysis-api.toml";
const ENV_PREFIX: &str = "ANALYSIS_API";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
    /// Engine thresholds and weights
    pub analysis: AnalysisConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 10 * 1024 * 1024,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Settings {
    /// Load from `.env`, the config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let path = std::env::var("ANALYSIS_API_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self::from_sources(
            Config::builder().add_source(File::with_name(&path).required(false)),
            environment(),
            std::env::var("PORT").ok(),
        )
    }

    /// Layer `env` over `builder`. `port_var` is the plain `PORT` the hosting
    /// platform sets; it only replaces the built-in default port.
    fn from_sources(
        builder: ConfigBuilder<DefaultState>,
        env: Environment,
        port_var: Option<String>,
    ) -> Result<Self, ConfigError> {
        let fallback_port = port_var
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let settings: Settings = builder
            .set_default("port", fallback_port as i64)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings
            .analysis
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `ANALYSIS_API__SECTION__KEY` variables, `__` separating nested keys
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
