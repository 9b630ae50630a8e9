use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::RhaiConfig;

/// Location of the optional agent configuration file inside the guest image.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/execution-agent/agent.yaml";

/// Prefix of environment variables that override file settings, e.g.
/// `EXECUTION_AGENT__RHAI__MAX_OPERATIONS=100000`.
pub const ENV_PREFIX: &str = "EXECUTION_AGENT";

/// Runtime configuration for the execution agent.
///
/// None of these settings affect where code units are looked up; the code
/// root is fixed.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// Rhai engine limits.
    #[serde(default)]
    pub rhai: RhaiConfig,
}

impl AgentConfig {
    /// Creates a new `AgentConfig` from the configuration file (if present)
    /// and `EXECUTION_AGENT__*` environment overrides.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        Self::load(path, ENV_PREFIX)
    }

    fn load(path: &Path, env_prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(env_prefix).separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
