//! Configuration module for the execution agent.

mod agent_config;
mod rhai;

pub use agent_config::{AgentConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use rhai::RhaiConfig;
