//! Error taxonomy of the agent pipeline.

use thiserror::Error;

use crate::{engine::ExecutionError, handler::HandlerParseError, input::InputError};

/// Whether an error was caused by the agent's environment or by the
/// invocation's own inputs and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The agent was started or configured incorrectly.
    Agent,
    /// The handler reference, event or user code is at fault.
    User,
}

/// Any error that ends an invocation. Every variant becomes the `error`
/// string of the response envelope.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Missing or extra process arguments.
    #[error("Agent Usage Error: Missing handler string argument.")]
    Usage,

    /// The agent configuration could not be loaded.
    #[error("Agent Configuration Error: {0}")]
    Config(#[from] config::ConfigError),

    /// The event could not be read or decoded.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The handler reference is malformed.
    #[error("Agent Error: {0}")]
    Resolution(#[from] HandlerParseError),

    /// Loading or invoking the entry point failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl AgentError {
    /// Taxonomy name used on the diagnostics channel.
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::Usage => "UsageError",
            AgentError::Config(_) => "ConfigError",
            AgentError::Input(InputError::Decode(_)) => "InputDecodeError",
            AgentError::Input(InputError::Read(_)) => "InputReadError",
            AgentError::Resolution(_) => "ResolutionError",
            AgentError::Execution(err) => err.category(),
        }
    }

    /// Who is responsible for the failure.
    pub fn fault(&self) -> Fault {
        match self {
            AgentError::Usage | AgentError::Config(_) | AgentError::Input(InputError::Read(_)) => {
                Fault::Agent
            }
            _ => Fault::User,
        }
    }
}
