//! Command-line entry: `execution-agent <unit>.<entrypoint>`.

use std::{
    ffi::OsString,
    io::{Read, Write},
};

use clap::Parser;

use crate::{
    agent::{Agent, reject},
    config::AgentConfig,
    engine::{CapturedLogs, rhai::ScriptValue},
    error::AgentError,
    response::{AgentExit, Envelope},
};

/// Runs a handler from a code unit against a JSON event read from stdin.
#[derive(Debug, Parser)]
#[command(name = "execution-agent", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Handler reference in the form `<unit>.<entrypoint>`.
    #[arg(allow_hyphen_values = true)]
    pub handler: String,
}

/// Runs one invocation and writes its envelope to `output`.
///
/// `args` includes the program name. Any argument error, including extra
/// arguments, is reported as a usage error envelope.
pub fn run<I, T>(args: I, input: impl Read, output: impl Write) -> AgentExit
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    tracing::info!("Agent started.");

    let envelope = match Cli::try_parse_from(args) {
        Ok(cli) => {
            tracing::info!("Handler string: {}", cli.handler);
            invoke(&cli.handler, input)
        }
        Err(err) => {
            tracing::error!("Usage: execution-agent <filename.funcname>");
            let detail = err.to_string();
            tracing::warn!("Argument parsing failed: {}", detail.lines().next().unwrap_or_default());
            reject(AgentError::Usage, CapturedLogs::default())
        }
    };

    tracing::info!("Sending final JSON response to stdout.");
    let exit = envelope.emit(output);
    tracing::info!("Agent exiting with code {}.", exit.code());
    exit
}

fn invoke(handler: &str, input: impl Read) -> Envelope<ScriptValue> {
    match AgentConfig::new(None) {
        Ok(config) => {
            tracing::debug!(rhai = ?config.rhai, "Configuration loaded.");
            Agent::new(&config).handle(handler, input)
        }
        Err(err) => reject(err.into(), CapturedLogs::default()),
    }
}
