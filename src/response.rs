//! The response envelope written to standard output.

use std::{fmt, io::Write, process::ExitCode};

use serde::Serialize;

use crate::engine::CapturedLogs;

/// Process exit status of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentExit {
    /// The envelope's `error` is null.
    Success,
    /// Any failure, including failure to emit the envelope.
    Failure,
}

impl AgentExit {
    /// The numeric exit code.
    pub fn code(self) -> u8 {
        match self {
            AgentExit::Success => 0,
            AgentExit::Failure => 1,
        }
    }
}

impl From<AgentExit> for ExitCode {
    fn from(exit: AgentExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// The single structured result of an invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<O> {
    /// The entry point's return value; `null` when there is none.
    pub output: Option<O>,
    /// Streams captured during the call.
    pub logs: CapturedLogs,
    /// `null` on success, otherwise `<Category>: <message>`.
    pub error: Option<String>,
}

impl<O: Serialize> Envelope<O> {
    /// An envelope for a completed invocation.
    pub fn success(output: O, logs: CapturedLogs) -> Self {
        Self { output: Some(output), logs, error: None }
    }

    /// An envelope for a failed invocation.
    pub fn failure(error: impl fmt::Display, logs: CapturedLogs) -> Self {
        Self { output: None, logs, error: Some(error.to_string()) }
    }

    /// Whether the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Serializes the envelope as one compact JSON document.
    ///
    /// If the envelope cannot be serialized, a fallback envelope describing
    /// the failure is rendered instead and the exit status is a failure.
    pub fn render(&self) -> (String, AgentExit) {
        match serde_json::to_string(self) {
            Ok(line) => {
                let exit = if self.is_success() { AgentExit::Success } else { AgentExit::Failure };
                (line, exit)
            }
            Err(err) => {
                tracing::error!(
                    category = "SerializationError",
                    "Fatal: Failed to serialize or print final response: {err}"
                );
                (self.fallback(&err), AgentExit::Failure)
            }
        }
    }

    /// Writes the rendered envelope followed by a newline and flushes.
    pub fn emit<W: Write>(&self, mut writer: W) -> AgentExit {
        let (line, exit) = self.render();
        let written = writeln!(writer, "{line}").and_then(|()| writer.flush());
        match written {
            Ok(()) => exit,
            Err(err) => {
                tracing::error!("Fatal: Failed to write final response: {err}");
                AgentExit::Failure
            }
        }
    }

    fn fallback(&self, err: &serde_json::Error) -> String {
        let mut logs = self.logs.clone();
        if !logs.stderr.is_empty() && !logs.stderr.ends_with('\n') {
            logs.stderr.push('\n');
        }
        logs.stderr.push_str(&format!("Failed to create final JSON: {err}"));

        let fallback = Envelope::<()>::failure(
            format!("Agent Error: Failed to create final response: {err}"),
            logs,
        );
        serde_json::to_string(&fallback).unwrap_or_else(|_| {
            r#"{"output":null,"logs":{"stdout":"","stderr":""},"error":"Agent Error: Failed to create final response"}"#
                .to_string()
        })
    }
}
