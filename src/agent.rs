//! The invocation pipeline: read the event, resolve the handler, run it and
//! build the response envelope.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use crate::{
    config::AgentConfig,
    engine::{CapturedLogs, CodeRunner, InvocationContext, rhai::RhaiRunner},
    error::AgentError,
    handler::{HandlerReference, ResolvedHandler},
    input::{EventData, read_event},
    response::Envelope,
};

/// Directory user code units are read from inside the guest.
pub const FUNCTION_ROOT: &str = "/function";

/// Runs one invocation against a [`CodeRunner`].
#[derive(Debug)]
pub struct Agent<R> {
    runner: R,
    code_root: PathBuf,
}

impl Agent<RhaiRunner> {
    /// Creates an agent that runs Rhai units from [`FUNCTION_ROOT`].
    pub fn new(config: &AgentConfig) -> Self {
        Self::with_code_root(RhaiRunner::new(&config.rhai), FUNCTION_ROOT)
    }
}

impl<R: CodeRunner> Agent<R> {
    /// Creates an agent that runs units from `code_root`.
    pub fn with_code_root(runner: R, code_root: impl Into<PathBuf>) -> Self {
        Self { runner, code_root: code_root.into() }
    }

    /// The directory code units are resolved against.
    pub fn code_root(&self) -> &Path {
        &self.code_root
    }

    /// The runner used for invocations.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Reads the event from `input` and invokes `handler` with it.
    ///
    /// Input errors short-circuit: nothing is resolved or loaded.
    pub fn handle<In: Read>(&self, handler: &str, input: In) -> Envelope<R::Output> {
        match read_event(input) {
            Ok(event) => self.invoke(handler, &event),
            Err(err) => {
                tracing::error!("Fatal: Error reading event data from stdin: {err}");
                reject(err.into(), CapturedLogs::default())
            }
        }
    }

    /// Invokes `handler` with an already parsed event.
    pub fn invoke(&self, handler: &str, event: &EventData) -> Envelope<R::Output> {
        let resolved = match self.resolve(handler) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!("Agent setup/execution error: {err}");
                let mut logs = CapturedLogs::default();
                if let AgentError::Resolution(parse_error) = &err {
                    logs.append_trace(&format!("ValueError: {parse_error}"));
                }
                return reject(err, logs);
            }
        };

        let execution = self.runner.execute(&resolved, event, &InvocationContext::default());
        match execution.outcome {
            Ok(output) => Envelope::success(output, execution.logs),
            Err(err) => reject(err.into(), execution.logs),
        }
    }

    fn resolve(&self, handler: &str) -> Result<ResolvedHandler, AgentError> {
        let reference = HandlerReference::parse(handler)?;
        let resolved = reference.resolve(&self.code_root, R::UNIT_EXTENSION);
        tracing::debug!(
            unit = %resolved.unit,
            entry_point = %resolved.entry_point,
            path = %resolved.path.display(),
            "Handler resolved."
        );
        Ok(resolved)
    }
}

/// Reports `error` on the diagnostics channel and wraps it in a failure
/// envelope.
pub fn reject<O: serde::Serialize>(error: AgentError, logs: CapturedLogs) -> Envelope<O> {
    tracing::error!(
        category = error.category(),
        fault = ?error.fault(),
        "Execution Error Type: {}",
        error.category()
    );
    tracing::error!("Execution Error Message: {error}");
    Envelope::failure(error, logs)
}
