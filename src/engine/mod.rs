//! Execution of user code units.
//!
//! The agent pipeline only depends on the [`CodeRunner`] capability; the
//! [`rhai`] module provides the implementation used by the binary.

mod error;
pub mod rhai;

use serde::Serialize;
use serde_json::Value;

pub use error::{ExceptionKind, ExecutionError, ScriptException};

use crate::{handler::ResolvedHandler, input::EventData};

/// Marker written to the captured stderr before a failure trace.
pub const TRACE_MARKER: &str = "\n--- Agent Traceback ---\n";

/// The second argument passed to every entry point.
///
/// Currently empty; reserved for per-invocation metadata such as deadlines
/// or request ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvocationContext {}

impl InvocationContext {
    /// The context as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// Text written by user code to its output streams during one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedLogs {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error, followed by the failure trace if any.
    pub stderr: String,
}

impl CapturedLogs {
    /// Appends a failure trace to stderr under [`TRACE_MARKER`].
    pub fn append_trace(&mut self, trace: &str) {
        self.stderr.push_str(TRACE_MARKER);
        self.stderr.push_str(trace);
        if !trace.ends_with('\n') {
            self.stderr.push('\n');
        }
    }
}

/// Result of running one entry point.
#[derive(Debug)]
pub struct Execution<O> {
    /// The entry point's return value, or the reason there is none.
    pub outcome: Result<O, ExecutionError>,
    /// Streams captured during the call.
    pub logs: CapturedLogs,
}

impl<O> Execution<O> {
    /// A successful execution.
    pub fn completed(output: O, logs: CapturedLogs) -> Self {
        Self { outcome: Ok(output), logs }
    }

    /// A failed execution; the error's trace is appended to `logs.stderr`.
    pub fn failed(error: ExecutionError, mut logs: CapturedLogs) -> Self {
        logs.append_trace(&error.trace());
        Self { outcome: Err(error), logs }
    }
}

/// Executes a code unit by path and calls a named entry point with the event
/// and context.
pub trait CodeRunner {
    /// The value type returned by entry points.
    type Output: Serialize;

    /// File extension of code units handled by this runner.
    const UNIT_EXTENSION: &'static str;

    /// Loads the unit at `handler.path` and calls `handler.entry_point` with
    /// `(event, context)`. Every failure is reported in the returned
    /// [`Execution`].
    fn execute(
        &self,
        handler: &ResolvedHandler,
        event: &EventData,
        context: &InvocationContext,
    ) -> Execution<Self::Output>;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_context_is_empty_object() {
        assert_eq!(InvocationContext::default().to_value(), json!({}));
    }

    #[test]
    fn test_append_trace_keeps_user_stderr_first() {
        let mut logs = CapturedLogs { stdout: String::new(), stderr: "oops\n".into() };
        logs.append_trace("TypeError: bad");

        assert!(logs.stderr.starts_with("oops\n"));
        assert_eq!(logs.stderr, "oops\n\n--- Agent Traceback ---\nTypeError: bad\n");
    }

    #[test]
    fn test_failed_execution_carries_trace() {
        let error = ExecutionError::NotFound(PathBuf::from("/function/missing.rhai"));
        let execution = Execution::<()>::failed(error, CapturedLogs::default());

        assert!(execution.outcome.is_err());
        assert!(execution.logs.stderr.contains(TRACE_MARKER));
        assert!(
            execution
                .logs
                .stderr
                .contains("FileNotFoundError: Code file not found at /function/missing.rhai")
        );
    }
}
