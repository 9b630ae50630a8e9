use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Category of an error raised by user code, named after the equivalent
/// Python exception so hosts can treat every runtime uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    /// Division or modulo by zero.
    ZeroDivisionError,
    /// Any other arithmetic failure, e.g. overflow.
    ArithmeticError,
    /// An explicitly thrown value or an otherwise uncategorised failure.
    RuntimeError,
    /// Reference to an unknown variable or function.
    NameError,
    /// Access to an unknown property.
    AttributeError,
    /// Out-of-bounds or missing index.
    IndexError,
    /// A value of the wrong type.
    TypeError,
    /// Call nesting exceeded the configured depth.
    RecursionError,
    /// An engine resource limit was exceeded.
    ResourceLimitError,
    /// An imported module could not be found.
    ModuleNotFoundError,
    /// The unit's source could not be parsed.
    SyntaxError,
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An error raised by user code while loading or running a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
    /// The error category.
    pub kind: ExceptionKind,
    /// Human readable message without location.
    pub message: String,
    /// Where the innermost error occurred, if known.
    pub location: Option<String>,
    /// Call frames from the outermost call to the innermost, one line each.
    pub frames: Vec<String>,
}

impl ScriptException {
    /// Adds `frame` as the outermost call frame.
    pub fn with_outer_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.insert(0, frame.into());
        self
    }

    /// Renders the trace appended to the captured stderr.
    pub fn trace(&self) -> String {
        let mut trace = String::from("Traceback (most recent call last):\n");
        for frame in &self.frames {
            trace.push_str("  ");
            trace.push_str(frame);
            trace.push('\n');
        }
        trace.push_str(&self.to_string());
        if let Some(location) = &self.location {
            trace.push_str(&format!(" ({location})"));
        }
        trace.push('\n');
        trace
    }
}

impl fmt::Display for ScriptException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ScriptException {}

/// Errors that can occur while loading a unit and invoking its entry point.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The resolved unit file does not exist.
    #[error("FileNotFoundError: Code file not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The unit file exists but could not be read.
    #[error("ImportError: Could not load unit from {}: {source}", path.display())]
    Unreadable {
        /// Path of the unit file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The unit failed to compile or its top-level code raised.
    #[error("{0}")]
    Load(ScriptException),

    /// The unit has no member with the entry-point name.
    #[error("AttributeError: unit '{unit}' has no attribute '{name}'")]
    MissingEntryPoint {
        /// Unit name (file stem).
        unit: String,
        /// The requested entry point.
        name: String,
    },

    /// The member exists but cannot be called as `(event, context)`.
    #[error("TypeError: Handler '{name}' in {file} is not callable.")]
    NotCallable {
        /// The requested entry point.
        name: String,
        /// Unit file name.
        file: String,
        /// What the member is instead.
        reason: String,
    },

    /// The entry point raised during the call.
    #[error("{0}")]
    Raised(ScriptException),
}

impl ExecutionError {
    /// Taxonomy name used on the diagnostics channel.
    pub fn category(&self) -> &'static str {
        match self {
            ExecutionError::NotFound(_) => "NotFoundError",
            ExecutionError::Unreadable { .. } | ExecutionError::Load(_) => "LoadError",
            ExecutionError::MissingEntryPoint { .. } => "AttributeError",
            ExecutionError::NotCallable { .. } => "TypeError",
            ExecutionError::Raised(_) => "InvocationError",
        }
    }

    /// The trace appended to the captured stderr.
    pub fn trace(&self) -> String {
        match self {
            ExecutionError::Load(exception) | ExecutionError::Raised(exception) => {
                exception.trace()
            }
            ExecutionError::NotCallable { reason, .. } => format!("{self}\n  {reason}\n"),
            _ => format!("{self}\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn division_by_zero() -> ScriptException {
        ScriptException {
            kind: ExceptionKind::ZeroDivisionError,
            message: "Division by zero: 1 / 0".into(),
            location: Some("line 2, position 11".into()),
            frames: vec!["in function 'run' (line 5, position 1)".into()],
        }
    }

    #[test]
    fn test_exception_display_is_category_and_message() {
        assert_eq!(division_by_zero().to_string(), "ZeroDivisionError: Division by zero: 1 / 0");
    }

    #[test]
    fn test_exception_trace_lists_frames_then_error() {
        let trace = division_by_zero().trace();
        assert_eq!(
            trace,
            "Traceback (most recent call last):\n  in function 'run' (line 5, position 1)\nZeroDivisionError: Division by zero: 1 / 0 (line 2, position 11)\n"
        );
    }

    #[test]
    fn test_execution_error_messages() {
        let err = ExecutionError::MissingEntryPoint { unit: "math".into(), name: "add".into() };
        assert_eq!(err.to_string(), "AttributeError: unit 'math' has no attribute 'add'");
        assert_eq!(err.category(), "AttributeError");

        let err = ExecutionError::NotCallable {
            name: "add".into(),
            file: "math.rhai".into(),
            reason: "'add' is a value of type 'i64'".into(),
        };
        assert_eq!(err.to_string(), "TypeError: Handler 'add' in math.rhai is not callable.");
        assert!(err.trace().contains("'add' is a value of type 'i64'"));

        let err = ExecutionError::Raised(division_by_zero());
        assert_eq!(err.to_string(), "ZeroDivisionError: Division by zero: 1 / 0");
        assert_eq!(err.category(), "InvocationError");
    }

    #[test]
    fn test_unreadable_message() {
        let err = ExecutionError::Unreadable {
            path: PathBuf::from("/function/main.rhai"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "ImportError: Could not load unit from /function/main.rhai: denied");
        assert_eq!(err.category(), "LoadError");
    }
}
