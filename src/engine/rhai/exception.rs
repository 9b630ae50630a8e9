//! Conversion of Rhai errors into [`ScriptException`]s.

use rhai::{EvalAltResult, ParseError, Position};

use crate::engine::{ExceptionKind, ScriptException};

impl From<EvalAltResult> for ScriptException {
    fn from(err: EvalAltResult) -> Self {
        let mut frames = Vec::new();
        let mut call_site = Position::NONE;
        let mut err = err;
        let innermost = loop {
            match err {
                EvalAltResult::ErrorInFunctionCall(name, source, inner, pos) => {
                    frames.push(call_frame("function", &name, &source, pos));
                    call_site = pos;
                    err = *inner;
                }
                EvalAltResult::ErrorInModule(name, inner, pos) => {
                    frames.push(call_frame("module", &name, "", pos));
                    call_site = pos;
                    err = *inner;
                }
                other => break other,
            }
        };

        let kind = classify(&innermost);
        // Operator failures carry no position; report the innermost call site.
        let location = describe(innermost.position()).or_else(|| describe(call_site));
        let message = match innermost {
            EvalAltResult::ErrorRuntime(value, _) => value.to_string(),
            EvalAltResult::ErrorArithmetic(message, _) => message,
            mut other => {
                other.clear_position();
                other.to_string()
            }
        };

        ScriptException { kind, message, location, frames }
    }
}

impl From<ParseError> for ScriptException {
    fn from(err: ParseError) -> Self {
        let ParseError(error_type, pos) = err;
        ScriptException {
            kind: ExceptionKind::SyntaxError,
            message: error_type.to_string(),
            location: describe(pos),
            frames: Vec::new(),
        }
    }
}

fn classify(err: &EvalAltResult) -> ExceptionKind {
    match err {
        EvalAltResult::ErrorArithmetic(message, _)
            if message.to_ascii_lowercase().contains("by zero") =>
        {
            ExceptionKind::ZeroDivisionError
        }
        EvalAltResult::ErrorArithmetic(..) => ExceptionKind::ArithmeticError,
        EvalAltResult::ErrorVariableNotFound(..) | EvalAltResult::ErrorFunctionNotFound(..) => {
            ExceptionKind::NameError
        }
        EvalAltResult::ErrorPropertyNotFound(..) => ExceptionKind::AttributeError,
        EvalAltResult::ErrorArrayBounds(..) | EvalAltResult::ErrorStringBounds(..) => {
            ExceptionKind::IndexError
        }
        EvalAltResult::ErrorMismatchDataType(..)
        | EvalAltResult::ErrorMismatchOutputType(..)
        | EvalAltResult::ErrorIndexingType(..)
        | EvalAltResult::ErrorDotExpr(..) => ExceptionKind::TypeError,
        EvalAltResult::ErrorStackOverflow(..) => ExceptionKind::RecursionError,
        EvalAltResult::ErrorTooManyOperations(..)
        | EvalAltResult::ErrorTooManyModules(..)
        | EvalAltResult::ErrorDataTooLarge(..) => ExceptionKind::ResourceLimitError,
        EvalAltResult::ErrorModuleNotFound(..) => ExceptionKind::ModuleNotFoundError,
        EvalAltResult::ErrorParsing(..) => ExceptionKind::SyntaxError,
        _ => ExceptionKind::RuntimeError,
    }
}

fn call_frame(what: &str, name: &str, source: &str, pos: Position) -> String {
    let mut frame = format!("in {what} '{name}'");
    if let Some(location) = describe(pos) {
        frame.push_str(&format!(" ({location})"));
    }
    if !source.is_empty() {
        frame.push_str(&format!(" [{source}]"));
    }
    frame
}

fn describe(pos: Position) -> Option<String> {
    (!pos.is_none()).then(|| pos.to_string())
}

#[cfg(test)]
mod tests {
    use rhai::Engine;

    use super::*;

    fn raise(script: &str) -> ScriptException {
        let engine = Engine::new();
        let err = engine.run(script).unwrap_err();
        ScriptException::from(*err)
    }

    #[test]
    fn test_division_by_zero() {
        let exception = raise(
            r#"
            fn divide(a, b) { a / b }
            divide(1, 0)
            "#,
        );
        assert_eq!(exception.kind, ExceptionKind::ZeroDivisionError);
        assert!(exception.to_string().starts_with("ZeroDivisionError: Division by zero"));
        assert!(exception.location.is_some());
    }

    #[test]
    fn test_thrown_value_is_the_message() {
        let exception = raise(r#"throw "bad input";"#);
        assert_eq!(exception.kind, ExceptionKind::RuntimeError);
        assert_eq!(exception.to_string(), "RuntimeError: bad input");
    }

    #[test]
    fn test_nested_calls_become_frames() {
        let exception = raise(
            r#"
            fn inner(x) { x / 0 }
            fn outer(x) { inner(x) }
            outer(1)
            "#,
        );
        assert_eq!(exception.kind, ExceptionKind::ZeroDivisionError);
        assert!(exception.frames.iter().any(|frame| frame.starts_with("in function 'outer'")));
        assert!(exception.frames.iter().any(|frame| frame.starts_with("in function 'inner'")));

        let trace = exception.trace();
        assert!(trace.contains("in function 'outer'"));
        assert!(trace.ends_with('\n'));
    }

    #[test]
    fn test_unknown_variable_is_name_error() {
        let exception = raise("missing + 1");
        assert_eq!(exception.kind, ExceptionKind::NameError);
        assert!(!exception.message.contains("line"));
    }

    #[test]
    fn test_out_of_bounds_is_index_error() {
        let exception = raise("let a = [1, 2]; a[5]");
        assert_eq!(exception.kind, ExceptionKind::IndexError);
    }

    #[test]
    fn test_parse_error_is_syntax_error() {
        let engine = Engine::new();
        let err = engine.compile("fn run(event, context) { ").unwrap_err();
        let exception = ScriptException::from(err);
        assert_eq!(exception.kind, ExceptionKind::SyntaxError);
        assert!(exception.to_string().starts_with("SyntaxError: "));
    }

    #[test]
    fn test_operation_limit_is_resource_limit_error() {
        let mut engine = Engine::new();
        engine.set_max_operations(100);
        let err = engine.run("loop { }").unwrap_err();
        assert_eq!(ScriptException::from(*err).kind, ExceptionKind::ResourceLimitError);
    }
}
