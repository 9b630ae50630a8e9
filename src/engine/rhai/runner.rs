use std::path::Path;

use rhai::Engine;

use super::{
    CaptureSinks, EntryPoint, LoadedUnit, ScriptValue, SearchPath, UNIT_EXTENSION,
    conversions::json_to_dynamic, create_engine,
};
use crate::{
    config::RhaiConfig,
    engine::{CodeRunner, Execution, ExecutionError, InvocationContext, ScriptException},
    handler::ResolvedHandler,
    input::EventData,
};

/// Runs Rhai code units.
#[derive(Debug)]
pub struct RhaiRunner {
    engine: Engine,
    sinks: CaptureSinks,
    search_path: SearchPath,
}

impl RhaiRunner {
    /// Creates a runner whose engine applies the limits in `rhai_config`.
    pub fn new(rhai_config: &RhaiConfig) -> Self {
        let sinks = CaptureSinks::new();
        let search_path = SearchPath::new();
        let engine = create_engine(rhai_config, &sinks, &search_path);
        Self { engine, sinks, search_path }
    }

    /// The module search path used while a unit is loaded and invoked.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    fn prepare(&self, handler: &ResolvedHandler) -> Result<(LoadedUnit, EntryPoint), ExecutionError> {
        let unit = LoadedUnit::load(&self.engine, &handler.path)?;
        let entry_point = unit.entry_point(&handler.entry_point)?;
        Ok((unit, entry_point))
    }
}

impl CodeRunner for RhaiRunner {
    type Output = ScriptValue;

    const UNIT_EXTENSION: &'static str = UNIT_EXTENSION;

    fn execute(
        &self,
        handler: &ResolvedHandler,
        event: &EventData,
        context: &InvocationContext,
    ) -> Execution<ScriptValue> {
        tracing::info!(
            "Attempting to execute {} from {}",
            handler.entry_point,
            handler.path.display()
        );

        let unit_dir = handler.path.parent().unwrap_or_else(|| Path::new("/"));
        let _search_path = self.search_path.acquire(unit_dir);

        let execution = match self.prepare(handler) {
            Ok((mut unit, entry_point)) => {
                let event = json_to_dynamic(event.as_value());
                let context = json_to_dynamic(&context.to_value());

                let (result, logs) = self.sinks.capture(|| {
                    tracing::info!("Calling user handler function...");
                    let result = unit.call(&self.engine, &entry_point, event, context);
                    tracing::info!("User handler function finished.");
                    result
                });

                match result {
                    Ok(output) => Execution::completed(ScriptValue(output), logs),
                    Err(err) => {
                        let exception = ScriptException::from(*err).with_outer_frame(format!(
                            "in function '{}' [{}]",
                            handler.entry_point,
                            handler.path.display()
                        ));
                        Execution::failed(ExecutionError::Raised(exception), logs)
                    }
                }
            }
            Err(err) => Execution::failed(err, Default::default()),
        };

        tracing::info!("Execution attempt finished.");
        execution
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::{engine::TRACE_MARKER, handler::HandlerReference};

    fn resolve(root: &TempDir, handler: &str) -> ResolvedHandler {
        HandlerReference::parse(handler).unwrap().resolve(root.path(), UNIT_EXTENSION)
    }

    fn run(root: &TempDir, handler: &str, event: serde_json::Value) -> Execution<ScriptValue> {
        let runner = RhaiRunner::new(&RhaiConfig::default());
        runner.execute(&resolve(root, handler), &EventData(event), &InvocationContext::default())
    }

    #[test]
    fn test_successful_call_captures_output() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("math.rhai"),
            r#"
            print("loading");
            fn add(event, context) {
                print("adding");
                eprint("careful");
                event.a + event.b
            }
            "#,
        )
        .unwrap();

        let execution = run(&root, "math.add", json!({"a": 1, "b": 2}));

        let output = execution.outcome.unwrap();
        assert_eq!(serde_json::to_value(&output).unwrap(), json!(3));
        assert_eq!(execution.logs.stdout, "adding\n");
        assert_eq!(execution.logs.stderr, "careful\n");
    }

    #[test]
    fn test_context_is_an_empty_map() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("ctx.rhai"), "fn run(event, context) { context }").unwrap();

        let execution = run(&root, "ctx.run", json!({}));
        assert_eq!(serde_json::to_value(execution.outcome.unwrap()).unwrap(), json!({}));
    }

    #[test]
    fn test_raise_appends_trace_after_user_stderr() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("calc.rhai"),
            r#"
            fn divide(event, context) {
                eprint("about to divide");
                event.a / event.b
            }
            "#,
        )
        .unwrap();

        let execution = run(&root, "calc.divide", json!({"a": 1, "b": 0}));

        let err = execution.outcome.unwrap_err();
        assert!(err.to_string().starts_with("ZeroDivisionError: "));
        assert!(execution.logs.stderr.starts_with("about to divide\n"));
        assert!(execution.logs.stderr.contains(TRACE_MARKER));
    }

    #[test]
    fn test_trace_starts_at_entry_point() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("nested.rhai"),
            r#"
            fn helper(x) {
                x / 0
            }
            fn run(event, context) { helper(event.x) }
            "#,
        )
        .unwrap();

        let execution = run(&root, "nested.run", json!({"x": 1}));

        let Err(ExecutionError::Raised(exception)) = execution.outcome else {
            panic!("expected a raised exception");
        };
        assert!(exception.frames[0].starts_with("in function 'run' ["));
        assert!(exception.frames.iter().any(|frame| frame.starts_with("in function 'helper'")));
        assert!(exception.location.is_some());

        let stderr = &execution.logs.stderr;
        let entry = stderr.find("in function 'run'").unwrap();
        let helper = stderr.find("in function 'helper'").unwrap();
        assert!(stderr.contains("Traceback (most recent call last):"));
        assert!(entry < helper);
    }

    #[test]
    fn test_missing_unit() {
        let root = TempDir::new().unwrap();
        let execution = run(&root, "missing.run", json!({}));

        let err = execution.outcome.unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound(_)));
        assert_eq!(execution.logs.stdout, "");
        assert!(execution.logs.stderr.contains("FileNotFoundError"));
    }

    #[test]
    fn test_nested_unit_imports_sibling_module() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("pkg")).unwrap();
        fs::write(root.path().join("pkg/helpers.rhai"), "fn double(x) { x * 2 }").unwrap();
        fs::write(
            root.path().join("pkg/main.rhai"),
            r#"
            fn run(event, context) {
                import "helpers" as helpers;
                helpers::double(event.n)
            }
            "#,
        )
        .unwrap();

        let runner = RhaiRunner::new(&RhaiConfig::default());
        let execution = runner.execute(
            &resolve(&root, "pkg.main.run"),
            &EventData(json!({"n": 21})),
            &InvocationContext::default(),
        );

        assert_eq!(serde_json::to_value(execution.outcome.unwrap()).unwrap(), json!(42));
        assert!(runner.search_path().dirs().is_empty());
    }

    #[test]
    fn test_search_path_released_after_failure() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("bad.rhai"), r#"throw "load failure";"#).unwrap();

        let runner = RhaiRunner::new(&RhaiConfig::default());
        let execution = runner.execute(
            &resolve(&root, "bad.run"),
            &EventData::default(),
            &InvocationContext::default(),
        );

        assert!(matches!(execution.outcome, Err(ExecutionError::Load(_))));
        assert!(runner.search_path().dirs().is_empty());
    }
}
