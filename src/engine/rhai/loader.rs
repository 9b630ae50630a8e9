//! Loading of code units into an isolated namespace.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rhai::{AST, CallFnOptions, Dynamic, Engine, EvalAltResult, FnPtr, Scope};

use crate::engine::{ExecutionError, ScriptException};

/// Number of arguments every entry point receives: `(event, context)`.
pub const ENTRY_POINT_ARITY: usize = 2;

/// A compiled code unit whose top-level code has run exactly once.
///
/// Its namespace is the unit's script functions plus the variables its
/// top-level code left in scope.
#[derive(Debug)]
pub struct LoadedUnit {
    /// Unit name, the file's base name without extension.
    pub name: String,
    /// Path the unit was loaded from.
    pub path: PathBuf,
    ast: AST,
    scope: Scope<'static>,
}

/// A member of a unit's namespace, looked up by name.
#[derive(Debug, Clone)]
pub enum Member {
    /// Script functions with this name, by number of parameters.
    Functions(Vec<usize>),
    /// A top-level variable.
    Variable(Dynamic),
}

/// A callable entry point.
#[derive(Debug, Clone)]
pub enum EntryPoint {
    /// A script function taking `(event, context)`.
    Function(String),
    /// A top-level variable holding a function pointer or closure.
    Closure(FnPtr),
}

impl LoadedUnit {
    /// Reads, compiles and runs the unit at `path`.
    pub fn load(engine: &Engine, path: &Path) -> Result<Self, ExecutionError> {
        if !path.is_file() {
            return Err(ExecutionError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = fs::read_to_string(path)
            .map_err(|source| ExecutionError::Unreadable { path: path.to_path_buf(), source })?;

        let mut ast = engine
            .compile(&source)
            .map_err(|err| ExecutionError::Load(ScriptException::from(err)))?;
        ast.set_source(path.display().to_string());

        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| ExecutionError::Load(ScriptException::from(*err)))?;

        tracing::debug!(unit = %name, functions = ast.iter_functions().count(), "Unit loaded.");
        Ok(Self { name, path: path.to_path_buf(), ast, scope })
    }

    /// Looks up a namespace member by name. Functions shadow variables.
    pub fn member(&self, name: &str) -> Option<Member> {
        let arities: Vec<usize> = self
            .ast
            .iter_functions()
            .filter(|function| function.name == name)
            .map(|function| function.params.len())
            .collect();
        if !arities.is_empty() {
            return Some(Member::Functions(arities));
        }

        self.scope.get_value::<Dynamic>(name).map(Member::Variable)
    }

    /// Finds the entry point `name` and checks it can be called with
    /// `(event, context)`.
    pub fn entry_point(&self, name: &str) -> Result<EntryPoint, ExecutionError> {
        let not_callable = |reason: String| ExecutionError::NotCallable {
            name: name.to_string(),
            file: self.file_name(),
            reason,
        };

        match self.member(name) {
            Some(Member::Functions(arities)) if arities.contains(&ENTRY_POINT_ARITY) => {
                Ok(EntryPoint::Function(name.to_string()))
            }
            Some(Member::Functions(arities)) => Err(not_callable(format!(
                "'{name}' takes {arities:?} parameter(s), expected {ENTRY_POINT_ARITY} (event, context)"
            ))),
            Some(Member::Variable(value)) if value.is::<FnPtr>() => {
                Ok(EntryPoint::Closure(value.cast::<FnPtr>()))
            }
            Some(Member::Variable(value)) => {
                Err(not_callable(format!("'{name}' is a value of type '{}'", value.type_name())))
            }
            None => Err(ExecutionError::MissingEntryPoint {
                unit: self.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Calls `entry_point` with `(event, context)` without re-running the
    /// unit's top-level code.
    pub fn call(
        &mut self,
        engine: &Engine,
        entry_point: &EntryPoint,
        event: Dynamic,
        context: Dynamic,
    ) -> Result<Dynamic, Box<EvalAltResult>> {
        match entry_point {
            EntryPoint::Function(name) => {
                let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
                engine.call_fn_with_options(options, &mut self.scope, &self.ast, name, (event, context))
            }
            EntryPoint::Closure(fn_ptr) => fn_ptr.call(engine, &self.ast, (event, context)),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}
