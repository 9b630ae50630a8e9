//! Module search path for `import` statements inside code units.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use rhai::{
    Engine, EvalAltResult, Module, ModuleResolver, Position, Shared,
    module_resolvers::FileModuleResolver,
};

/// Ordered list of directories searched when a unit imports a module.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Rc<RefCell<Vec<PathBuf>>>,
}

impl SearchPath {
    /// Creates an empty search path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `dir` at the front of the search path until the returned guard is
    /// dropped. A directory that is already present is left where it is.
    pub fn acquire(&self, dir: &Path) -> SearchPathGuard {
        let mut dirs = self.dirs.borrow_mut();
        if dirs.iter().any(|existing| existing == dir) {
            return SearchPathGuard { search_path: self.clone(), added: None };
        }

        dirs.insert(0, dir.to_path_buf());
        tracing::debug!(dir = %dir.display(), "Added unit directory to module search path.");
        SearchPathGuard { search_path: self.clone(), added: Some(dir.to_path_buf()) }
    }

    /// A snapshot of the current directories, front first.
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.borrow().clone()
    }
}

/// Removes the directory added by [`SearchPath::acquire`] when dropped.
#[derive(Debug)]
pub struct SearchPathGuard {
    search_path: SearchPath,
    added: Option<PathBuf>,
}

impl Drop for SearchPathGuard {
    fn drop(&mut self) {
        let Some(dir) = self.added.take() else {
            return;
        };
        let mut dirs = self.search_path.dirs.borrow_mut();
        if let Some(index) = dirs.iter().position(|existing| *existing == dir) {
            dirs.remove(index);
            tracing::debug!(dir = %dir.display(), "Removed unit directory from module search path.");
        }
    }
}

/// Resolves `import "name"` against the directories of a [`SearchPath`].
#[derive(Debug)]
pub struct SearchPathResolver {
    search_path: SearchPath,
    extension: String,
}

impl SearchPathResolver {
    /// Creates a resolver over `search_path` for files with `extension`.
    pub fn new(search_path: SearchPath, extension: &str) -> Self {
        Self { search_path, extension: extension.to_string() }
    }
}

impl ModuleResolver for SearchPathResolver {
    fn resolve(
        &self,
        engine: &Engine,
        _source: Option<&str>,
        path: &str,
        pos: Position,
    ) -> Result<Shared<Module>, Box<EvalAltResult>> {
        for dir in self.search_path.dirs() {
            if dir.join(path).with_extension(&self.extension).is_file() {
                let resolver =
                    FileModuleResolver::new_with_path_and_extension(dir, self.extension.as_str());
                return resolver.resolve(engine, None, path, pos);
            }
        }

        Err(Box::new(EvalAltResult::ErrorModuleNotFound(path.to_string(), pos)))
    }
}
