//! Rhai implementation of the [`CodeRunner`](crate::engine::CodeRunner)
//! capability.

mod capture;
pub mod conversions;
mod create_engine;
mod exception;
mod loader;
mod runner;
mod search_path;

pub use capture::{CaptureSinks, CaptureWindow, UNIT_OUTPUT_TARGET};
pub use conversions::ScriptValue;
pub use create_engine::create_engine;
pub use loader::{ENTRY_POINT_ARITY, EntryPoint, LoadedUnit, Member};
pub use runner::RhaiRunner;
pub use search_path::{SearchPath, SearchPathGuard, SearchPathResolver};

/// File extension of Rhai code units.
pub const UNIT_EXTENSION: &str = "rhai";
