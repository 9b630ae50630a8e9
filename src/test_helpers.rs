//! A set of helpers for testing

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::Value;

use crate::{
    agent::Agent,
    config::RhaiConfig,
    engine::rhai::{RhaiRunner, UNIT_EXTENSION},
    response::{AgentExit, Envelope},
};

/// A builder for laying out code units under a code root.
#[derive(Debug, Clone)]
pub struct UnitDirBuilder {
    root: PathBuf,
    units: Vec<(String, String)>,
}

impl UnitDirBuilder {
    /// Creates a builder for units under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), units: Vec::new() }
    }

    /// Adds a unit by dotted identifier, e.g. `pkg.math`.
    pub fn unit(mut self, unit: &str, source: &str) -> Self {
        self.units.push((unit.to_string(), source.to_string()));
        self
    }

    /// Writes every unit to disk and returns the root.
    pub fn build(self) -> io::Result<PathBuf> {
        for (unit, source) in &self.units {
            write_unit(&self.root, unit, source)?;
        }
        Ok(self.root)
    }
}

/// Writes `source` as the unit `unit` (dotted) under `root`, creating
/// intermediate directories.
pub fn write_unit(root: &Path, unit: &str, source: &str) -> io::Result<PathBuf> {
    let path = unit_path(root, unit);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, source)?;
    Ok(path)
}

/// The file a dotted unit identifier resolves to under `root`.
pub fn unit_path(root: &Path, unit: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(unit.split('.'));
    path.set_extension(UNIT_EXTENSION);
    path
}

/// An agent with default engine limits that resolves units under `root`.
pub fn agent_for(root: &Path) -> Agent<RhaiRunner> {
    Agent::with_code_root(RhaiRunner::new(&RhaiConfig::default()), root)
}

/// Renders an envelope and parses it back into JSON.
pub fn envelope_json<O: Serialize>(envelope: &Envelope<O>) -> (Value, AgentExit) {
    let (line, exit) = envelope.render();
    let value = serde_json::from_str(&line).unwrap_or(Value::Null);
    (value, exit)
}
