//! Handler references (`<unit>.<entrypoint>`) and their resolution to code
//! unit files under the code root.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Separator between unit segments and the entry-point name.
pub const SEPARATOR: char = '.';

/// Errors that can occur while parsing a handler reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerParseError {
    /// The reference has fewer than two segments.
    #[error("Invalid handler format. Expected 'filename.funcname', got '{0}'")]
    MissingSeparator(String),

    /// One of the segments is empty (e.g. `math..add` or `.add`).
    #[error("Invalid handler format. Empty segment in '{0}'")]
    EmptySegment(String),

    /// A unit segment contains a path separator.
    #[error("Invalid handler format. Segment '{segment}' in '{reference}' contains a path separator")]
    InvalidSegment {
        /// The full handler reference.
        reference: String,
        /// The offending segment.
        segment: String,
    },
}

/// A parsed handler reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerReference {
    unit_segments: Vec<String>,
    entry_point: String,
}

impl HandlerReference {
    /// Parses a handler reference. The last segment is the entry point, all
    /// preceding segments form the unit identifier.
    pub fn parse(reference: &str) -> Result<Self, HandlerParseError> {
        let mut segments: Vec<&str> = reference.split(SEPARATOR).collect();
        if segments.len() < 2 {
            return Err(HandlerParseError::MissingSeparator(reference.to_string()));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(HandlerParseError::EmptySegment(reference.to_string()));
        }

        let entry_point = segments.pop().map(str::to_string).unwrap_or_default();
        if let Some(segment) = segments.iter().find(|s| s.contains(['/', '\\'])) {
            return Err(HandlerParseError::InvalidSegment {
                reference: reference.to_string(),
                segment: segment.to_string(),
            });
        }

        Ok(Self { unit_segments: segments.into_iter().map(str::to_string).collect(), entry_point })
    }

    /// The unit identifier, segments rejoined with the separator.
    pub fn unit(&self) -> String {
        self.unit_segments.join(&SEPARATOR.to_string())
    }

    /// The name of the entry point inside the unit.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Maps the unit identifier to `<root>/<seg>/.../<last>.<extension>`.
    pub fn resolve(&self, code_root: &Path, extension: &str) -> ResolvedHandler {
        let mut path = code_root.to_path_buf();
        path.extend(&self.unit_segments);
        path.set_extension(extension);
        ResolvedHandler { unit: self.unit(), path, entry_point: self.entry_point.clone() }
    }
}

impl fmt::Display for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.unit(), SEPARATOR, self.entry_point)
    }
}

/// A handler reference resolved against the code root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHandler {
    /// The unit identifier, e.g. `pkg.math`.
    pub unit: String,
    /// Absolute path of the code unit file.
    pub path: PathBuf,
    /// The entry-point name.
    pub entry_point: String,
}
