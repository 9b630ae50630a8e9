//! Reads the invocation event from standard input.

use std::io::Read;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading the event document.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input stream could not be read.
    #[error("Stdin read error: {0}")]
    Read(#[from] std::io::Error),

    /// The input is not a valid JSON document.
    #[error("Invalid event JSON input: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The event passed as the first argument to the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct EventData(pub Value);

impl EventData {
    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for EventData {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}

/// Reads the whole input once and parses it as JSON. Empty input yields an
/// empty object.
pub fn read_event<R: Read>(mut reader: R) -> Result<EventData, InputError> {
    tracing::info!("Reading event data from stdin...");
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;

    if raw.is_empty() {
        tracing::warn!("Warning: Received empty event data from stdin.");
        return Ok(EventData::default());
    }

    let value = serde_json::from_str(&raw)?;
    tracing::info!(bytes = raw.len(), "Event data read and parsed successfully.");
    Ok(EventData(value))
}
