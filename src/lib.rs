#![warn(missing_docs)]
//! Execution agent: runs one handler from a code unit against a JSON event
//! and reports the result as a single JSON envelope on stdout.

pub mod agent;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod handler;
pub mod input;
pub mod response;
pub mod test_helpers;
