//! Capture of user code output.
//!
//! Script `print` writes to the stdout sink, `debug` and `eprint` write to
//! the stderr sink. Text is only captured while a [`CaptureWindow`] is open;
//! anything written outside the window goes to the diagnostics channel.

use std::{cell::RefCell, rc::Rc};

use crate::engine::CapturedLogs;

/// Tracing target for user output produced outside a capture window.
pub const UNIT_OUTPUT_TARGET: &str = "unit";

/// A pair of in-memory sinks shared with the engine callbacks.
#[derive(Debug, Clone, Default)]
pub struct CaptureSinks {
    buffers: Rc<RefCell<Option<CapturedLogs>>>,
}

impl CaptureSinks {
    /// Creates sinks with no open window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line to the stdout sink.
    pub fn write_stdout(&self, text: &str) {
        match self.buffers.borrow_mut().as_mut() {
            Some(logs) => push_line(&mut logs.stdout, text),
            None => tracing::debug!(target: UNIT_OUTPUT_TARGET, stream = "stdout", "{text}"),
        }
    }

    /// Writes one line to the stderr sink.
    pub fn write_stderr(&self, text: &str) {
        match self.buffers.borrow_mut().as_mut() {
            Some(logs) => push_line(&mut logs.stderr, text),
            None => tracing::debug!(target: UNIT_OUTPUT_TARGET, stream = "stderr", "{text}"),
        }
    }

    /// Opens a capture window with empty buffers.
    pub fn open(&self) -> CaptureWindow<'_> {
        *self.buffers.borrow_mut() = Some(CapturedLogs::default());
        CaptureWindow { sinks: self }
    }

    /// Runs `f` inside a capture window and returns its result together with
    /// everything written during the call.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, CapturedLogs) {
        let window = self.open();
        let result = f();
        (result, window.close())
    }

    /// Whether a capture window is currently open.
    pub fn is_capturing(&self) -> bool {
        self.buffers.borrow().is_some()
    }
}

/// An open capture window. Dropping it stops capturing, on every exit path.
#[derive(Debug)]
pub struct CaptureWindow<'a> {
    sinks: &'a CaptureSinks,
}

impl CaptureWindow<'_> {
    /// Stops capturing and freezes the buffers.
    pub fn close(self) -> CapturedLogs {
        self.sinks.buffers.borrow_mut().take().unwrap_or_default()
    }
}

impl Drop for CaptureWindow<'_> {
    fn drop(&mut self) {
        self.sinks.buffers.borrow_mut().take();
    }
}

fn push_line(buffer: &mut String, text: &str) {
    buffer.push_str(text);
    buffer.push('\n');
}
