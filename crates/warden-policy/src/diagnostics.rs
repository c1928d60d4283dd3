// diagnostics.rs — Sinks for the verbose evaluation trail.
//
// A verbose policy entry writes one line per evaluation step. Where those
// lines go is the embedder's choice: the default forwards them to `tracing`,
// `MemorySink` keeps them for inspection. Sink errors are reported but never
// change an authorization result.

use std::sync::Mutex;

use crate::error::PolicyError;

/// `tracing` target used by [`TracingSink`].
pub const DIAGNOSTIC_TARGET: &str = "warden::policy";

/// Receives ordered diagnostic lines from verbose policy entries.
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, line: &str) -> Result<(), PolicyError>;
}

/// Forwards every line to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, line: &str) -> Result<(), PolicyError> {
        tracing::debug!(target: DIAGNOSTIC_TARGET, "{}", line);
        Ok(())
    }
}

/// Keeps lines in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.lines.lock() {
            Ok(mut lines) => lines.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn log(&self, line: &str) -> Result<(), PolicyError> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|e| PolicyError::Sink(e.to_string()))?;
        lines.push(line.to_string());
        Ok(())
    }
}
