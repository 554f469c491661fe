//! Diagnostics sink
//!
//! Every component receives its sink at construction time. Recording a
//! diagnostic never blocks and never fails.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared handle to a diagnostic sink
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Destination for internal diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic, optionally with the error that caused it
    fn record(&self, severity: Severity, message: &str, cause: Option<&(dyn Error + 'static)>);
}

/// Sink forwarding every diagnostic to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Shared handle to a tracing sink
    pub fn shared() -> SharedSink {
        Arc::new(TracingSink)
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&self, severity: Severity, message: &str, cause: Option<&(dyn Error + 'static)>) {
        match (severity, cause) {
            (Severity::Debug, None) => tracing::debug!(target: "telemetry_spool", "{}", message),
            (Severity::Debug, Some(e)) => {
                tracing::debug!(target: "telemetry_spool", error = %e, "{}", message)
            }
            (Severity::Info, None) => tracing::info!(target: "telemetry_spool", "{}", message),
            (Severity::Info, Some(e)) => {
                tracing::info!(target: "telemetry_spool", error = %e, "{}", message)
            }
            (Severity::Warn, None) => tracing::warn!(target: "telemetry_spool", "{}", message),
            (Severity::Warn, Some(e)) => {
                tracing::warn!(target: "telemetry_spool", error = %e, "{}", message)
            }
            (Severity::Error, None) => tracing::error!(target: "telemetry_spool", "{}", message),
            (Severity::Error, Some(e)) => {
                tracing::error!(target: "telemetry_spool", error = %e, "{}", message)
            }
        }
    }
}

/// A diagnostic captured by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Rendered cause, if one was attached
    pub cause: Option<String>,
}

/// In-memory sink, mostly useful in tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().clone()
    }

    /// Recorded diagnostics at the given severity
    pub fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.records
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    /// Whether any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|d| d.message.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, severity: Severity, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.records.lock().push(Diagnostic {
            severity,
            message: message.to_string(),
            cause: cause.map(|e| e.to_string()),
        });
    }
}
