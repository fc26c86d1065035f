//! Logging sinks for engine-level errors and information.

use std::error::Error;
use std::fmt;

/// A sink that receives errors and informational messages from the engine.
pub trait Logger: Send + Sync + fmt::Debug {
    /// Log an error message.
    fn log_error(&self, message: &str);

    /// Log an error message along with its underlying cause.
    fn log_error_with(&self, message: &str, error: &dyn Error);

    /// Log an informational message.
    fn log_information(&self, message: &str);
}

/// Logger that discards everything. The engine default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log_error(&self, _message: &str) {}

    fn log_error_with(&self, _message: &str, _error: &dyn Error) {}

    fn log_information(&self, _message: &str) {}
}

/// Logger that forwards to `tracing` events under the `locus` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log_error(&self, message: &str) {
        tracing::error!(target: "locus", "{message}");
    }

    fn log_error_with(&self, message: &str, error: &dyn Error) {
        tracing::error!(target: "locus", error = %error, "{message}");
    }

    fn log_information(&self, message: &str) {
        tracing::info!(target: "locus", "{message}");
    }
}
