//! Logging capability injected into every component
//!
//! Components never call the global `tracing` macros directly; they hold an
//! `Arc<dyn Logger>` so callers decide where records go.

use std::error::Error as StdError;
use std::fmt;

/// A single structured field attached to a log record
pub type Field<'a> = (&'static str, &'a dyn fmt::Display);

/// Logging capability with structured fields
pub trait Logger: Send + Sync {
    /// Record an informational event
    fn info(&self, message: &str, fields: &[Field<'_>]);

    /// Record a failure together with its cause
    fn error(&self, message: &str, error: &dyn StdError, fields: &[Field<'_>]);
}

/// Logger backed by `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        if fields.is_empty() {
            tracing::info!("{message}");
        } else {
            tracing::info!(fields = %FieldList(fields), "{message}");
        }
    }

    fn error(&self, message: &str, error: &dyn StdError, fields: &[Field<'_>]) {
        if fields.is_empty() {
            tracing::error!(error = %error, "{message}");
        } else {
            tracing::error!(error = %error, fields = %FieldList(fields), "{message}");
        }
    }
}

/// Renders fields as `key=value` pairs separated by spaces
struct FieldList<'a, 'b>(&'a [Field<'b>]);

impl fmt::Display for FieldList<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
