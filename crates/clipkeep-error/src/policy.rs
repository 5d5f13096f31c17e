use super::{Error, Severity};

/// A policy for classifying and emitting errors at an application boundary.
/// Library code in `clipkeep-*` never logs inline; it returns `Result` and
/// leaves emission to whatever policy the embedding application installs.
pub trait ErrorPolicy: Send + Sync {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &Error);
}

/// A no-op policy, useful in tests or when the caller handles errors itself.
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn emit(&self, _error: &Error) {}
}

/// Emits through `tracing`, at a level derived from [`Error::severity`].
/// `Cancelled` never reaches `Warn`/`Error` here (§7: "Cancelled ... Not logged").
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn emit(&self, error: &Error) {
        use tracing::{event, Level};
        match error.severity() {
            Severity::Debug => event!(Level::DEBUG, error = %error),
            Severity::Info => event!(Level::INFO, error = %error),
            Severity::Warn => event!(Level::WARN, error = %error),
            Severity::Error => event!(Level::ERROR, error = %error),
        }
    }
}
