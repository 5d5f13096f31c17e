//! The workspace-wide error type for the clipkeep engine (§7).
//!
//! A single flat `thiserror` enum rather than layered per-category enums:
//! unlike a multi-crate static-analysis pipeline, every kind here is already
//! a leaf the caller can act on directly (retry, surface, ignore).

mod policy;
mod severity;

#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
pub use policy::{ErrorPolicy, NoopPolicy};
pub use severity::Severity;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The seven error kinds of §7, one variant each.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Cooperative cancellation of a search or fetch. Never logged.
    #[error("cancelled")]
    Cancelled,

    /// Requested id does not exist.
    #[error("item not found: {0}")]
    NotFound(u64),

    /// Insert collided on `content_hash`; converted to a timestamp bump by
    /// the caller, not surfaced as a failure. Kept as a variant so internal
    /// plumbing (e.g. the store) can report it structurally to `clipkeep-ingest`,
    /// which turns it into a no-op success.
    #[error("duplicate content_hash, existing id {0}")]
    Duplicate(u64),

    /// Image decode/encode failed; the save is aborted.
    #[error("image transcode failed: {0}")]
    Transcode(String),

    /// Underlying store reported an I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Sanity scan on startup found the trigram index out of sync with the
    /// primary store; the caller must rebuild before accepting queries.
    #[error("index inconsistent with primary store: {0}")]
    IndexInconsistency(String),

    /// Link-fetch failure; quietly marks the item's metadata `Failed`.
    #[error("network error: {0}")]
    Network(String),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::Cancelled => Severity::Debug,
            Error::Duplicate(_) => Severity::Debug,
            Error::NotFound(_) | Error::Network(_) => Severity::Info,
            Error::Transcode(_) | Error::Storage(_) | Error::IndexInconsistency(_) => {
                Severity::Error
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(e: tantivy::TantivyError) -> Self {
        Error::IndexInconsistency(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_debug_severity_and_not_logged_as_warn() {
        assert_eq!(Error::Cancelled.severity(), Severity::Debug);
    }

    #[test]
    fn storage_and_transcode_are_error_severity() {
        assert_eq!(Error::Storage("x".into()).severity(), Severity::Error);
        assert_eq!(Error::Transcode("x".into()).severity(), Severity::Error);
    }

    #[test]
    fn noop_policy_does_not_panic() {
        let policy = NoopPolicy;
        policy.emit(&Error::NotFound(42));
    }
}
