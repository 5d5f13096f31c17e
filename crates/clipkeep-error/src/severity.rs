//! Coarse-grained classification for programmatic handling of errors.

/// Maps each [`crate::Error`] kind to a log level an [`crate::ErrorPolicy`]
/// can act on without inspecting the error variant itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}
