//! §SPEC_FULL "Configuration": a small, explicitly-constructed `Config`
//! passed into [`crate::Engine::open`]. Per the design note in §9 ("Global
//! singletons (settings, logger) ... passed explicitly at construction via
//! a small Config struct; no ambient state inside the engine"), nothing in
//! this workspace reaches for a global/lazy-static equivalent of this.

use std::path::PathBuf;
use std::time::Duration;

use clipkeep_ingest::{ClassificationThresholds, PollConfig, PrivacyFilter};

/// §4.I's pruner defaults: triggered on startup and once per session after
/// an insert.
pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024 * 1024; // 2 GiB
pub const DEFAULT_KEEP_RATIO: f64 = 0.8;

/// Caller-supplied configuration for one opened engine instance (§6.3:
/// "Polling interval, classification thresholds, database path, and
/// privacy filters ... are supplied by the caller on open").
#[derive(Debug, Clone)]
pub struct Config {
    /// §6.3: "Single directory per user" — the canonical directory this
    /// engine's `store.{ext}` and trigram index live under.
    pub db_path: PathBuf,
    /// A legacy directory name to check for a one-shot migration (§6.3,
    /// §9). `None` disables the migration check entirely.
    pub legacy_db_path: Option<PathBuf>,
    pub poll: PollConfig,
    pub privacy: PrivacyFilter,
    pub classification_thresholds: ClassificationThresholds,
    /// §4.I pruner inputs.
    pub max_bytes: u64,
    pub keep_ratio: f64,
    /// §5: "Link metadata fetch: 10s per request."
    pub link_fetch_timeout: Duration,
}

impl Config {
    /// Builds a config pointed at `db_path` with every other field at its
    /// spec-documented default (§4.I keep_ratio default 0.8, §5's 10s link
    /// timeout, and `clipkeep_ingest`'s adaptive polling/privacy defaults).
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            legacy_db_path: None,
            poll: PollConfig::default(),
            privacy: PrivacyFilter::default(),
            classification_thresholds: ClassificationThresholds::default(),
            max_bytes: DEFAULT_MAX_BYTES,
            keep_ratio: DEFAULT_KEEP_RATIO,
            link_fetch_timeout: Duration::from_secs(10),
        }
    }
}
