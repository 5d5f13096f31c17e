//! §4.E adaptive polling table and §6.3 privacy filters.

use std::time::Duration;

/// §4.E's idle-duration → poll-interval table, plus the low-power override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    pub low_power: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { low_power: false }
    }
}

impl PollConfig {
    /// `idle` is the time since the pasteboard last changed. System-asleep
    /// suspension is the caller's responsibility (it stops calling `tick`
    /// entirely rather than asking this function for an interval).
    pub fn interval_for(&self, idle: Duration) -> Duration {
        if self.low_power {
            return Duration::from_millis(2_000);
        }
        if idle < Duration::from_secs(5) {
            Duration::from_millis(250)
        } else if idle < Duration::from_secs(30) {
            Duration::from_millis(500)
        } else if idle < Duration::from_secs(120) {
            Duration::from_millis(1_000)
        } else {
            Duration::from_millis(1_500)
        }
    }
}

/// §6.3: "privacy filters (ignore concealed / transient / specific app
/// ids)", supplied by the caller on open. `ignore_concealed`/`ignore_transient`
/// default to `true` since §4.E step 1 treats skipping marked items as the
/// baseline behavior; a caller wiring up a debug build of the host app can
/// flip either off to observe marked pasteboard changes anyway.
#[derive(Debug, Clone)]
pub struct PrivacyFilter {
    pub ignore_concealed: bool,
    pub ignore_transient: bool,
    pub ignored_app_ids: Vec<String>,
}

impl Default for PrivacyFilter {
    fn default() -> Self {
        Self {
            ignore_concealed: true,
            ignore_transient: true,
            ignored_app_ids: Vec::new(),
        }
    }
}

impl PrivacyFilter {
    pub fn blocks_app(&self, app_id: Option<&str>) -> bool {
        app_id.is_some_and(|id| self.ignored_app_ids.iter().any(|blocked| blocked == id))
    }
}

/// §4.E.1 thresholds for the image-description classifier, and §6.3's
/// "classification thresholds" supplied by the caller on open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationThresholds {
    /// Confidence ceiling below which a label is dropped (§4.E.1: "up to
    /// three confident category labels (confidence >= 0.35)").
    pub min_label_confidence: f32,
    pub max_labels: usize,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            min_label_confidence: 0.35,
            max_labels: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_follows_the_idle_duration_table() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.interval_for(Duration::from_secs(1)), Duration::from_millis(250));
        assert_eq!(cfg.interval_for(Duration::from_secs(10)), Duration::from_millis(500));
        assert_eq!(cfg.interval_for(Duration::from_secs(60)), Duration::from_millis(1_000));
        assert_eq!(cfg.interval_for(Duration::from_secs(600)), Duration::from_millis(1_500));
    }

    #[test]
    fn low_power_overrides_the_idle_table() {
        let cfg = PollConfig { low_power: true };
        assert_eq!(cfg.interval_for(Duration::from_secs(0)), Duration::from_millis(2_000));
    }

    #[test]
    fn privacy_filter_defaults_to_skipping_marked_items() {
        let filter = PrivacyFilter::default();
        assert!(filter.ignore_concealed);
        assert!(filter.ignore_transient);
    }

    #[test]
    fn privacy_filter_blocks_listed_app_ids() {
        let filter = PrivacyFilter {
            ignored_app_ids: vec!["com.example.vault".into()],
            ..Default::default()
        };
        assert!(filter.blocks_app(Some("com.example.vault")));
        assert!(!filter.blocks_app(Some("com.example.notes")));
        assert!(!filter.blocks_app(None));
    }
}
