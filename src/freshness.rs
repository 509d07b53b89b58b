//! Staleness check for the cached description index.
use chrono::DateTime;
use chrono::Utc;

const SECONDS_PER_DAY: i64 = 86_400;

/// Decides whether the description index may be built from the spreadsheet.
///
/// `last_modified` of `None` counts as `now`. The elapsed time is floored to
/// whole days; the result is `false` when more than `threshold_days` elapsed
/// and `true` otherwise.
pub fn is_cache_valid(last_modified: Option<DateTime<Utc>>, threshold_days: i64, now: DateTime<Utc>) -> bool {
    let last_modified = last_modified.unwrap_or(now);
    let elapsed_days = (now - last_modified).num_seconds().div_euclid(SECONDS_PER_DAY);
    let valid = elapsed_days <= threshold_days;
    tracing::debug!(%last_modified, elapsed_days, threshold_days, valid, "checked spreadsheet freshness");
    valid
}

/// Threshold paired with a clock, checked once per enricher construction
#[derive(Clone, Copy, Debug)]
pub struct FreshnessGate {
    pub threshold_days: i64,
    pub now: DateTime<Utc>,
}

impl FreshnessGate {
    pub fn new(threshold_days: i64, now: DateTime<Utc>) -> Self {
        FreshnessGate { threshold_days, now }
    }

    pub fn is_cache_valid(&self, last_modified: Option<DateTime<Utc>>) -> bool {
        is_cache_valid(last_modified, self.threshold_days, self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn absent_timestamp_counts_as_now() {
        assert!(is_cache_valid(None, 0, now()));
    }

    #[test]
    fn old_changes_exceed_threshold() {
        assert!(!is_cache_valid(Some(now() - Duration::days(5)), 0, now()));
        assert!(!is_cache_valid(Some(now() - Duration::days(5)), 4, now()));
        assert!(is_cache_valid(Some(now() - Duration::days(5)), 5, now()));
    }

    #[test]
    fn elapsed_time_is_floored_to_days() {
        assert!(is_cache_valid(Some(now() - Duration::hours(23)), 0, now()));
        assert!(!is_cache_valid(Some(now() - Duration::hours(24)), 0, now()));
        assert!(is_cache_valid(Some(now() - Duration::hours(47)), 1, now()));
    }

    #[test]
    fn gate_uses_its_clock() {
        let gate = FreshnessGate::new(1, now());
        assert!(gate.is_cache_valid(Some(now() - Duration::days(1))));
        assert!(!gate.is_cache_valid(Some(now() - Duration::days(2))));
    }
}
