use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Timestamp layout stamped into commits, e.g. `Mon Aug 24 12:00:00 2026`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Source of commit timestamps.
///
/// Timestamps feed commit ids, so pinning the clock makes ids reproducible.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render `at` in the commit timestamp layout.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_formats_stably() {
        let at = Utc.with_ymd_and_hms(2026, 8, 24, 12, 30, 5).unwrap();
        let clock = FixedClock(at);
        assert_eq!(format_timestamp(clock.now()), "Mon Aug 24 12:30:05 2026");
    }
}
