//! Rolling query window: `[today - offset, today - offset + 1d)` in UTC,
//! truncated to whole days.

use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

/// Format the API expects for window bounds.
pub const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// One whole day, `offset_days` before the day containing `now`.
    pub fn days_back(now: DateTime<Utc>, offset_days: u32) -> Self {
        let midnight = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
        let start = midnight - Duration::days(i64::from(offset_days));
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Value for the `window` query parameter.
    pub fn to_param(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}",
            self.start.format(WINDOW_FORMAT),
            self.end.format(WINDOW_FORMAT)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn yesterday_window_is_one_whole_day() {
        let now = Utc.with_ymd_and_hms(2021, 12, 15, 13, 47, 5).unwrap();
        let w = QueryWindow::days_back(now, 1);
        assert_eq!(w.to_param(), "2021-12-14T00:00:00Z,2021-12-15T00:00:00Z");
    }

    #[test]
    fn zero_offset_covers_today() {
        let now = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
        let w = QueryWindow::days_back(now, 0);
        assert_eq!(w.start, now);
        assert_eq!(w.end - w.start, Duration::days(1));
    }

    #[test]
    fn window_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2022, 3, 1, 8, 0, 0).unwrap();
        let w = QueryWindow::days_back(now, 1);
        assert_eq!(w.to_param(), "2022-02-28T00:00:00Z,2022-03-01T00:00:00Z");
    }
}
