//! Staleness classification for site update timestamps.
//!
//! [`classify`] maps a raw backend timestamp and a reference instant to a
//! [`Recency`] bucket.  It is pure and total: absent values, garbage strings
//! and future dates all land in a bucket instead of panicking.  Buckets are
//! recomputed on every render, so the display drifts forward with the clock
//! without any stored state.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

/// Sites whose last update is older than this many days count as stale.
pub const STALE_AFTER_DAYS: i64 = 30;

/// How recently a site was updated, bucketed for display.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Recency {
    /// The backend has no update timestamp for this site.
    NeverUpdated,
    /// The timestamp string could not be parsed.
    Invalid,
    /// Updated under a minute ago.  Future timestamps (clock skew between
    /// client and backend) also land here.
    JustNow,
    MinutesAgo(i64),
    HoursAgo(i64),
    DaysAgo(i64),
    /// Updated more than [`STALE_AFTER_DAYS`] days ago; carries the parsed
    /// timestamp so the display can show the absolute date.
    StaleBeyondThreshold(DateTime<Utc>),
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recency::NeverUpdated => f.write_str("Never Updated Since Load"),
            Recency::Invalid => f.write_str("Invalid Date"),
            Recency::JustNow => f.write_str("Just now"),
            Recency::MinutesAgo(n) => write!(f, "{n} minute{} ago", plural(*n)),
            Recency::HoursAgo(n) => write!(f, "{n} hour{} ago", plural(*n)),
            Recency::DaysAgo(n) => write!(f, "{n} day{} ago", plural(*n)),
            Recency::StaleBeyondThreshold(ts) => write!(
                f,
                "More than {STALE_AFTER_DAYS} days ago @ {}",
                ts.format("%B %d, %Y - (%I:%M %p)")
            ),
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Parse a backend timestamp string.
///
/// Accepts RFC 3339 (`2026-08-12T09:30:00Z`) and the backend's naive ISO
/// form (`2026-08-12T09:30:00.123456`), which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Classify a raw timestamp against a reference instant.
///
/// The delta is floored to whole minutes, hours and days in turn, and the
/// first bucket whose unit reaches 1 wins; anything under a minute is
/// [`Recency::JustNow`].
pub fn classify(raw: Option<&str>, now: DateTime<Utc>) -> Recency {
    let Some(raw) = raw else {
        return Recency::NeverUpdated;
    };
    let Some(updated) = parse_timestamp(raw) else {
        return Recency::Invalid;
    };

    let delta = now.signed_duration_since(updated);
    let days = delta.num_days();
    if days > STALE_AFTER_DAYS {
        return Recency::StaleBeyondThreshold(updated);
    }
    if days >= 1 {
        return Recency::DaysAgo(days);
    }
    let hours = delta.num_hours();
    if hours >= 1 {
        return Recency::HoursAgo(hours);
    }
    let minutes = delta.num_minutes();
    if minutes >= 1 {
        return Recency::MinutesAgo(minutes);
    }
    Recency::JustNow
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 12, 12, 0, 0).unwrap()
    }

    fn seconds_before(secs: i64) -> String {
        (reference() - Duration::seconds(secs)).to_rfc3339()
    }

    // -- bucket boundaries -----------------------------------------------

    #[test]
    fn under_a_minute_is_just_now() {
        assert_eq!(
            classify(Some(&seconds_before(45)), reference()),
            Recency::JustNow
        );
    }

    #[test]
    fn ninety_seconds_is_one_minute() {
        assert_eq!(
            classify(Some(&seconds_before(90)), reference()),
            Recency::MinutesAgo(1)
        );
    }

    #[test]
    fn just_over_an_hour_is_one_hour() {
        assert_eq!(
            classify(Some(&seconds_before(3_700)), reference()),
            Recency::HoursAgo(1)
        );
    }

    #[test]
    fn just_over_a_day_is_one_day() {
        assert_eq!(
            classify(Some(&seconds_before(90_000)), reference()),
            Recency::DaysAgo(1)
        );
    }

    #[test]
    fn thirty_days_exactly_is_not_yet_stale() {
        assert_eq!(
            classify(Some(&seconds_before(30 * 86_400)), reference()),
            Recency::DaysAgo(30)
        );
    }

    #[test]
    fn beyond_thirty_days_is_stale_with_the_parsed_timestamp() {
        let updated = reference() - Duration::days(31);
        assert_eq!(
            classify(Some(&updated.to_rfc3339()), reference()),
            Recency::StaleBeyondThreshold(updated)
        );
    }

    #[test]
    fn future_timestamps_fall_through_to_just_now() {
        let updated = reference() + Duration::minutes(10);
        assert_eq!(
            classify(Some(&updated.to_rfc3339()), reference()),
            Recency::JustNow
        );
    }

    // -- degenerate inputs -----------------------------------------------

    #[test]
    fn missing_timestamp_is_never_updated() {
        assert_eq!(classify(None, reference()), Recency::NeverUpdated);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(classify(Some("not-a-date"), reference()), Recency::Invalid);
        assert_eq!(classify(Some(""), reference()), Recency::Invalid);
        assert_eq!(classify(Some("2026-13-99"), reference()), Recency::Invalid);
    }

    #[test]
    fn naive_backend_timestamps_parse_as_utc() {
        assert_eq!(
            classify(Some("2026-08-12T11:58:30.123456"), reference()),
            Recency::MinutesAgo(1)
        );
    }

    // -- parsing -----------------------------------------------------------

    #[test]
    fn parse_accepts_rfc3339_offsets() {
        let parsed = parse_timestamp("2026-08-12T14:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn parse_accepts_naive_timestamps_without_fractions() {
        let parsed = parse_timestamp("2026-08-12T09:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 12, 9, 30, 0).unwrap());
    }

    // -- display -----------------------------------------------------------

    #[test]
    fn single_units_are_singular() {
        assert_eq!(Recency::MinutesAgo(1).to_string(), "1 minute ago");
        assert_eq!(Recency::HoursAgo(1).to_string(), "1 hour ago");
        assert_eq!(Recency::DaysAgo(1).to_string(), "1 day ago");
    }

    #[test]
    fn multiple_units_are_plural() {
        assert_eq!(Recency::MinutesAgo(5).to_string(), "5 minutes ago");
        assert_eq!(Recency::HoursAgo(2).to_string(), "2 hours ago");
        assert_eq!(Recency::DaysAgo(2).to_string(), "2 days ago");
    }

    #[test]
    fn stale_display_includes_the_absolute_date() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 9, 5, 0).unwrap();
        assert_eq!(
            Recency::StaleBeyondThreshold(ts).to_string(),
            "More than 30 days ago @ January 15, 2026 - (09:05 AM)"
        );
    }
}
