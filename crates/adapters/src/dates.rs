//! Publication-date normalization for news search results.
//!
//! The news provider reports dates in whatever form the source page used:
//! absolute ("2025-12-11", "12/11/2025", "Dec 11, 2025"), absolute with a
//! time part ("12/11/2025, 3:00 PM"), or relative ("3 days ago"). Items
//! whose date cannot be parsed are dropped upstream rather than guessed.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Formats tried against the whole (lowercased, comma-stripped) string.
const ABSOLUTE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%b %d %Y", "%B %d %Y"];

/// Formats tried against the first token when a time part follows.
const DATE_ONLY_FORMATS: &[&str] = &["%m/%d/%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Parse a reported publication date into UTC, `None` when the format is
/// unrecognized. `now` anchors the relative forms.
pub(crate) fn parse_published_at(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let normalized = raw.to_lowercase().replace(',', "");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return None;
    }

    for format in ABSOLUTE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(normalized, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    // "12/11/2025 3:00 pm": keep the date component, drop the time.
    if let Some(first) = normalized.split_whitespace().next() {
        for format in DATE_ONLY_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(first, format) {
                return Some(date.and_time(NaiveTime::MIN).and_utc());
            }
        }
    }

    parse_relative(normalized, now)
}

/// "N minutes/hours/days ago" relative to `now`.
fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut parts = text.split_whitespace();
    let quantity: u32 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    let quantity = i64::from(quantity);

    if unit.contains("minute") {
        now.checked_sub_signed(Duration::minutes(quantity))
    } else if unit.contains("hour") {
        now.checked_sub_signed(Duration::hours(quantity))
    } else if unit.contains("day") {
        now.checked_sub_signed(Duration::days(quantity))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn iso_date() {
        assert_eq!(
            parse_published_at("2025-12-11", anchor()),
            Some(date(2025, 12, 11))
        );
    }

    #[test]
    fn us_slash_date_wins_over_day_first() {
        assert_eq!(
            parse_published_at("12/11/2025", anchor()),
            Some(date(2025, 12, 11))
        );
    }

    #[test]
    fn day_first_used_when_month_slot_is_impossible() {
        assert_eq!(
            parse_published_at("25/12/2025", anchor()),
            Some(date(2025, 12, 25))
        );
    }

    #[test]
    fn month_name_dates() {
        assert_eq!(
            parse_published_at("Dec 11, 2025", anchor()),
            Some(date(2025, 12, 11))
        );
        assert_eq!(
            parse_published_at("December 11, 2025", anchor()),
            Some(date(2025, 12, 11))
        );
    }

    #[test]
    fn date_with_time_keeps_the_date_part() {
        assert_eq!(
            parse_published_at("12/11/2025, 3:00 PM", anchor()),
            Some(date(2025, 12, 11))
        );
    }

    #[test]
    fn relative_forms() {
        assert_eq!(
            parse_published_at("3 days ago", anchor()),
            Some(anchor() - Duration::days(3))
        );
        assert_eq!(
            parse_published_at("1 hour ago", anchor()),
            Some(anchor() - Duration::hours(1))
        );
        assert_eq!(
            parse_published_at("45 minutes ago", anchor()),
            Some(anchor() - Duration::minutes(45))
        );
    }

    #[test]
    fn unknown_forms_are_none() {
        assert_eq!(parse_published_at("", anchor()), None);
        assert_eq!(parse_published_at("yesterday", anchor()), None);
        assert_eq!(parse_published_at("3 weeks ago", anchor()), None);
        assert_eq!(parse_published_at("soon", anchor()), None);
    }
}
