use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%B %d, %Y";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats an ISO-8601 timestamp as `January 05, 2024`.
///
/// A trailing `Z` is read as `+00:00`. The date is shown in the timestamp's
/// own offset, without conversion to local time. Anything that does not parse
/// is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&normalized) {
        return timestamp.format(DISPLAY_FORMAT).to_string();
    }

    for pattern in OFFSET_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(&normalized, pattern) {
            return timestamp.format(DISPLAY_FORMAT).to_string();
        }
    }

    for pattern in NAIVE_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(&normalized, pattern) {
            return timestamp.format(DISPLAY_FORMAT).to_string();
        }
    }

    if let Some(date) = parse_date_only(&normalized) {
        return date.format(DISPLAY_FORMAT).to_string();
    }

    raw.to_string()
}

/// Bare dates, extended or basic (`2024-01-05`, `20240105`), optionally
/// followed by an hour-only time (`2024-01-05T10`).
fn parse_date_only(value: &str) -> Option<NaiveDate> {
    let (date, hour) = match value.split_once(['T', ' ']) {
        Some((date, hour)) => (date, Some(hour)),
        None => (value, None),
    };

    if let Some(hour) = hour {
        let valid = hour.len() == 2 && hour.parse::<u32>().is_ok_and(|h| h < 24);
        if !valid {
            return None;
        }
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y%m%d"))
        .ok()
}
