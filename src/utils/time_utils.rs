use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
    pub const STANDARD_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}

// Accepted input layouts, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp typed by a user or found in a data file.
/// A bare date means midnight of that date.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, TimeUtils::STANDARD_TIME_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TimeUtils::STANDARD_DATETIME_FORMAT).to_string()
}

/// Absolute distance between two timestamps in (fractional) days.
pub fn abs_days_between(a: NaiveDateTime, b: NaiveDateTime) -> f64 {
    (b - a).num_milliseconds().abs() as f64 / TimeUtils::MS_IN_D as f64
}
