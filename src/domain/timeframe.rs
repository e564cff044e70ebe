use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ChartError, ChartResult};
use crate::utils::TimeUtils;

/// Bar aggregation granularity.
///
/// Declaration order runs coarse to fine, so `Ord` sorts daily first.
/// `M` is minutes throughout; lower-case spellings are accepted on input.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::Display,
)]
pub enum Timeframe {
    #[serde(rename = "1D", alias = "1d")]
    #[strum(to_string = "1D", serialize = "1d")]
    Day1,
    #[serde(rename = "4H", alias = "4h")]
    #[strum(to_string = "4H", serialize = "4h")]
    Hour4,
    #[serde(rename = "1H", alias = "1h")]
    #[strum(to_string = "1H", serialize = "1h")]
    Hour1,
    #[serde(rename = "15M", alias = "15m")]
    #[strum(to_string = "15M", serialize = "15m")]
    Min15,
    #[serde(rename = "5M", alias = "5m")]
    #[strum(to_string = "5M", serialize = "5m")]
    Min5,
    #[serde(rename = "1M", alias = "1m")]
    #[strum(to_string = "1M", serialize = "1m")]
    Min1,
}

impl Timeframe {
    /// Parse a user-facing label ("1D", "15M", "5m", ...).
    pub fn from_label(label: &str) -> ChartResult<Self> {
        Timeframe::from_str(label.trim()).map_err(|_| ChartError::unknown_timeframe(None, label))
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::Day1 => 24 * 60,
            Timeframe::Hour4 => 4 * 60,
            Timeframe::Hour1 => 60,
            Timeframe::Min15 => 15,
            Timeframe::Min5 => 5,
            Timeframe::Min1 => 1,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.minutes() * TimeUtils::MS_IN_MIN)
    }

    pub fn is_intraday(&self) -> bool {
        *self != Timeframe::Day1
    }

    pub fn is_finer_than(&self, other: Timeframe) -> bool {
        self.minutes() < other.minutes()
    }

    /// Start of the bucket `ts` falls into.
    ///
    /// Buckets never straddle midnight: the session date is the outer grouping,
    /// intraday buckets are counted from 00:00 of that date.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let midnight = ts.date().and_time(chrono::NaiveTime::MIN);
        if !self.is_intraday() {
            return midnight;
        }
        let minute_of_day = i64::from(ts.hour()) * 60 + i64::from(ts.minute());
        let bucket = minute_of_day / self.minutes() * self.minutes();
        midnight + TimeDelta::minutes(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use strum::IntoEnumIterator;

    #[test]
    fn labels_parse_in_both_cases() {
        assert_eq!(Timeframe::from_label("1D").unwrap(), Timeframe::Day1);
        assert_eq!(Timeframe::from_label("15m").unwrap(), Timeframe::Min15);
        assert_eq!(Timeframe::from_label("1M").unwrap(), Timeframe::Min1);
        assert_eq!(Timeframe::from_label("4h").unwrap(), Timeframe::Hour4);
    }

    #[test]
    fn unsupported_label_is_unknown_timeframe() {
        let err = Timeframe::from_label("1W").unwrap_err();
        assert_eq!(err, ChartError::unknown_timeframe(None, "1W"));
    }

    #[test]
    fn display_round_trips_through_from_label() {
        for tf in Timeframe::iter() {
            assert_eq!(Timeframe::from_label(&tf.to_string()).unwrap(), tf);
        }
    }

    #[test]
    fn ordering_is_coarse_to_fine() {
        let all: Vec<Timeframe> = Timeframe::iter().collect();
        assert!(all.windows(2).all(|w| w[0] < w[1] && w[1].is_finer_than(w[0])));
    }

    #[test]
    fn bucket_start_aligns_to_midnight() {
        let ts = NaiveDate::from_ymd_opt(2025, 5, 8)
            .unwrap()
            .and_hms_opt(9, 47, 0)
            .unwrap();
        let day = ts.date();
        assert_eq!(Timeframe::Min15.bucket_start(ts), day.and_hms_opt(9, 45, 0).unwrap());
        assert_eq!(Timeframe::Hour4.bucket_start(ts), day.and_hms_opt(8, 0, 0).unwrap());
        assert_eq!(Timeframe::Day1.bucket_start(ts), day.and_hms_opt(0, 0, 0).unwrap());
    }
}
