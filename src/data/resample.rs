//! Session-grouped aggregation of fine bars into coarser timeframes.

use itertools::Itertools;

use crate::domain::Timeframe;
use crate::domain::bar::{Bar, merge_bars};

/// Aggregate a strictly increasing series into `target` buckets.
///
/// Bars are grouped by session date first, then by the clock bucket of
/// `target` inside that session. Buckets that contain no bars produce no
/// output bar. The result depends only on the input slice.
pub fn resample(bars: &[Bar], target: Timeframe) -> Vec<Bar> {
    let mut out = Vec::new();
    let sessions = bars.iter().chunk_by(|bar| bar.timestamp.date());
    for (_date, session) in &sessions {
        let buckets = session.chunk_by(|bar| target.bucket_start(bar.timestamp));
        for (bucket_start, group) in &buckets {
            if let Some(bar) = merge_bars(bucket_start, group.copied()) {
                out.push(bar);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::minute_bars;
    use crate::utils::time_utils::parse_timestamp;

    #[test]
    fn fifteen_minute_buckets_skip_gaps() {
        // 09:30..09:59 then a gap, then 10:30..10:34
        let mut bars = minute_bars("2025-05-08 09:30", 30, 10.0);
        bars.extend(minute_bars("2025-05-08 10:30", 5, 20.0));

        let out = resample(&bars, Timeframe::Min15);
        let starts: Vec<String> = out.iter().map(|b| b.timestamp.to_string()).collect();
        assert_eq!(
            starts,
            vec![
                "2025-05-08 09:30:00",
                "2025-05-08 09:45:00",
                "2025-05-08 10:30:00"
            ]
        );
        assert_eq!(out[0].open, bars[0].open);
        assert_eq!(out[0].close, bars[14].close);
        assert_eq!(out[2].volume, 5.0);
    }

    #[test]
    fn daily_buckets_follow_sessions() {
        let mut bars = minute_bars("2025-05-08 15:58", 4, 10.0);
        bars.extend(minute_bars("2025-05-09 09:30", 3, 12.0));

        let out = resample(&bars, Timeframe::Day1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, parse_timestamp("2025-05-08").unwrap());
        assert_eq!(out[1].timestamp, parse_timestamp("2025-05-09").unwrap());
        assert_eq!(out[0].volume, 4.0);
    }

    #[test]
    fn resampling_is_idempotent() {
        let bars = minute_bars("2025-05-08 09:30", 120, 50.0);
        let hourly = resample(&bars, Timeframe::Hour1);
        assert_eq!(resample(&hourly, Timeframe::Hour1), hourly);
        assert_eq!(resample(&bars, Timeframe::Hour1), hourly);
        assert!(resample(&[], Timeframe::Hour1).is_empty());
    }
}
