//! Shared test data.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::data::dataset::Dataset;
use crate::data::store::{ChartEntry, TimeSeriesStore};
use crate::domain::{Bar, InstrumentRecord, Timeframe};
use crate::utils::time_utils::parse_timestamp;

pub const SESSION: &str = "2025-05-08";

pub fn ts(text: &str) -> NaiveDateTime {
    parse_timestamp(text).unwrap()
}

pub fn date(text: &str) -> NaiveDate {
    ts(text).date()
}

/// `count` consecutive one-minute bars drifting up by 0.1 per bar.
pub fn minute_bars(start: &str, count: usize, base: f64) -> Vec<Bar> {
    let start = ts(start);
    (0..count)
        .map(|i| {
            let open = base + i as f64 * 0.1;
            let close = open + 0.05;
            Bar::new(
                start + TimeDelta::minutes(i as i64),
                open,
                close + 0.1,
                open - 0.1,
                close,
                1.0,
            )
        })
        .collect()
}

pub fn daily_bar(day: &str, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(ts(day), open, high, low, close, 1000.0)
}

/// Consecutive calendar days centred on `SESSION`.
fn daily_series(base: f64) -> Vec<Bar> {
    let session = ts(SESSION);
    (-30..=30)
        .map(|offset: i64| {
            let open = base + offset as f64 * 0.5;
            Bar::new(
                session + TimeDelta::days(offset),
                open,
                open + 2.0,
                open - 2.0,
                open + 1.0,
                1000.0,
            )
        })
        .collect()
}

fn intraday_record(ticker: &str, base: f64) -> InstrumentRecord {
    let mut minutes = minute_bars("2025-05-08 09:00", 60, base);
    minutes.extend(minute_bars("2025-05-08 16:00", 5, base + 6.0));
    let mut record = InstrumentRecord::new(ticker)
        .with_bars(Timeframe::Day1, daily_series(base))
        .with_bars(Timeframe::Min1, minutes);
    record.default_timeframe = Some(Timeframe::Day1);
    record
}

/// AAA and BBB carry daily and minute bars, CCC is daily only.
/// One chart each on `SESSION`, in ticker order.
pub fn three_ticker_dataset() -> Dataset {
    let session = date(SESSION);
    Dataset {
        name: "three".to_string(),
        entries: vec![
            ChartEntry::new("AAA", session),
            ChartEntry::new("BBB", session),
            ChartEntry::new("CCC", session),
        ],
        instruments: vec![
            intraday_record("AAA", 100.0),
            intraday_record("BBB", 50.0),
            InstrumentRecord::new("CCC").with_bars(Timeframe::Day1, daily_series(20.0)),
        ],
    }
}

pub fn three_tickers() -> TimeSeriesStore {
    three_ticker_dataset().into_store().unwrap()
}

/// ZKIN: a single daily bar on `SESSION`.
pub fn zkin_store() -> TimeSeriesStore {
    let record = InstrumentRecord::new("ZKIN")
        .with_bars(Timeframe::Day1, vec![daily_bar(SESSION, 10.0, 12.0, 9.0, 11.0)]);
    TimeSeriesStore::new(
        "zkin",
        vec![record],
        vec![ChartEntry::new("ZKIN", date(SESSION))],
    )
    .unwrap()
}
