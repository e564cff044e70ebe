//! Extended-hours spans for intraday session shading.

use chrono::{NaiveDateTime, NaiveTime};
use itertools::Itertools;
use serde::Serialize;

use crate::config::chart::SessionHours;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionKind {
    Premarket,
    Aftermarket,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSpan {
    pub kind: SessionKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

fn clock(hm: (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hm.0, hm.1, 0).unwrap_or(NaiveTime::MIN)
}

/// Per session date: one span over the bars before the open and one over the
/// bars at or after the close. Dates without such bars get no span.
pub fn session_spans(bars: &[Bar], hours: &SessionHours) -> Vec<SessionSpan> {
    let open = clock(hours.market_open);
    let close = clock(hours.market_close);
    let mut spans = Vec::new();

    let sessions = bars.iter().chunk_by(|bar| bar.timestamp.date());
    for (_date, session) in &sessions {
        let stamps: Vec<NaiveDateTime> = session.map(|b| b.timestamp).collect();
        let pre = stamps.iter().filter(|t| t.time() < open);
        push_span(&mut spans, SessionKind::Premarket, pre);
        let post = stamps.iter().filter(|t| t.time() >= close);
        push_span(&mut spans, SessionKind::Aftermarket, post);
    }
    spans
}

fn push_span<'a>(
    spans: &mut Vec<SessionSpan>,
    kind: SessionKind,
    mut stamps: impl Iterator<Item = &'a NaiveDateTime>,
) {
    if let Some(start) = stamps.next() {
        let end = stamps.last().unwrap_or(start);
        spans.push(SessionSpan {
            kind,
            start: *start,
            end: *end,
        });
    }
}
