use crate::domain::Bar;

/// Simple moving average of closes. The first `period - 1` values are `None`.
pub fn sma(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }
    let mut out = Vec::with_capacity(bars.len());
    let mut running = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        running += bar.close;
        if i >= period {
            running -= bars[i - period].close;
        }
        out.push((i + 1 >= period).then(|| running / period as f64));
    }
    out
}

pub fn sma_name(period: usize) -> String {
    format!("SMA_{}", period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time_utils::parse_timestamp;

    fn closes(values: &[f64]) -> Vec<Bar> {
        let ts = parse_timestamp("2025-05-08").unwrap();
        values
            .iter()
            .map(|&c| Bar::new(ts, c, c, c, c, 0.0))
            .collect()
    }

    #[test]
    fn rolling_mean_with_warmup() {
        let bars = closes(&[101.0, 102.0, 103.0, 104.0, 105.0]);
        let values = sma(&bars, 3);
        assert_eq!(values, vec![None, None, Some(102.0), Some(103.0), Some(104.0)]);
    }

    #[test]
    fn period_longer_than_series_is_all_none() {
        let bars = closes(&[1.0, 2.0]);
        assert_eq!(sma(&bars, 5), vec![None, None]);
        assert_eq!(sma(&bars, 0), vec![None, None]);
        assert_eq!(sma_name(20), "SMA_20");
    }
}
