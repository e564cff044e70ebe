/// Formats a price with precision scaled to its magnitude.
/// - Large (>=1000): 2 decimals
/// - Medium (1-1000): 4 decimals
/// - Small (<1): 5-8 decimals
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "0.00".to_string();
    }

    let abs_price = price.abs();
    if abs_price >= 1000.0 {
        format!("{:.2}", price)
    } else if abs_price >= 1.0 {
        format!("{:.4}", price)
    } else if abs_price >= 0.01 {
        format!("{:.5}", price)
    } else {
        // Sub-penny: 8 decimals needed to see movement
        format!("{:.8}", price)
    }
}

/// Signed percentage with two decimals, or "n/a".
pub fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(value) => format!("{:+.2}%", value),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_follows_magnitude() {
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(95123.5), "95123.50");
        assert_eq!(format_price(5.0), "5.0000");
        assert_eq!(format_price(0.5), "0.50000");
        assert_eq!(format_price(0.000_002_31), "0.00000231");
    }

    #[test]
    fn pct_is_signed_or_na() {
        assert_eq!(format_pct(Some(5.0)), "+5.00%");
        assert_eq!(format_pct(Some(-2.5)), "-2.50%");
        assert_eq!(format_pct(None), "n/a");
    }
}
