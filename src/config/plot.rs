//! Plot visualization configuration

/// Colours are SVG colour strings.
pub struct PlotConfig {
    pub background_color: &'static str,
    pub bullish_color: &'static str,
    pub bearish_color: &'static str,
    pub premarket_color: &'static str,
    pub aftermarket_color: &'static str,
    /// Cycled through for successive indicator lines
    pub indicator_colors: &'static [&'static str],
    pub drawing_color: &'static str,
    pub first_marker_color: &'static str,
    pub second_marker_color: &'static str,
    pub measurement_line_color: &'static str,
    pub label_color: &'static str,
    pub watermark_color: &'static str,
    /// Canvas size in px
    pub width: f64,
    pub height: f64,
    /// Inner margin around the plot area in px
    pub margin: f64,
    /// Fraction of a bar slot taken by the candle body
    pub body_width_pct: f64,
    pub marker_radius: f64,
    pub line_width: f64,
    /// Opacity of session shading (0.0 = invisible, 1.0 = fully opaque)
    pub session_fill_opacity: f64,
    pub watermark_font_size: f64,
    pub label_font_size: f64,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    background_color: "#131722",
    bullish_color: "#26a69a",  // Teal
    bearish_color: "#ef5350",  // Red
    premarket_color: "#2962ff", // Blue
    aftermarket_color: "#ff9800", // Orange
    indicator_colors: &[
        "#ffd54f", // Amber
        "#ba68c8", // Purple
        "#4dd0e1", // Cyan
        "#aed581", // Light green
    ],
    drawing_color: "#e0e0e0",
    first_marker_color: "#00e676", // Green
    second_marker_color: "#ff1744", // Red
    measurement_line_color: "#ffffff",
    label_color: "#ffffff",
    watermark_color: "rgba(255,255,255,0.15)",
    width: 1200.0,
    height: 600.0,
    margin: 24.0,
    body_width_pct: 0.7,
    marker_radius: 5.0,
    line_width: 1.5,
    session_fill_opacity: 0.12,
    watermark_font_size: 48.0,
    label_font_size: 14.0,
};
