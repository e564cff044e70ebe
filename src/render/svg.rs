//! Headless rendering collaborator producing SVG documents.

use std::fmt::{self, Write};

use chrono::NaiveDateTime;

use crate::config::PLOT_CONFIG;
use crate::data::sessions::SessionKind;
use crate::domain::bar::CandleType;
use crate::domain::{ChartPoint, PaneId};
use crate::engine::render::{MarkerRole, Overlay, PaneFrame, RenderSurface};
use crate::error::{ChartError, ChartResult};

/// Plot area inside the canvas margins, mapping chart to pixel coordinates.
struct PlotArea<'a> {
    frame: &'a PaneFrame,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea<'_> {
    fn new(frame: &PaneFrame) -> PlotArea<'_> {
        PlotArea {
            frame,
            left: PLOT_CONFIG.margin,
            top: PLOT_CONFIG.margin,
            width: PLOT_CONFIG.width - 2.0 * PLOT_CONFIG.margin,
            height: PLOT_CONFIG.height - 2.0 * PLOT_CONFIG.margin,
        }
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn xy(&self, point: &ChartPoint) -> Option<(f64, f64)> {
        let (x, y) = self.frame.viewport.position_of(point)?;
        Some((self.left + x * self.width, self.top + y * self.height))
    }

    fn x(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.xy(&ChartPoint::new(timestamp, 0.0)).map(|(x, _)| x)
    }

    fn y(&self, price: f64) -> Option<f64> {
        let (low, high) = self.frame.viewport.price_range?;
        Some(self.top + (high - price) / (high - low) * self.height)
    }

    /// Horizontal room per bar.
    fn slot_width(&self) -> f64 {
        self.width / self.frame.bars.len().max(1) as f64
    }
}

/// Context passed to every layer during rendering.
struct LayerContext<'a> {
    frame: &'a PaneFrame,
    area: PlotArea<'a>,
}

/// A standardized layer in the SVG stack.
trait SvgLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result;
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// 1. BACKGROUND + WATERMARK
// ============================================================================
struct BackgroundLayer;

impl SvgLayer for BackgroundLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result {
        writeln!(
            out,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            PLOT_CONFIG.background_color
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}" fill="{}">{}</text>"#,
            PLOT_CONFIG.width / 2.0,
            PLOT_CONFIG.height / 2.0,
            PLOT_CONFIG.watermark_font_size,
            PLOT_CONFIG.watermark_color,
            escape(&ctx.frame.watermark)
        )
    }
}

// ============================================================================
// 2. SESSION SHADING
// ============================================================================
struct SessionLayer;

impl SvgLayer for SessionLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result {
        let half_slot = ctx.area.slot_width() / 2.0;
        for overlay in &ctx.frame.overlays {
            let Overlay::SessionSpan(span) = overlay else {
                continue;
            };
            let (Some(x0), Some(x1)) = (ctx.area.x(span.start), ctx.area.x(span.end)) else {
                continue;
            };
            let color = match span.kind {
                SessionKind::Premarket => PLOT_CONFIG.premarket_color,
                SessionKind::Aftermarket => PLOT_CONFIG.aftermarket_color,
            };
            writeln!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="{}"/>"#,
                x0 - half_slot,
                ctx.area.top,
                (x1 - x0) + 2.0 * half_slot,
                ctx.area.height,
                color,
                PLOT_CONFIG.session_fill_opacity
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// 3. CANDLES
// ============================================================================
struct CandleLayer;

impl SvgLayer for CandleLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result {
        let body_width = ctx.area.slot_width() * PLOT_CONFIG.body_width_pct;
        for bar in &ctx.frame.bars {
            let (Some(x), Some(high), Some(low)) =
                (ctx.area.x(bar.timestamp), ctx.area.y(bar.high), ctx.area.y(bar.low))
            else {
                continue;
            };
            let color = match bar.get_type() {
                CandleType::Bullish => PLOT_CONFIG.bullish_color,
                CandleType::Bearish => PLOT_CONFIG.bearish_color,
            };
            let (body_low, body_high) = bar.body_range();
            let (Some(body_top), Some(body_bottom)) = (ctx.area.y(body_high), ctx.area.y(body_low))
            else {
                continue;
            };
            writeln!(
                out,
                r#"<line x1="{x:.1}" y1="{high:.1}" x2="{x:.1}" y2="{low:.1}" stroke="{color}"/>"#
            )?;
            writeln!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x - body_width / 2.0,
                body_top,
                body_width,
                (body_bottom - body_top).max(1.0),
                color
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// 4. INDICATORS
// ============================================================================
struct IndicatorLayer;

impl SvgLayer for IndicatorLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result {
        let lines = ctx.frame.overlays.iter().filter_map(|o| match o {
            Overlay::IndicatorLine { name, points } => Some((name, points)),
            _ => None,
        });
        for (i, (name, points)) in lines.enumerate() {
            let color = PLOT_CONFIG.indicator_colors[i % PLOT_CONFIG.indicator_colors.len()];
            let path: Vec<String> = points
                .iter()
                .filter_map(|p| ctx.area.xy(p))
                .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                .collect();
            writeln!(
                out,
                r#"<polyline data-name="{}" points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                escape(name),
                path.join(" "),
                color,
                PLOT_CONFIG.line_width
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// 5. DRAWINGS + MEASUREMENTS
// ============================================================================
struct AnnotationLayer;

impl AnnotationLayer {
    fn line(out: &mut String, from: (f64, f64), to: (f64, f64), color: &str) -> fmt::Result {
        writeln!(
            out,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{}"/>"#,
            from.0, from.1, to.0, to.1, color, PLOT_CONFIG.line_width
        )
    }
}

impl SvgLayer for AnnotationLayer {
    fn render(&self, out: &mut String, ctx: &LayerContext) -> fmt::Result {
        let area = &ctx.area;
        for overlay in &ctx.frame.overlays {
            match overlay {
                Overlay::Line { from, to } => {
                    if let (Some(a), Some(b)) = (area.xy(from), area.xy(to)) {
                        Self::line(out, a, b, PLOT_CONFIG.measurement_line_color)?;
                    }
                }
                Overlay::HorizontalLine { price } => {
                    if let Some(y) = area.y(*price) {
                        Self::line(out, (area.left, y), (area.right(), y), PLOT_CONFIG.drawing_color)?;
                    }
                }
                Overlay::Ray { origin } => {
                    if let Some((x, y)) = area.xy(origin) {
                        Self::line(out, (x, y), (area.right(), y), PLOT_CONFIG.drawing_color)?;
                    }
                }
                Overlay::Marker { at, role } => {
                    if let Some((x, y)) = area.xy(at) {
                        let color = match role {
                            MarkerRole::First => PLOT_CONFIG.first_marker_color,
                            MarkerRole::Second => PLOT_CONFIG.second_marker_color,
                        };
                        writeln!(
                            out,
                            r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"/>"#,
                            x, y, PLOT_CONFIG.marker_radius, color
                        )?;
                    }
                }
                Overlay::Label { at, text } => {
                    if let Some((x, y)) = area.xy(at) {
                        writeln!(
                            out,
                            r#"<text x="{:.1}" y="{:.1}" font-size="{}" fill="{}">{}</text>"#,
                            x + PLOT_CONFIG.marker_radius * 2.0,
                            y - PLOT_CONFIG.marker_radius * 2.0,
                            PLOT_CONFIG.label_font_size,
                            PLOT_CONFIG.label_color,
                            escape(text)
                        )?;
                    }
                }
                Overlay::SessionSpan(_) | Overlay::IndicatorLine { .. } => {}
            }
        }
        Ok(())
    }
}

/// Renders frames to SVG. Keeps only the last frame drawn.
pub struct SvgSurface {
    pane: PaneId,
    last: Option<PaneFrame>,
}

impl SvgSurface {
    pub fn new(pane: PaneId) -> Self {
        Self { pane, last: None }
    }

    pub fn render_frame(frame: &PaneFrame) -> Result<String, fmt::Error> {
        let layers: [&dyn SvgLayer; 5] = [
            &BackgroundLayer,
            &SessionLayer,
            &CandleLayer,
            &IndicatorLayer,
            &AnnotationLayer,
        ];
        let ctx = LayerContext {
            frame,
            area: PlotArea::new(frame),
        };

        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            PLOT_CONFIG.width, PLOT_CONFIG.height, PLOT_CONFIG.width, PLOT_CONFIG.height
        )?;
        for layer in layers {
            layer.render(&mut out, &ctx)?;
        }
        out.push_str("</svg>\n");
        Ok(out)
    }
}

impl RenderSurface for SvgSurface {
    fn draw(&mut self, frame: &PaneFrame) -> ChartResult<()> {
        self.last = Some(frame.clone());
        Ok(())
    }

    fn screenshot(&self) -> ChartResult<Vec<u8>> {
        let frame = self.last.as_ref().ok_or(ChartError::RenderUnavailable {
            pane: self.pane,
            reason: "nothing drawn yet".to_string(),
        })?;
        Self::render_frame(frame)
            .map(String::into_bytes)
            .map_err(|e| ChartError::RenderUnavailable {
                pane: self.pane,
                reason: e.to_string(),
            })
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}
