use crate::fixed::to_fixed;
use crate::ui::escape;
use serde::Serialize;
use std::fmt::Write;

pub const RATIO_HEIGHT: f64 = 120.0;
pub const BAR_HEIGHT: f64 = 30.0;
pub const BAR_SPACING: f64 = 20.0;
/// Horizontal room kept free for the labels past the longer bar.
pub const LABEL_ROOM: f64 = 100.0;
const LABEL_GAP: f64 = 10.0;
const CORNER: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub class: &'static str,
    pub y: f64,
    pub width: f64,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioLayout {
    pub width: f64,
    pub height: f64,
    pub done: Bar,
    pub received: Bar,
}

/// Display form of an audit magnitude already expressed in KB.
pub fn format_magnitude(value: f64) -> String {
    if value >= 1000.0 {
        format!("{} MB", to_fixed(value / 1000.0, 2))
    } else {
        format!("{} KB", to_fixed(value, 0))
    }
}

/// Lays out the done/received bars so the longer one spans `width - 100`.
pub fn layout(width: f64, done: f64, received: f64) -> RatioLayout {
    let done = done.max(0.0);
    let received = received.max(0.0);
    let span = (width - LABEL_ROOM).max(0.0);
    let max = done.max(received);

    // Both zero: nothing to scale against, draw empty bars.
    let bar_width = |value: f64| if max > 0.0 { value / max * span } else { 0.0 };

    let start_y = (RATIO_HEIGHT - (2.0 * BAR_HEIGHT + BAR_SPACING)) / 2.0;
    let received_y = start_y + BAR_HEIGHT + BAR_SPACING;

    let bar = |class: &'static str, y: f64, value: f64, glyph: char| {
        let width = bar_width(value);
        Bar {
            class,
            y,
            width,
            label: format!("{} {glyph}", format_magnitude(value)),
            label_x: width + LABEL_GAP,
            label_y: y + BAR_HEIGHT / 2.0,
        }
    };

    RatioLayout {
        width: width.max(0.0),
        height: RATIO_HEIGHT,
        done: bar("done-bar", start_y, done, '↑'),
        received: bar("received-bar", received_y, received, '↓'),
    }
}

pub fn render_svg(layout: &RatioLayout) -> String {
    let mut svg = format!(
        r#"<svg width="{:.0}" height="{:.0}" role="img" aria-label="Audit ratio chart">"#,
        layout.width, layout.height
    );

    for bar in [&layout.done, &layout.received] {
        let _ = write!(
            svg,
            r#"<rect class="{}" x="0" y="{:.2}" width="{:.2}" height="{BAR_HEIGHT}" rx="{CORNER}" ry="{CORNER}" />"#,
            bar.class, bar.y, bar.width
        );
    }
    for bar in [&layout.done, &layout.received] {
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" dominant-baseline="middle">{}</text>"#,
            bar.label_x,
            bar.label_y,
            escape(&bar.label)
        );
    }

    svg.push_str("</svg>");
    svg
}
