use crate::skills::{RadarSeries, CHART_SCALE};
use crate::ui::escape;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write;

pub const GRID_LEVELS: usize = 10;
pub const RADAR_HEIGHT: f64 = 300.0;
const RADIUS_SHARE: f64 = 0.6;
const LABEL_OFFSET: f64 = 20.0;
const POINT_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub label: String,
    pub end: Point,
    pub label_at: Point,
}

/// Fully resolved radar chart geometry for one container width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLayout {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub radius: f64,
    /// Ring radii, innermost first.
    pub rings: Vec<f64>,
    pub axes: Vec<RadarAxis>,
    /// Polygon vertices in axis order; the polygon closes back to the first.
    pub vertices: Vec<Point>,
}

/// Axis `i` of `n` starts at the top and proceeds clockwise.
pub fn axis_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return -PI / 2.0;
    }
    index as f64 * (2.0 * PI / count as f64) - PI / 2.0
}

pub fn layout(width: f64, series: &RadarSeries) -> RadarLayout {
    let width = width.max(0.0);
    let height = RADAR_HEIGHT;
    let center = Point {
        x: width / 2.0,
        y: height / 2.0,
    };
    let radius = center.x.min(center.y) * RADIUS_SHARE;

    let rings = (1..=GRID_LEVELS)
        .map(|level| radius * level as f64 / GRID_LEVELS as f64)
        .collect();

    let count = series.labels.len();
    let axes = series
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let angle = axis_angle(i, count);
            RadarAxis {
                label: label.clone(),
                end: polar(center, radius, angle),
                label_at: polar(center, radius + LABEL_OFFSET, angle),
            }
        })
        .collect();

    let vertices = series
        .values
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, value)| polar(center, value * (radius / CHART_SCALE), axis_angle(i, count)))
        .collect();

    RadarLayout {
        width,
        height,
        center,
        radius,
        rings,
        axes,
        vertices,
    }
}

pub fn render_svg(layout: &RadarLayout) -> String {
    let mut svg = format!(
        r#"<svg width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" role="img" aria-label="Skills radar chart">"#,
        w = layout.width,
        h = layout.height,
    );

    for ring in &layout.rings {
        let _ = write!(
            svg,
            r#"<circle class="grid-line" cx="{:.2}" cy="{:.2}" r="{:.2}" />"#,
            layout.center.x, layout.center.y, ring
        );
    }

    for axis in &layout.axes {
        let _ = write!(
            svg,
            r#"<line class="grid-line" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" />"#,
            layout.center.x, layout.center.y, axis.end.x, axis.end.y
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            axis.label_at.x,
            axis.label_at.y,
            escape(&axis.label)
        );
    }

    let points: Vec<String> = layout
        .vertices
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect();
    let _ = write!(
        svg,
        r#"<polygon class="skill-polygon" points="{}" />"#,
        points.join(" ")
    );

    for vertex in &layout.vertices {
        let _ = write!(
            svg,
            r#"<circle class="skill-point" cx="{:.2}" cy="{:.2}" r="{POINT_RADIUS}" />"#,
            vertex.x, vertex.y
        );
    }

    svg.push_str("</svg>");
    svg
}

fn polar(center: Point, distance: f64, angle: f64) -> Point {
    Point {
        x: center.x + distance * angle.cos(),
        y: center.y + distance * angle.sin(),
    }
}
