//! Pie chart of technical areas.
use super::{chart_error, OTHER};
use crate::error::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::f64::consts::PI;
use std::path::Path;

const WIDTH: u32 = 1800;
const HEIGHT: u32 = 1200;
const TITLE_FONT_SIZE: u32 = 40;
const LEGEND_FONT_SIZE: u32 = 36;
const RADIUS: f64 = 420.0;
const EXPLODE: f64 = 0.1;
/// Percentages below this are not printed on their slice
const MIN_LABELLED_PERCENT: f64 = 4.0;

const COLORS: [RGBColor; 4] = [
    RGBColor(0x00, 0x5F, 0x73),
    RGBColor(0xAE, 0x20, 0x12),
    RGBColor(0xEE, 0x9B, 0x00),
    RGBColor(0x94, 0xD2, 0xBD),
];

/// One wedge, angles in degrees counter-clockwise from the positive x axis
#[derive(Debug, Clone)]
pub struct Slice {
    /// Area name shown in the legend
    pub label: String,
    /// Share of all rows, 0 to 100
    pub percent: f64,
    /// Start angle in degrees
    pub start_angle: f64,
    /// End angle in degrees
    pub end_angle: f64,
    /// Pulled out of the pie
    pub exploded: bool,
    /// Fill colour
    pub color: RGBColor,
}

/// Lays out wedges starting at 12 o'clock, counter-clockwise, in input order
///
/// The first wedge is pulled out unless it is `Other`.
pub fn slices(counts: &[(String, usize)]) -> Vec<Slice> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut angle = 90.0;
    counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            let fraction = *count as f64 / total as f64;
            let start = angle;
            angle += fraction * 360.0;
            Slice {
                label: label.clone(),
                percent: fraction * 100.0,
                start_angle: start,
                end_angle: angle,
                exploded: i == 0 && label != OTHER,
                color: COLORS[i % COLORS.len()],
            }
        })
        .collect()
}

/// Indices of `slices` in legend order: as drawn, with `Other` moved last
pub fn legend_order(slices: &[Slice]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slices.len()).filter(|&i| slices[i].label != OTHER).collect();
    order.extend((0..slices.len()).filter(|&i| slices[i].label == OTHER));
    order
}

/// Text printed on a wedge, or nothing for thin wedges
pub fn percent_label(percent: f64) -> Option<String> {
    if percent < MIN_LABELLED_PERCENT {
        None
    } else {
        Some(format!("{:.1}%", percent))
    }
}

fn point_at(center: (f64, f64), radius: f64, degrees: f64) -> (i32, i32) {
    let rad = degrees * PI / 180.0;
    (
        (center.0 + radius * rad.cos()).round() as i32,
        (center.1 - radius * rad.sin()).round() as i32,
    )
}

/// Draws the pie chart of `counts` to a PNG at `path`
pub fn render_pie(path: &Path, title: &str, counts: &[(String, usize)]) -> Result<()> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let title_style = TextStyle::from(("sans-serif", TITLE_FONT_SIZE).into_font().style(FontStyle::Bold))
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw_text(title, &title_style, ((WIDTH / 2) as i32, 30))
        .map_err(chart_error)?;

    let wedges = slices(counts);
    if wedges.is_empty() {
        let style = TextStyle::from(("sans-serif", LEGEND_FONT_SIZE).into_font())
            .color(&RGBColor(150, 150, 150))
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw_text("No categorized rows", &style, ((WIDTH / 2) as i32, (HEIGHT / 2) as i32))
            .map_err(chart_error)?;
        root.present().map_err(chart_error)?;
        return Ok(());
    }

    let center = (WIDTH as f64 * 0.35, HEIGHT as f64 * 0.55);
    let text_size = if wedges.iter().any(|w| w.percent < 10.0) { 30 } else { 40 };
    let percent_style = TextStyle::from(("sans-serif", text_size).into_font().style(FontStyle::Bold))
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for wedge in &wedges {
        let mid = (wedge.start_angle + wedge.end_angle) / 2.0;
        let origin = if wedge.exploded {
            let (x, y) = point_at(center, RADIUS * EXPLODE, mid);
            (x as f64, y as f64)
        } else {
            center
        };

        let mut points = vec![(origin.0.round() as i32, origin.1.round() as i32)];
        let steps = ((wedge.end_angle - wedge.start_angle).ceil() as usize).max(2);
        for step in 0..=steps {
            let angle = wedge.start_angle + (wedge.end_angle - wedge.start_angle) * step as f64 / steps as f64;
            points.push(point_at(origin, RADIUS, angle));
        }
        root.draw(&Polygon::new(points, wedge.color.filled()))
            .map_err(chart_error)?;

        if let Some(text) = percent_label(wedge.percent) {
            root.draw_text(&text, &percent_style, point_at(origin, RADIUS * 0.6, mid))
                .map_err(chart_error)?;
        }
    }

    let legend_x = (WIDTH as f64 * 0.68) as i32;
    let mut legend_y = (center.1 - 40.0 * wedges.len() as f64) as i32;
    let legend_style = TextStyle::from(("sans-serif", LEGEND_FONT_SIZE).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for index in legend_order(&wedges) {
        let wedge = &wedges[index];
        root.draw(&Rectangle::new(
            [(legend_x, legend_y - 16), (legend_x + 32, legend_y + 16)],
            wedge.color.filled(),
        ))
        .map_err(chart_error)?;
        root.draw_text(&wedge.label, &legend_style, (legend_x + 48, legend_y))
            .map_err(chart_error)?;
        legend_y += 80;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}
