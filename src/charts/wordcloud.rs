//! Word cloud of interest terms.
use super::chart_error;
use crate::error::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::path::Path;

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;
const TITLE_FONT_SIZE: u32 = 40;
const TITLE_HEIGHT: i32 = 90;
const MARGIN: i32 = 30;
const GAP: i32 = 18;
const MIN_FONT_SIZE: u32 = 18;
const MAX_FONT_SIZE: u32 = 120;
const MAX_WORDS: usize = 200;

const PALETTE: [RGBColor; 6] = [
    RGBColor(0x44, 0x01, 0x54),
    RGBColor(0x3B, 0x52, 0x8B),
    RGBColor(0x21, 0x90, 0x8C),
    RGBColor(0x5D, 0xC8, 0x63),
    RGBColor(0xAE, 0x20, 0x12),
    RGBColor(0x00, 0x5F, 0x73),
];

/// A term with its position (top-left corner) and size
#[derive(Debug, Clone)]
pub struct PlacedWord {
    /// The term
    pub text: String,
    /// Font size in pixels
    pub size: u32,
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Fill colour
    pub color: RGBColor,
}

/// Font size of a term, linear in its count between the min and max sizes
pub fn font_size(count: usize, max_count: usize) -> u32 {
    if max_count == 0 {
        return MIN_FONT_SIZE;
    }
    let ratio = count.min(max_count) as f64 / max_count as f64;
    MIN_FONT_SIZE + ((MAX_FONT_SIZE - MIN_FONT_SIZE) as f64 * ratio).round() as u32
}

/// Places terms in centred rows, largest first, inside `bounds`
///
/// `measure` returns the pixel extent of a term at a font size. Terms that
/// no longer fit vertically are left out.
pub fn layout_words<M>(words: &[(String, usize)], mut measure: M, bounds: (i32, i32, i32, i32)) -> Vec<PlacedWord>
where
    M: FnMut(&str, u32) -> (u32, u32),
{
    let (left, top, right, bottom) = bounds;
    let max_count = words.iter().map(|(_, c)| *c).max().unwrap_or(0);

    let mut rows: Vec<Vec<PlacedWord>> = vec![Vec::new()];
    let mut x = left;
    let mut y = top;
    let mut row_height = 0;

    for (index, (text, count)) in words.iter().take(MAX_WORDS).enumerate() {
        let size = font_size(*count, max_count);
        let (w, h) = measure(text, size);
        let (w, h) = (w as i32, h as i32);

        if x + w > right && x > left {
            rows.push(Vec::new());
            x = left;
            y += row_height + GAP;
            row_height = 0;
        }
        if y + h > bottom || w > right - left {
            continue;
        }

        if let Some(row) = rows.last_mut() {
            row.push(PlacedWord {
                text: text.clone(),
                size,
                x,
                y,
                color: PALETTE[index % PALETTE.len()],
            });
        }
        x += w + GAP;
        row_height = row_height.max(h);
    }

    // Centre every row horizontally.
    let mut placed = Vec::new();
    for row in rows {
        let Some(last) = row.last() else { continue };
        let used = last.x + measure(&last.text, last.size).0 as i32 - left;
        let shift = ((right - left) - used) / 2;
        placed.extend(row.into_iter().map(|mut word| {
            word.x += shift;
            word
        }));
    }
    placed
}

/// Draws the word cloud of `words` to a PNG at `path`
pub fn render_wordcloud(path: &Path, title: &str, words: &[(String, usize)]) -> Result<()> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let title_style = TextStyle::from(("sans-serif", TITLE_FONT_SIZE).into_font().style(FontStyle::Bold))
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw_text(title, &title_style, ((WIDTH / 2) as i32, 25))
        .map_err(chart_error)?;

    if words.is_empty() {
        let style = TextStyle::from(("sans-serif", 36).into_font())
            .color(&RGBColor(150, 150, 150))
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw_text("No topics found", &style, ((WIDTH / 2) as i32, (HEIGHT / 2) as i32))
            .map_err(chart_error)?;
        root.present().map_err(chart_error)?;
        return Ok(());
    }

    let measure = |text: &str, size: u32| {
        let style = TextStyle::from(("sans-serif", size).into_font());
        // Rough width per glyph when no font metrics are available.
        root.estimate_text_size(text, &style)
            .unwrap_or((text.chars().count() as u32 * size * 6 / 10, size))
    };
    let bounds = (MARGIN, TITLE_HEIGHT, WIDTH as i32 - MARGIN, HEIGHT as i32 - MARGIN);

    for word in layout_words(words, measure, bounds) {
        let style = TextStyle::from(("sans-serif", word.size).into_font())
            .color(&word.color)
            .pos(Pos::new(HPos::Left, VPos::Top));
        root.draw_text(&word.text, &style, (word.x, word.y))
            .map_err(chart_error)?;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}
