//! Canvas widget
//!
//! Maps the conductor's canvas units onto terminal cells. Each phrase line
//! sits `line_height` canvas units below the previous one; when the
//! terminal is too small for that spacing the lines are pushed down a row
//! at a time so they never overprint each other.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use murmur_core::{Alignment, CanvasGeometry, PhraseView};

use crate::theme::{opacity_color, BACKGROUND};

/// Draws phrase views, oldest first, onto a black canvas
pub struct CanvasWidget<'a> {
    phrases: &'a [PhraseView],
    geometry: &'a CanvasGeometry,
}

impl<'a> CanvasWidget<'a> {
    /// Create a widget over the given views
    pub fn new(phrases: &'a [PhraseView], geometry: &'a CanvasGeometry) -> Self {
        Self { phrases, geometry }
    }
}

/// Terminal column for a canvas x, relative to the area
#[allow(clippy::cast_possible_truncation)]
fn to_col(x: i32, geometry: &CanvasGeometry, area: Rect) -> i32 {
    (x as f32 * f32::from(area.width) / geometry.width).floor() as i32
}

/// Terminal row for a canvas y, relative to the area
#[allow(clippy::cast_possible_truncation)]
fn to_row(y: f32, geometry: &CanvasGeometry, area: Rect) -> i32 {
    (y * f32::from(area.height) / geometry.height).floor() as i32
}

/// Drop leading characters until the text starts inside the area
fn clip_left(text: &str, start: i32) -> (i32, &str) {
    let mut col = start;
    let mut rest = text;
    while col < 0 {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) => {
                col += i32::try_from(c.width().unwrap_or(0)).unwrap_or(0);
                rest = chars.as_str();
            }
            None => break,
        }
    }
    (col, rest)
}

impl Widget for CanvasWidget<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(BACKGROUND));
        if area.width == 0 || area.height == 0 {
            return;
        }

        for phrase in self.phrases {
            if phrase.opacity == 0 {
                continue;
            }
            let style = Style::default().fg(opacity_color(phrase.opacity)).bg(BACKGROUND);
            let anchor_col = to_col(phrase.x, self.geometry, area);
            let mut previous_row: Option<i32> = None;

            for (i, line) in phrase.lines.iter().enumerate() {
                let y = phrase.y as f32 + i as f32 * self.geometry.line_height;
                let mut row = to_row(y, self.geometry, area);
                if let Some(prev) = previous_row {
                    row = row.max(prev + 1);
                }
                previous_row = Some(row);

                if row < 0 || row >= i32::from(area.height) {
                    continue;
                }

                let width = i32::try_from(line.width()).unwrap_or(i32::MAX);
                let start = match phrase.alignment {
                    Alignment::Left => anchor_col,
                    Alignment::Right => anchor_col - width,
                };
                let (col, text) = clip_left(line, start);
                if col >= i32::from(area.width) || text.is_empty() {
                    continue;
                }

                let (Ok(col), Ok(row)) = (u16::try_from(col), u16::try_from(row)) else {
                    continue;
                };
                let max_width = usize::from(area.width - col);
                buf.set_stringn(area.x + col, area.y + row, text, max_width, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_left() {
        assert_eq!(clip_left("hello", 2), (2, "hello"));
        assert_eq!(clip_left("hello", -2), (0, "llo"));
        assert_eq!(clip_left("hi", -5), (0, ""));
    }

    #[test]
    fn test_coordinate_mapping() {
        let geometry = CanvasGeometry::default();
        let area = Rect::new(0, 0, 96, 54);
        assert_eq!(to_col(0, &geometry, area), 0);
        assert_eq!(to_col(960, &geometry, area), 48);
        assert_eq!(to_row(540.0, &geometry, area), 27);
    }
}
