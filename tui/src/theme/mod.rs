//! Theme and Colors
//!
//! The canvas is black; phrases are grey levels driven by their opacity,
//! so a fading phrase sinks into the background.

use ratatui::style::Color;

// ============================================================================
// Canvas
// ============================================================================

/// Canvas background
pub const BACKGROUND: Color = Color::Rgb(0, 0, 0);

/// Frame around the canvas outside fullscreen
pub const FRAME: Color = Color::Rgb(60, 60, 60);

// ============================================================================
// Status line
// ============================================================================

/// Status text
pub const STATUS_TEXT: Color = Color::Rgb(150, 150, 150);

/// Recognition window open
pub const LISTENING: Color = Color::Rgb(120, 200, 140);

/// Recognition window closed
pub const NOT_LISTENING: Color = Color::Rgb(200, 110, 110);

/// Idle filler running
pub const IDLE: Color = Color::Rgb(180, 160, 220);

/// Text colour for a phrase at the given opacity
pub fn opacity_color(opacity: u8) -> Color {
    Color::Rgb(opacity, opacity, opacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_extremes() {
        assert_eq!(opacity_color(0), BACKGROUND);
        assert_eq!(opacity_color(255), Color::Rgb(255, 255, 255));
    }
}
