//! Horizontal scrolling text, right to left.

use super::{param_color, param_f32, param_str, Generator, ParamBag};
use crate::frame::font::{self, GLYPH_HEIGHT};
use crate::frame::{Frame, Rgb};

/// Scrolls a line of text across the panel.
///
/// The text is pre-rendered into a strip one panel-width wider on each
/// side, so it enters from the right edge and fully clears the left
/// before wrapping.
pub struct ScrollingText {
    width: u32,
    height: u32,
    text: String,
    speed: f32,
    color: Rgb,
    strip: Frame,
}

impl ScrollingText {
    /// Parameters: `text` (default `"VISOR"`), `speed` (default 50.0
    /// pixels per second), `color` (default cyan).
    pub fn new(width: u32, height: u32, params: &ParamBag) -> Self {
        let text = param_str(params, "text", "VISOR");
        let speed = param_f32(params, "speed", 50.0);
        let color = param_color(params, "color", Rgb::CYAN);
        let strip = Self::render_strip(width, height, &text, color);
        Self {
            width,
            height,
            text,
            speed,
            color,
            strip,
        }
    }

    fn render_strip(width: u32, height: u32, text: &str, color: Rgb) -> Frame {
        let text_w = font::text_width(text);
        let total_w = text_w + width * 2;
        let mut strip = Frame::new(total_w.max(1), height);
        let y = (height.saturating_sub(GLYPH_HEIGHT)) / 2;
        font::draw_text(&mut strip, width as i32, y as i32, text, color);
        strip
    }

    fn rebuild(&mut self) {
        self.strip = Self::render_strip(self.width, self.height, &self.text, self.color);
    }
}

impl Generator for ScrollingText {
    fn render(&mut self, t: f32) -> Frame {
        let total_w = self.strip.width();
        let offset = ((t * self.speed) as i64).rem_euclid(i64::from(total_w)) as u32;

        let mut frame = Frame::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let src_x = (offset + x) % total_w;
                if let Some(pixel) = self.strip.get(src_x, y) {
                    frame.set(x, y, pixel);
                }
            }
        }
        frame
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.text = text.to_string();
        self.rebuild();
        true
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
        let color = param_color(params, "color", self.color);
        let text = param_str(params, "text", &self.text);
        if color != self.color || text != self.text {
            self.color = color;
            self.text = text;
            self.rebuild();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_blank_then_scrolls_in() {
        let mut scroller = ScrollingText::new(32, 8, &ParamBag::new());
        // At t=0 the window sits on the blank lead-in
        let first = scroller.render(0.0);
        assert!(first.pixels().iter().all(|p| p.is_black()));
        // After scrolling one panel width the text is visible
        let later = scroller.render(32.0 / 50.0 + 0.2);
        assert!(later.pixels().iter().any(|p| !p.is_black()));
    }

    #[test]
    fn test_set_text_takes_effect() {
        let mut scroller = ScrollingText::new(32, 8, &ParamBag::new());
        assert!(scroller.set_text("HI"));
        assert_eq!(scroller.text, "HI");
        // Strip resizes with the new text
        assert_eq!(scroller.strip.width(), font::text_width("HI") + 64);
    }

    #[test]
    fn test_wraps_around() {
        let mut scroller = ScrollingText::new(32, 8, &ParamBag::new());
        let total = scroller.strip.width() as f32;
        let a = scroller.render(0.1);
        let b = scroller.render(0.1 + total / 50.0);
        assert_eq!(a, b);
    }
}
