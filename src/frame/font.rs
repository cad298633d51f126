//! Built-in 5x7 pixel font for panel text.
//!
//! Covers ASCII 32..=90; lowercase input is uppercased before lookup and
//! anything else renders as a blank advance. Each glyph is 7 row bytes
//! with the low 5 bits as columns (bit 4 = leftmost).

use super::color::Rgb;
use super::frame::Frame;

/// Glyph width in pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph height in pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character (glyph + 1px gap).
pub const GLYPH_ADVANCE: u32 = 6;

static FONT_5X7: [u8; 59 * 7] = [
    // Space (32)
    0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000,
    // ! (33)
    0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100,
    // " (34)
    0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000,
    // # (35)
    0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010,
    // $ (36)
    0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100,
    // % (37)
    0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011,
    // & (38)
    0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101,
    // ' (39)
    0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000,
    // ( (40)
    0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010,
    // ) (41)
    0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000,
    // * (42)
    0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000,
    // + (43)
    0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000,
    // , (44)
    0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000,
    // - (45)
    0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000,
    // . (46)
    0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100,
    // / (47)
    0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000,
    // 0 (48)
    0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110,
    // 1 (49)
    0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
    // 2 (50)
    0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111,
    // 3 (51)
    0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110,
    // 4 (52)
    0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010,
    // 5 (53)
    0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110,
    // 6 (54)
    0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110,
    // 7 (55)
    0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000,
    // 8 (56)
    0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110,
    // 9 (57)
    0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100,
    // : (58)
    0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000,
    // ; (59)
    0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000,
    // < (60)
    0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010,
    // = (61)
    0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000,
    // > (62)
    0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000,
    // ? (63)
    0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100,
    // @ (64)
    0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110,
    // A (65)
    0b01110, 0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001,
    // B (66)
    0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110,
    // C (67)
    0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110,
    // D (68)
    0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100,
    // E (69)
    0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111,
    // F (70)
    0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000,
    // G (71)
    0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111,
    // H (72)
    0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
    // I (73)
    0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
    // J (74)
    0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100,
    // K (75)
    0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001,
    // L (76)
    0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111,
    // M (77)
    0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001,
    // N (78)
    0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001,
    // O (79)
    0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
    // P (80)
    0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000,
    // Q (81)
    0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101,
    // R (82)
    0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001,
    // S (83)
    0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110,
    // T (84)
    0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
    // U (85)
    0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
    // V (86)
    0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100,
    // W (87)
    0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010,
    // X (88)
    0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001,
    // Y (89)
    0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100,
    // Z (90)
    0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111,
];

fn glyph_rows(c: char) -> Option<&'static [u8]> {
    let upper = c.to_ascii_uppercase();
    let code = upper as u32;
    if !(32..=90).contains(&code) {
        return None;
    }
    let index = (code - 32) as usize;
    Some(&FONT_5X7[index * 7..(index + 1) * 7])
}

/// Pixel width of `text` at one glyph per character, including gaps.
pub fn text_width(text: &str) -> u32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        0
    } else {
        count * GLYPH_ADVANCE - (GLYPH_ADVANCE - GLYPH_WIDTH)
    }
}

/// Draw `text` onto `frame` with its top-left corner at (x, y).
///
/// Coordinates may be negative; pixels outside the frame are clipped,
/// which is what right-to-left scrolling relies on. Characters without
/// a glyph advance the cursor but draw nothing.
pub fn draw_text(frame: &mut Frame, x: i32, y: i32, text: &str, color: Rgb) {
    let mut pen_x = x;
    for c in text.chars() {
        if let Some(rows) = glyph_rows(c) {
            for (row, &bits) in rows.iter().enumerate() {
                let py = y + row as i32;
                if py < 0 {
                    continue;
                }
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 != 0 {
                        let px = pen_x + col as i32;
                        if px >= 0 {
                            frame.set(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += GLYPH_ADVANCE as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("A"), 5);
        assert_eq!(text_width("AB"), 11);
    }

    #[test]
    fn test_draw_glyph_shape() {
        let mut frame = Frame::new(10, 10);
        draw_text(&mut frame, 1, 1, "I", Rgb::WHITE);
        // Center stem of 'I'
        assert_eq!(frame.get(3, 4), Some(Rgb::WHITE));
        // Left of the serif rows stays dark
        assert_eq!(frame.get(1, 4), Some(Rgb::BLACK));
        // Top serif spans columns 1..=3 of the glyph
        assert_eq!(frame.get(2, 1), Some(Rgb::WHITE));
    }

    #[test]
    fn test_lowercase_maps_to_uppercase() {
        let mut upper = Frame::new(8, 8);
        let mut lower = Frame::new(8, 8);
        draw_text(&mut upper, 0, 0, "V", Rgb::CYAN);
        draw_text(&mut lower, 0, 0, "v", Rgb::CYAN);
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_negative_origin_clips() {
        let mut frame = Frame::new(8, 8);
        draw_text(&mut frame, -3, -2, "H", Rgb::WHITE);
        // Must not panic, and visible remainder lands in-bounds
        assert!(frame.pixels().iter().any(|p| !p.is_black()));
    }

    #[test]
    fn test_unknown_char_advances_blank() {
        let mut frame = Frame::new(20, 8);
        draw_text(&mut frame, 0, 0, "\u{7f}I", Rgb::WHITE);
        // First cell blank, 'I' starts at the second advance
        assert_eq!(frame.get(2, 3), Some(Rgb::BLACK));
        assert_eq!(frame.get(8, 3), Some(Rgb::WHITE));
    }
}
