//! Terminal display: ANSI half-block preview of the panel.
//!
//! Each terminal cell shows two vertically stacked pixels using the
//! upper-half-block glyph: foreground color = upper pixel, background
//! color = lower pixel. Output is diffed against the previously emitted
//! frame and flushed in a single `write()` syscall per push.

use super::DisplaySink;
use crate::frame::{Frame, Rgb};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::sync::Mutex;

const HALF_BLOCK: &str = "\u{2580}";

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output for one frame is accumulated here, then flushed at once
/// to prevent tearing.
struct AnsiBuffer {
    data: Vec<u8>,
}

impl AnsiBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move cursor to (x, y) position (0-indexed; ANSI is 1-indexed).
    #[inline]
    fn cursor_move(&mut self, x: u16, y: u16) {
        // Writes into a Vec cannot fail
        write!(self.data, "\x1b[{};{}H", y + 1, x + 1).unwrap();
    }

    /// Set foreground color (true color).
    #[inline]
    fn set_fg(&mut self, color: Rgb) {
        write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b).unwrap();
    }

    /// Set background color (true color).
    #[inline]
    fn set_bg(&mut self, color: Rgb) {
        write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b).unwrap();
    }

    /// Reset all attributes.
    #[inline]
    fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    #[inline]
    fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Flush to a writer in a single syscall.
    fn flush_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

struct TermState {
    /// Last frame pushed, before brightness scaling.
    last: Option<Frame>,
    /// Last frame actually emitted (after brightness scaling).
    emitted: Option<Frame>,
    brightness: u8,
    output: AnsiBuffer,
}

/// Terminal preview backend.
///
/// Construction enters raw mode and the alternate screen; both are
/// restored on drop. Write failures are logged and swallowed so a
/// dying terminal degrades output rather than control flow.
pub struct TerminalDisplay {
    width: u32,
    height: u32,
    state: Mutex<TermState>,
}

impl TerminalDisplay {
    /// Set up the terminal and create the preview.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or the alternate screen cannot be
    /// entered.
    pub fn new(width: u32, height: u32) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        execute!(stdout, cursor::Hide)?;

        Ok(Self {
            width,
            height,
            state: Mutex::new(TermState {
                last: None,
                emitted: None,
                brightness: 100,
                output: AnsiBuffer::with_capacity(65536),
            }),
        })
    }

    fn repaint(&self, state: &mut TermState) {
        let Some(last) = state.last.as_ref() else {
            return;
        };
        let scaled = scale_frame(last, state.brightness);
        state.output.clear();
        paint_diff(state.emitted.as_ref(), &scaled, &mut state.output);
        if !state.output.is_empty() {
            if let Err(e) = state.output.flush_to(&mut io::stdout()) {
                tracing::warn!("terminal write failed: {e}");
            }
        }
        state.emitted = Some(scaled);
    }
}

impl DisplaySink for TerminalDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show_image(&self, frame: &Frame) {
        let mut state = self.state.lock().unwrap();
        state.last = Some(frame.clone());
        self.repaint(&mut state);
    }

    fn clear(&self) {
        self.show_image(&Frame::filled(self.width, self.height, Rgb::BLACK));
    }

    fn set_brightness(&self, value: u8) {
        let mut state = self.state.lock().unwrap();
        state.brightness = value.min(100);
        // Rescale whatever is on screen at the new level
        self.repaint(&mut state);
    }

    fn brightness(&self) -> u8 {
        self.state.lock().unwrap().brightness
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Scale every channel by `brightness / 100` with integer math.
fn scale_frame(frame: &Frame, brightness: u8) -> Frame {
    if brightness >= 100 {
        return frame.clone();
    }
    let mut scaled = frame.clone();
    let b = u16::from(brightness);
    for pixel in scaled.pixels_mut() {
        *pixel = Rgb::new(
            ((u16::from(pixel.r) * b) / 100) as u8,
            ((u16::from(pixel.g) * b) / 100) as u8,
            ((u16::from(pixel.b) * b) / 100) as u8,
        );
    }
    scaled
}

/// Emit half-block cells for every pixel pair that changed since `prev`.
///
/// Tracks cursor position and current colors so runs of changed cells
/// cost one cursor move and color changes are only emitted when needed.
fn paint_diff(prev: Option<&Frame>, next: &Frame, out: &mut AnsiBuffer) {
    let width = next.width();
    let height = next.height();
    let rows = height.div_ceil(2);

    let mut cursor_at: Option<(u16, u16)> = None;
    let mut current_fg: Option<Rgb> = None;
    let mut current_bg: Option<Rgb> = None;
    let mut wrote = false;

    for row in 0..rows {
        let y_top = row * 2;
        let y_bot = y_top + 1;
        for x in 0..width {
            let top = next.get(x, y_top).unwrap_or(Rgb::BLACK);
            let bot = next.get(x, y_bot).unwrap_or(Rgb::BLACK);

            if let Some(prev) = prev {
                let prev_top = prev.get(x, y_top).unwrap_or(Rgb::BLACK);
                let prev_bot = prev.get(x, y_bot).unwrap_or(Rgb::BLACK);
                if prev_top == top && prev_bot == bot {
                    continue;
                }
            }

            let pos = (x as u16, row as u16);
            if cursor_at != Some(pos) {
                out.cursor_move(pos.0, pos.1);
            }
            if current_fg != Some(top) {
                out.set_fg(top);
                current_fg = Some(top);
            }
            if current_bg != Some(bot) {
                out.set_bg(bot);
                current_bg = Some(bot);
            }
            out.write_str(HALF_BLOCK);
            wrote = true;
            cursor_at = Some((pos.0 + 1, pos.1));
        }
    }

    if wrote {
        out.reset_attrs();
    }
}
