//! Boot splash: a scanline sweep, the project name, then fade to black.

use crate::display::DisplaySink;
use crate::frame::font::{draw_text, text_width, GLYPH_HEIGHT};
use crate::frame::{Frame, Rgb};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BOOT_TEXT: &str = "VISOR";
const BOOT_FPS: f32 = 15.0;

/// Render one splash frame for progress `t` in `[0, 1]`.
///
/// Three phases: a cyan scanline sweeping down with a vertical glow
/// (t < 0.3), the boot text fading in (t < 0.75), and the text fading
/// back out to black.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_boot_frame(width: u32, height: u32, t: f32) -> Frame {
    let mut frame = Frame::new(width, height);

    if t < 0.3 {
        let progress = t / 0.3;
        let sweep = (progress * height as f32) as i64;
        for dy in -2..=2_i64 {
            let row = sweep + dy;
            if row < 0 || row >= i64::from(height) {
                continue;
            }
            let intensity = (255 - dy.abs() * 80).max(0) as u8;
            let color = Rgb::new(0, intensity, intensity);
            for x in 0..width {
                frame.set(x, row as u32, color);
            }
        }
    } else if t < 0.75 {
        let progress = (t - 0.3) / 0.45;
        let brightness = (progress * 3.0 * 255.0).min(255.0) as u8;
        draw_boot_text(&mut frame, brightness);
    } else {
        let progress = ((t - 0.75) / 0.25).clamp(0.0, 1.0);
        let brightness = ((1.0 - progress) * 255.0).max(0.0) as u8;
        draw_boot_text(&mut frame, brightness);
    }

    frame
}

fn draw_boot_text(frame: &mut Frame, brightness: u8) {
    let x = (i64::from(frame.width()) - i64::from(text_width(BOOT_TEXT))) / 2;
    let y = (i64::from(frame.height()) - i64::from(GLYPH_HEIGHT)) / 2;
    #[allow(clippy::cast_possible_truncation)]
    draw_text(
        frame,
        x as i32,
        y as i32,
        BOOT_TEXT,
        Rgb::new(0, brightness, brightness),
    );
}

/// Play the splash synchronously on `sink` over `duration`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn play_boot_animation(sink: &Arc<dyn DisplaySink>, duration: Duration) {
    let total = ((duration.as_secs_f32() * BOOT_FPS) as u32).max(1);
    let interval = Duration::from_secs_f32(1.0 / BOOT_FPS);
    for i in 0..=total {
        let t = i as f32 / total as f32;
        let frame = render_boot_frame(sink.width(), sink.height(), t);
        sink.show_image(&frame);
        if i < total {
            thread::sleep(interval);
        }
    }
    tracing::debug!("boot animation complete");
}
