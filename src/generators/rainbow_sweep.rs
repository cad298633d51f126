//! Rainbow recolor swept across the x-axis.

use super::{param_f32, FrameEffect, ParamBag};
use crate::frame::{hsv_to_rgb, Frame};

/// Recolors lit pixels with a rainbow keyed to their x position.
///
/// Pixel brightness follows the original channel maximum, so shading
/// inside the expression survives the recolor. Black pixels stay black.
pub struct RainbowSweep {
    speed: f32,
}

impl RainbowSweep {
    /// Parameters: `speed` (default 1.0; 120 degrees of sweep per
    /// second at speed 1).
    pub fn new(_width: u32, _height: u32, params: &ParamBag) -> Self {
        Self {
            speed: param_f32(params, "speed", 1.0),
        }
    }
}

impl FrameEffect for RainbowSweep {
    fn apply(&mut self, base: &Frame, t: f32) -> Frame {
        let width = base.width().max(1) as f32;
        let shift = t * self.speed * 120.0;

        let mut out = base.clone();
        for y in 0..base.height() {
            for x in 0..base.width() {
                let Some(pixel) = base.get(x, y) else { continue };
                if pixel.is_black() {
                    continue;
                }
                let value = f32::from(pixel.r.max(pixel.g).max(pixel.b)) / 255.0;
                let hue = (x as f32 / width).mul_add(360.0, shift);
                out.set(x, y, hsv_to_rgb(hue, 1.0, value));
            }
        }
        out
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
    }
}
