//! Hue rotation of non-black pixels.

use super::{param_f32, FrameEffect, ParamBag};
use crate::frame::{hsv_to_rgb, rgb_to_hsv, Frame};

/// Walks the hue of every lit pixel around the color wheel over time.
///
/// Black pixels stay black so the face silhouette is preserved.
pub struct ColorShift {
    speed: f32,
}

impl ColorShift {
    /// Parameters: `speed` (default 1.0; 60 degrees of hue per second
    /// at speed 1).
    pub fn new(_width: u32, _height: u32, params: &ParamBag) -> Self {
        Self {
            speed: param_f32(params, "speed", 1.0),
        }
    }
}

impl FrameEffect for ColorShift {
    fn apply(&mut self, base: &Frame, t: f32) -> Frame {
        let offset = (t * self.speed * 60.0).rem_euclid(360.0);

        let mut out = base.clone();
        for pixel in out.pixels_mut() {
            if pixel.is_black() {
                continue;
            }
            let (h, s, v) = rgb_to_hsv(*pixel);
            *pixel = hsv_to_rgb(h + offset, s, v);
        }
        out
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
    }
}
