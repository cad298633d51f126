//! Flowing plasma from overlapping sine waves.

use super::{param_f32, Generator, ParamBag};
use crate::frame::{hsv_to_rgb, Frame};

/// Classic sine-interference plasma.
///
/// Four phase-shifted waves (two axis-aligned, one diagonal, one radial)
/// are summed per pixel and mapped onto the hue wheel.
pub struct Plasma {
    width: u32,
    height: u32,
    speed: f32,
    scale: f32,
}

impl Plasma {
    /// Parameters: `speed` (default 1.0), `scale` (default 8.0, pixels
    /// per wave unit).
    pub fn new(width: u32, height: u32, params: &ParamBag) -> Self {
        Self {
            width,
            height,
            speed: param_f32(params, "speed", 1.0),
            scale: param_f32(params, "scale", 8.0).max(0.1),
        }
    }
}

impl Generator for Plasma {
    fn render(&mut self, t: f32) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        let tt = t * self.speed;

        for y in 0..self.height {
            for x in 0..self.width {
                let fx = x as f32 / self.scale;
                let fy = y as f32 / self.scale;

                let mut v = (fx + tt).sin();
                v += ((fy + tt) / 2.0).sin();
                v += ((fx + fy + tt) / 2.0).sin();

                let cx = fx / 2.0 + (tt / 3.0).sin();
                let cy = fy / 2.0 + (tt / 2.0).cos();
                v += (cx.mul_add(cx, cy * cy) + 1.0).sqrt().sin() + tt.sin() * 0.5;

                // v is roughly in [-3.5, 3.5]; fold onto the hue wheel
                let hue = (v + 3.5) / 7.0 * 360.0;
                frame.set(x, y, hsv_to_rgb(hue, 1.0, 1.0));
            }
        }
        frame
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
        self.scale = param_f32(params, "scale", self.scale).max(0.1);
    }
}
