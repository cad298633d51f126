//! Pulsing brightness, like slow breathing.

use super::{param_f32, FrameEffect, ParamBag};
use crate::frame::Frame;

/// Scales the whole frame by a sine-driven factor.
///
/// The factor oscillates between `1 - amplitude` and 1.0 with the
/// configured period, peaking at full brightness.
pub struct Breathe {
    period: f32,
    amplitude: f32,
}

impl Breathe {
    /// Parameters: `period` (default 3.0 seconds), `amplitude`
    /// (default 0.5, clamped to [0, 1]).
    pub fn new(_width: u32, _height: u32, params: &ParamBag) -> Self {
        Self {
            period: param_f32(params, "period", 3.0).max(0.01),
            amplitude: param_f32(params, "amplitude", 0.5).clamp(0.0, 1.0),
        }
    }
}

impl FrameEffect for Breathe {
    fn apply(&mut self, base: &Frame, t: f32) -> Frame {
        let phase = (2.0 * std::f32::consts::PI * t / self.period).sin();
        let factor = 1.0 - self.amplitude * (1.0 - phase) / 2.0;

        let mut out = base.clone();
        for pixel in out.pixels_mut() {
            *pixel = pixel.scaled(factor);
        }
        out
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.period = param_f32(params, "period", self.period).max(0.01);
        self.amplitude = param_f32(params, "amplitude", self.amplitude).clamp(0.0, 1.0);
    }
}
