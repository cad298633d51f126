//! Random glitch distortions in short bursts.

use super::{param_f32, param_seed, FrameEffect, ParamBag};
use crate::frame::{Frame, Rgb};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Burst-gated glitch: row displacement, channel offset, color blocks.
///
/// Outside a burst the frame passes through untouched. `intensity`
/// controls how often bursts trigger; each burst lasts 50-250 ms.
pub struct Glitch {
    width: u32,
    height: u32,
    intensity: f32,
    burst_end: f32,
    rng: SmallRng,
}

impl Glitch {
    /// Parameters: `intensity` (default 0.3), `seed` (optional, for
    /// deterministic output).
    pub fn new(width: u32, height: u32, params: &ParamBag) -> Self {
        let rng = match param_seed(params) {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            width,
            height,
            intensity: param_f32(params, "intensity", 0.3),
            burst_end: 0.0,
            rng,
        }
    }

    fn shift_row(frame: &mut Frame, y: u32, shift: i64) {
        let width = frame.width() as i64;
        let row: Vec<Rgb> = (0..frame.width())
            .map(|x| frame.get(x, y).unwrap_or(Rgb::BLACK))
            .collect();
        for x in 0..frame.width() {
            let src = (i64::from(x) - shift).rem_euclid(width) as u32;
            frame.set(x, y, row[src as usize]);
        }
    }

    fn shift_channel(frame: &mut Frame, channel: usize, shift: i64) {
        let width = frame.width() as i64;
        for y in 0..frame.height() {
            let row: Vec<u8> = (0..frame.width())
                .map(|x| {
                    let p = frame.get(x, y).unwrap_or(Rgb::BLACK);
                    match channel {
                        0 => p.r,
                        1 => p.g,
                        _ => p.b,
                    }
                })
                .collect();
            for x in 0..frame.width() {
                let src = (i64::from(x) - shift).rem_euclid(width) as usize;
                let mut p = frame.get(x, y).unwrap_or(Rgb::BLACK);
                match channel {
                    0 => p.r = row[src],
                    1 => p.g = row[src],
                    _ => p.b = row[src],
                }
                frame.set(x, y, p);
            }
        }
    }
}

impl FrameEffect for Glitch {
    fn apply(&mut self, base: &Frame, t: f32) -> Frame {
        if t >= self.burst_end {
            if self.rng.gen::<f32>() < self.intensity * 0.3 {
                self.burst_end = t + self.rng.gen_range(0.05..0.25);
            } else {
                return base.clone();
            }
        }

        let mut out = base.clone();

        // Row displacement
        let max_rows = (self.height / 4).max(1);
        let num_rows = self.rng.gen_range(1..=max_rows);
        for _ in 0..num_rows {
            let y = self.rng.gen_range(0..self.height);
            let reach = i64::from(self.width / 3).max(1);
            let shift = self.rng.gen_range(-reach..=reach);
            Self::shift_row(&mut out, y, shift);
        }

        // RGB channel offset
        if self.rng.gen::<f32>() < 0.5 {
            let channel = self.rng.gen_range(0..3usize);
            let shift = self.rng.gen_range(-5..=5i64);
            Self::shift_channel(&mut out, channel, shift);
        }

        // Random color blocks
        if self.rng.gen::<f32>() < 0.3 {
            let num_blocks = self.rng.gen_range(1..=3);
            for _ in 0..num_blocks {
                let bx = self.rng.gen_range(0..self.width.saturating_sub(3).max(1));
                let by = self.rng.gen_range(0..self.height.saturating_sub(1).max(1));
                let bw = self.rng.gen_range(3..=(self.width - bx).min(20).max(3));
                let bh = self.rng.gen_range(1..=(self.height - by).min(4).max(1));
                let color = Rgb::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
                out.fill_rect(bx, by, bw, bh, color);
            }
        }

        out
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.intensity = param_f32(params, "intensity", self.intensity);
    }
}
