//! Matrix-style falling code rain.

use super::{param_color, param_f32, param_seed, Generator, ParamBag};
use crate::frame::{Frame, Rgb};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const COL_WIDTH: u32 = 4;
const CELL_HEIGHT: u32 = 5;
const TRAIL_LEN: u32 = 6;

/// Falling rain columns with a bright head and a fading trail.
///
/// Each column owns one drop that advances with wall-clock time and
/// wraps below the panel; `density` controls how often a wrapping drop
/// restaggers to a random height instead of re-entering immediately.
pub struct MatrixRain {
    width: u32,
    height: u32,
    speed: f32,
    density: f32,
    color: Rgb,
    trail: Vec<Rgb>,
    drops: Vec<f32>,
    rng: SmallRng,
    last_t: f32,
}

impl MatrixRain {
    /// Parameters: `color` (default matrix green `[0, 255, 70]`),
    /// `speed` (default 1.0), `density` (default 0.3), `seed`
    /// (optional).
    pub fn new(width: u32, height: u32, params: &ParamBag) -> Self {
        let mut rng = match param_seed(params) {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let color = param_color(params, "color", Rgb::new(0, 255, 70));
        let num_cols = (width / COL_WIDTH).max(1) as usize;
        let drops = (0..num_cols)
            .map(|_| rng.gen_range(-(height as f32)..0.0))
            .collect();
        Self {
            width,
            height,
            speed: param_f32(params, "speed", 1.0),
            density: param_f32(params, "density", 0.3),
            color,
            trail: Self::build_trail(color),
            drops,
            rng,
            last_t: 0.0,
        }
    }

    /// Head is bright white; the rest fades out along the trail.
    fn build_trail(color: Rgb) -> Vec<Rgb> {
        let mut trail = vec![Rgb::WHITE];
        for j in 1..TRAIL_LEN {
            let fade = (1.0 - j as f32 / TRAIL_LEN as f32).max(0.0);
            trail.push(color.scaled(fade));
        }
        trail
    }
}

impl Generator for MatrixRain {
    fn render(&mut self, t: f32) -> Frame {
        let dt = if self.last_t > 0.0 {
            (t - self.last_t).max(0.0)
        } else {
            1.0 / 30.0
        };
        self.last_t = t;

        let mut frame = Frame::new(self.width, self.height);
        let wrap = (self.height + CELL_HEIGHT * TRAIL_LEN) as f32;

        for (i, drop) in self.drops.iter_mut().enumerate() {
            *drop += self.speed * dt * 30.0;
            if *drop >= wrap {
                // Restagger some drops so the rain stays uneven
                if self.rng.gen::<f32>() < self.density {
                    *drop = self.rng.gen_range(-(CELL_HEIGHT as f32 * 4.0)..0.0);
                } else {
                    *drop -= wrap;
                }
            }

            let head_y = (*drop as i64).rem_euclid(wrap as i64);
            let x0 = i as u32 * COL_WIDTH;

            for j in 0..TRAIL_LEN {
                let y = head_y - i64::from(j * CELL_HEIGHT);
                if y >= 0 && y < i64::from(self.height) {
                    frame.fill_rect(
                        x0,
                        y as u32,
                        COL_WIDTH,
                        CELL_HEIGHT,
                        self.trail[j as usize],
                    );
                }
            }
        }
        frame
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
        self.density = param_f32(params, "density", self.density);
        let color = param_color(params, "color", self.color);
        if color != self.color {
            self.color = color;
            self.trail = Self::build_trail(color);
        }
    }
}
