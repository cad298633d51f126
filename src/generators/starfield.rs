//! 3D starfield flying outward from center.

use super::{param_color, param_f32, param_seed, Generator, ParamBag};
use crate::frame::{Frame, Rgb};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

struct Star {
    /// Normalized position in [-1, 1] on each axis.
    x: f32,
    y: f32,
    /// Depth in (0, 1]; stars fly toward the viewer as z shrinks.
    z: f32,
}

/// Perspective starfield: stars spawn at random depth and accelerate
/// outward as their z approaches zero.
pub struct Starfield {
    width: u32,
    height: u32,
    speed: f32,
    color: Rgb,
    stars: Vec<Star>,
    rng: SmallRng,
    last_t: f32,
}

impl Starfield {
    /// Parameters: `speed` (default 1.0), `count` (default 40),
    /// `color` (default white), `seed` (optional, for deterministic
    /// output).
    pub fn new(width: u32, height: u32, params: &ParamBag) -> Self {
        let mut rng = match param_seed(params) {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let count = param_f32(params, "count", 40.0).max(1.0) as usize;
        let stars = (0..count).map(|_| Self::spawn(&mut rng)).collect();
        Self {
            width,
            height,
            speed: param_f32(params, "speed", 1.0),
            color: param_color(params, "color", Rgb::WHITE),
            stars,
            rng,
            last_t: 0.0,
        }
    }

    fn spawn(rng: &mut SmallRng) -> Star {
        Star {
            x: rng.gen_range(-1.0..1.0),
            y: rng.gen_range(-1.0..1.0),
            z: rng.gen_range(0.1..1.0),
        }
    }
}

impl Generator for Starfield {
    fn render(&mut self, t: f32) -> Frame {
        let dt = if self.last_t > 0.0 {
            (t - self.last_t).max(0.0)
        } else {
            1.0 / 30.0
        };
        self.last_t = t;

        let mut frame = Frame::new(self.width, self.height);
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;

        for star in &mut self.stars {
            star.z -= self.speed * dt * 0.4;
            if star.z <= 0.02 {
                *star = Self::spawn(&mut self.rng);
                star.z = 1.0;
            }

            let px = cx + star.x / star.z * cx;
            let py = cy + star.y / star.z * cy;
            if px < 0.0 || py < 0.0 || px >= self.width as f32 || py >= self.height as f32 {
                // Off screen; respawn at the back
                *star = Self::spawn(&mut self.rng);
                star.z = 1.0;
                continue;
            }

            let brightness = (1.0 - star.z).clamp(0.1, 1.0);
            let color = self.color.scaled(brightness);
            frame.set(px as u32, py as u32, color);
            // Near stars leave a short streak toward the edge
            if star.z < 0.3 && px as u32 + 1 < self.width {
                frame.set(px as u32 + 1, py as u32, color.scaled(0.5));
            }
        }
        frame
    }

    fn update_params(&mut self, params: &ParamBag) {
        self.speed = param_f32(params, "speed", self.speed);
        self.color = param_color(params, "color", self.color);
    }
}
