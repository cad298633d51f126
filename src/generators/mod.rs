//! Generators module: Procedural pixel sources and frame transforms.
//!
//! Two capabilities exist, split so the compositor can branch statically:
//!
//! - [`Generator`]: full-frame sources that render from a time value and
//!   ignore whatever is on screen. Their output is max-composited over
//!   the base frame.
//! - [`FrameEffect`]: transforms that consume the current base frame and
//!   distort it. Their output replaces the displayed image outright.
//!
//! Instances are created by name through the [`GeneratorRegistry`], with
//! parameters carried in an opaque [`ParamBag`].

mod breathe;
mod color_shift;
mod glitch;
mod matrix_rain;
mod plasma;
mod rainbow_sweep;
mod scrolling_text;
mod starfield;

pub use breathe::Breathe;
pub use color_shift::ColorShift;
pub use glitch::Glitch;
pub use matrix_rain::MatrixRain;
pub use plasma::Plasma;
pub use rainbow_sweep::RainbowSweep;
pub use scrolling_text::ScrollingText;
pub use starfield::Starfield;

use crate::frame::{Frame, Rgb};
use std::collections::HashMap;

/// String-keyed parameter bag for generator construction and updates.
pub type ParamBag = serde_json::Map<String, serde_json::Value>;

/// Full-frame procedural source.
///
/// `render` takes elapsed seconds since the instance started and must
/// return a frame of the dimensions the instance was constructed with.
pub trait Generator: Send {
    /// Render a frame at time `t` (seconds since start).
    fn render(&mut self, t: f32) -> Frame;

    /// Update the displayed text, if this source draws text.
    ///
    /// Returns `false` (the default) when text is not supported.
    fn set_text(&mut self, text: &str) -> bool {
        let _ = text;
        false
    }

    /// Apply new parameters to a live instance. Unknown keys are ignored.
    fn update_params(&mut self, params: &ParamBag) {
        let _ = params;
    }
}

/// Frame-transforming overlay effect.
///
/// `apply` consumes the current base frame and returns the distorted
/// image; the result already incorporates the base.
pub trait FrameEffect: Send {
    /// Transform `base` at time `t` (seconds since the effect started).
    fn apply(&mut self, base: &Frame, t: f32) -> Frame;

    /// Update the displayed text, if this effect draws text.
    fn set_text(&mut self, text: &str) -> bool {
        let _ = text;
        false
    }

    /// Apply new parameters to a live instance. Unknown keys are ignored.
    fn update_params(&mut self, params: &ParamBag) {
        let _ = params;
    }
}

/// A live generator instance, tagged by compositing behavior.
pub enum GeneratorKind {
    /// Full-frame source, max-composited over the base frame.
    Full(Box<dyn Generator>),
    /// Frame transform, replaces the displayed image.
    Transform(Box<dyn FrameEffect>),
}

impl GeneratorKind {
    /// Forward text to the underlying instance.
    ///
    /// Returns `true` when the instance accepted it.
    pub fn set_text(&mut self, text: &str) -> bool {
        match self {
            Self::Full(g) => g.set_text(text),
            Self::Transform(e) => e.set_text(text),
        }
    }

    /// Forward a parameter update to the underlying instance.
    pub fn update_params(&mut self, params: &ParamBag) {
        match self {
            Self::Full(g) => g.update_params(params),
            Self::Transform(e) => e.update_params(params),
        }
    }
}

/// Factory signature: `(width, height, params) -> instance`.
pub type GeneratorFactory = fn(u32, u32, &ParamBag) -> GeneratorKind;

/// Name-keyed factory table for generators and effects.
#[derive(Default)]
pub struct GeneratorRegistry {
    factories: HashMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in generators and effects.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("plasma", |w, h, p| {
            GeneratorKind::Full(Box::new(Plasma::new(w, h, p)))
        });
        registry.register("starfield", |w, h, p| {
            GeneratorKind::Full(Box::new(Starfield::new(w, h, p)))
        });
        registry.register("matrix_rain", |w, h, p| {
            GeneratorKind::Full(Box::new(MatrixRain::new(w, h, p)))
        });
        registry.register("scrolling_text", |w, h, p| {
            GeneratorKind::Full(Box::new(ScrollingText::new(w, h, p)))
        });
        registry.register("breathe", |w, h, p| {
            GeneratorKind::Transform(Box::new(Breathe::new(w, h, p)))
        });
        registry.register("color_shift", |w, h, p| {
            GeneratorKind::Transform(Box::new(ColorShift::new(w, h, p)))
        });
        registry.register("rainbow_sweep", |w, h, p| {
            GeneratorKind::Transform(Box::new(RainbowSweep::new(w, h, p)))
        });
        registry.register("glitch", |w, h, p| {
            GeneratorKind::Transform(Box::new(Glitch::new(w, h, p)))
        });
        registry
    }

    /// Register a factory under a name, replacing any existing entry.
    pub fn register(&mut self, name: impl Into<String>, factory: GeneratorFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiate by name. Returns `None` for unknown names.
    pub fn create(
        &self,
        name: &str,
        width: u32,
        height: u32,
        params: &ParamBag,
    ) -> Option<GeneratorKind> {
        self.factories
            .get(name)
            .map(|factory| factory(width, height, params))
    }

    /// True if a factory exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Read a float parameter, falling back to `default` when absent or
/// not a number.
pub fn param_f32(params: &ParamBag, key: &str, default: f32) -> f32 {
    params
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .map_or(default, |v| v as f32)
}

/// Read an optional integer seed parameter.
pub fn param_seed(params: &ParamBag) -> Option<u64> {
    params.get("seed").and_then(serde_json::Value::as_u64)
}

/// Read a string parameter, falling back to `default`.
pub fn param_str(params: &ParamBag, key: &str, default: &str) -> String {
    params
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Read an `[r, g, b]` color parameter, falling back to `default` when
/// absent or malformed.
pub fn param_color(params: &ParamBag, key: &str, default: Rgb) -> Rgb {
    let Some(values) = params.get(key).and_then(serde_json::Value::as_array) else {
        return default;
    };
    if values.len() != 3 {
        return default;
    }
    let channel = |i: usize| -> Option<u8> {
        values[i]
            .as_f64()
            .map(|v| v.clamp(0.0, 255.0).round() as u8)
    };
    match (channel(0), channel(1), channel(2)) {
        (Some(r), Some(g), Some(b)) => Rgb::new(r, g, b),
        _ => default,
    }
}
