//! Frame module: Core pixel data structures for the render pipeline.
//!
//! This module contains:
//! - [`Rgb`]: True-color pixel with interpolation and compositing math
//! - [`Frame`]: A grid of pixels representing one panel image
//! - [`font`]: Built-in 5x7 pixel font for panel text

mod color;
#[allow(clippy::module_inception)]
mod frame;
pub mod font;

pub use color::{hsv_to_rgb, rgb_to_hsv, Rgb};
pub use frame::Frame;
