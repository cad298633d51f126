//! Display module: Output backends for rendered frames.
//!
//! This module contains:
//! - [`DisplaySink`]: The capability every backend exposes to the pipeline
//! - [`MockDisplay`]: A headless sink that records frames for tests
//! - [`TerminalDisplay`]: An ANSI half-block preview of the panel

mod mock;
mod terminal;

pub use mock::MockDisplay;
pub use terminal::TerminalDisplay;

use crate::frame::Frame;

/// Output capability consumed by the render pipeline.
///
/// A sink is a single mutable slot with last-write-wins semantics: it
/// always shows the most recently pushed frame and provides no queueing
/// or backpressure. Implementations take `&self` and guard their state
/// internally because frames arrive from several threads (playback,
/// transition, effect refresh).
pub trait DisplaySink: Send + Sync {
    /// Panel width in pixels.
    fn width(&self) -> u32;

    /// Panel height in pixels.
    fn height(&self) -> u32;

    /// Push a frame to the panel, replacing whatever is shown.
    fn show_image(&self, frame: &Frame);

    /// Blank the panel.
    fn clear(&self);

    /// Set brightness, clamped to 0-100.
    fn set_brightness(&self, value: u8);

    /// Current brightness (0-100).
    fn brightness(&self) -> u8;
}
