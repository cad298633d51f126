//! Commands accepted by the engine, from any input source.

use crate::generators::ParamBag;
use crossbeam_channel::{Receiver, Sender};

/// Capacity of the shared command queue. Commands are tiny and drained
/// quickly; a small bound keeps a runaway source from hoarding memory.
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// A control request routed to the expression manager or render pipeline.
///
/// Unknown names inside a command are ignored by the handlers; the
/// command itself never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the current expression by catalogue name.
    SetExpression(String),
    /// Set display brightness, clamped to 0-100.
    SetBrightness(u8),
    /// Route text to the active effect (or stage it for the next one).
    SetText(String),
    /// Flip the idle-blink flag.
    ToggleBlink,
    /// Activate a named effect preset.
    SetEffect(String),
    /// Remove the active effect.
    ClearEffect,
    /// Update parameters on the active effect.
    SetEffectParams(ParamBag),
}

/// Create the bounded FIFO queue all input sources feed.
pub fn command_queue() -> (Sender<Command>, Receiver<Command>) {
    crossbeam_channel::bounded(COMMAND_QUEUE_CAPACITY)
}
