//! Frame-sequence playback with cooperative cancellation.

use crate::display::DisplaySink;
use crate::frame::{Frame, Rgb};
use crate::generators::GeneratorKind;
use crate::task::StopFlag;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Floor for playback rates so a zero in a manifest cannot stall a loop.
const MIN_FPS: f32 = 0.001;

/// Plays frame sequences and procedural generators into a display sink.
///
/// The engine does not enforce mutual exclusion: the owner must stop one
/// playback before starting another. Every suspension point observes the
/// stop flag, so no frame is pushed after a stop is seen.
pub struct AnimationEngine {
    sink: Arc<dyn DisplaySink>,
    stop: StopFlag,
}

impl AnimationEngine {
    /// Create an engine with its own stop flag.
    pub fn new(sink: Arc<dyn DisplaySink>) -> Self {
        Self::with_stop_flag(sink, StopFlag::new())
    }

    /// Create an engine bound to an existing flag, typically the owning
    /// task's, so cancelling the task also interrupts playback.
    pub const fn with_stop_flag(sink: Arc<dyn DisplaySink>, stop: StopFlag) -> Self {
        Self { sink, stop }
    }

    /// Request cancellation; a running playback returns at its next
    /// suspension point without pushing further frames.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Play a frame sequence at `fps`, once or looping.
    ///
    /// Returns immediately for an empty sequence. Blocks the calling
    /// thread until the sequence completes or [`AnimationEngine::stop`]
    /// is called.
    pub fn play(&self, frames: &[Frame], fps: f32, looped: bool) {
        if frames.is_empty() {
            return;
        }
        let interval = Duration::from_secs_f32(1.0 / fps.max(MIN_FPS));
        loop {
            for frame in frames {
                if self.stop.is_stopped() {
                    return;
                }
                self.sink.show_image(frame);
                if self.stop.wait(interval) {
                    return;
                }
            }
            if !looped {
                return;
            }
        }
    }

    /// Drive a generator with elapsed seconds (starting at zero) at `fps`
    /// until stopped.
    ///
    /// The generator is shared behind a mutex so the owner can reach a
    /// live instance for text or parameter updates between frames.
    /// Transform generators are rendered against a black base.
    pub fn play_procedural(&self, generator: &Mutex<GeneratorKind>, fps: f32) {
        let interval = Duration::from_secs_f32(1.0 / fps.max(MIN_FPS));
        let black = Frame::filled(self.sink.width(), self.sink.height(), Rgb::BLACK);
        let start = Instant::now();
        loop {
            if self.stop.is_stopped() {
                return;
            }
            let t = start.elapsed().as_secs_f32();
            let frame = match &mut *generator.lock().unwrap() {
                GeneratorKind::Full(source) => source.render(t),
                GeneratorKind::Transform(effect) => effect.apply(&black, t),
            };
            self.sink.show_image(&frame);
            if self.stop.wait(interval) {
                return;
            }
        }
    }
}
