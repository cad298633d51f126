//! Frame compositor: base expression frames plus an optional procedural
//! effect layer, pushed to the display sink.
//!
//! The pipeline is itself a [`DisplaySink`], so expression playback writes
//! through it without knowing whether an effect is layered on top. A
//! dedicated refresh thread re-renders the active effect at its own rate.

use crate::display::DisplaySink;
use crate::frame::{Frame, Rgb};
use crate::generators::{GeneratorKind, GeneratorRegistry, ParamBag};
use crate::task::StopFlag;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Refresh cadence while no effect is active.
const IDLE_TICK: Duration = Duration::from_millis(50);

/// Floor for effect refresh rates, matching the playback engine.
const MIN_EFFECT_FPS: f32 = 0.001;

/// Output timestamps kept for the FPS estimate.
const FPS_WINDOW: usize = 30;

struct ActiveEffect {
    name: String,
    instance: GeneratorKind,
    interval: Duration,
    started: Instant,
    last_frame: Option<Frame>,
}

#[derive(Default)]
struct PipelineState {
    base_frame: Option<Frame>,
    effect: Option<ActiveEffect>,
    pending_text: Option<String>,
    samples: VecDeque<Instant>,
}

impl PipelineState {
    /// Stamp an output timestamp and hand the frame to the sink.
    fn push(&mut self, sink: &Arc<dyn DisplaySink>, frame: &Frame) {
        if self.samples.len() == FPS_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(Instant::now());
        sink.show_image(frame);
    }

    /// What the display should show for `base` given the current effect
    /// layer: transform output replaces the image outright, generator
    /// output is max-composited so bright overlay pixels win.
    fn composite(&self, base: &Frame) -> Frame {
        match &self.effect {
            Some(effect) => match (&effect.instance, &effect.last_frame) {
                (GeneratorKind::Transform(_), Some(rendered)) => rendered.clone(),
                (GeneratorKind::Full(_), Some(rendered)) => base.composite_max(rendered),
                (_, None) => base.clone(),
            },
            None => base.clone(),
        }
    }
}

/// Owns the displayed image: base frame, effect layer, FPS estimate.
pub struct RenderPipeline {
    sink: Arc<dyn DisplaySink>,
    registry: Arc<GeneratorRegistry>,
    state: Arc<Mutex<PipelineState>>,
    stop: StopFlag,
    ticker: Option<thread::JoinHandle<()>>,
}

impl RenderPipeline {
    /// Create a pipeline over `sink` and start its effect refresh thread.
    pub fn new(sink: Arc<dyn DisplaySink>, registry: Arc<GeneratorRegistry>) -> Self {
        let state = Arc::new(Mutex::new(PipelineState::default()));
        let stop = StopFlag::new();

        let tick_sink = sink.clone();
        let tick_state = state.clone();
        let tick_stop = stop.clone();
        let ticker = thread::Builder::new()
            .name("visor-effects".to_string())
            .spawn(move || effect_loop(&tick_sink, &tick_state, &tick_stop))
            .expect("failed to spawn effect refresh thread");

        Self {
            sink,
            registry,
            state,
            stop,
            ticker: Some(ticker),
        }
    }

    /// Activate a named effect, replacing any previous one.
    ///
    /// Unknown generator names are dropped without touching state; effect
    /// selection comes from user input and must not disturb the pipeline.
    /// Text staged via [`RenderPipeline::set_effect_text`] is handed to
    /// the new instance exactly once.
    pub fn set_effect(&self, name: &str, params: &ParamBag, fps: f32) {
        let width = self.sink.width();
        let height = self.sink.height();
        let Some(mut instance) = self.registry.create(name, width, height, params) else {
            tracing::debug!(name, "unknown effect generator, ignoring");
            return;
        };

        let mut state = self.state.lock().unwrap();
        if let Some(text) = state.pending_text.take() {
            instance.set_text(&text);
        }
        state.effect = Some(ActiveEffect {
            name: name.to_string(),
            instance,
            interval: Duration::from_secs_f32(1.0 / fps.max(MIN_EFFECT_FPS)),
            started: Instant::now(),
            last_frame: None,
        });
        tracing::info!(name, fps, "effect activated");
    }

    /// Drop the active effect and redisplay the bare base frame.
    pub fn clear_effect(&self) {
        let mut state = self.state.lock().unwrap();
        if state.effect.take().is_some() {
            tracing::info!("effect cleared");
        }
        if let Some(base) = state.base_frame.clone() {
            state.push(&self.sink, &base);
        }
    }

    /// Route text to the active effect, or stage it for the next one.
    ///
    /// Staged text is consumed by the next [`RenderPipeline::set_effect`]
    /// whether or not that effect supports text.
    pub fn set_effect_text(&self, text: &str) {
        let mut state = self.state.lock().unwrap();
        let applied = state
            .effect
            .as_mut()
            .is_some_and(|effect| effect.instance.set_text(text));
        if !applied {
            state.pending_text = Some(text.to_string());
        }
    }

    /// Update parameters on the active effect, if any.
    pub fn set_effect_params(&self, params: &ParamBag) {
        if let Some(effect) = self.state.lock().unwrap().effect.as_mut() {
            effect.instance.update_params(params);
        }
    }

    /// Name of the active effect, if one is set.
    pub fn active_effect_name(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .effect
            .as_ref()
            .map(|effect| effect.name.clone())
    }

    /// Measured output rate over the recent sample window.
    ///
    /// Zero until at least two frames have been pushed.
    #[allow(clippy::cast_precision_loss)]
    pub fn get_fps(&self) -> f32 {
        let state = self.state.lock().unwrap();
        let (Some(oldest), Some(newest)) = (state.samples.front(), state.samples.back()) else {
            return 0.0;
        };
        if state.samples.len() < 2 {
            return 0.0;
        }
        let span = newest.duration_since(*oldest).as_secs_f32();
        if span <= f32::EPSILON {
            return 0.0;
        }
        (state.samples.len() - 1) as f32 / span
    }

    fn shutdown(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl DisplaySink for RenderPipeline {
    fn width(&self) -> u32 {
        self.sink.width()
    }

    fn height(&self) -> u32 {
        self.sink.height()
    }

    /// Record `frame` as the new base and recomposite immediately with
    /// the effect frame as it currently stands, never waiting on the
    /// effect's own clock.
    fn show_image(&self, frame: &Frame) {
        let mut state = self.state.lock().unwrap();
        state.base_frame = Some(frame.clone());
        let composite = state.composite(frame);
        state.push(&self.sink, &composite);
    }

    fn clear(&self) {
        self.sink.clear();
    }

    fn set_brightness(&self, value: u8) {
        self.sink.set_brightness(value.min(100));
    }

    fn brightness(&self) -> u8 {
        self.sink.brightness()
    }
}

/// Body of the `visor-effects` thread: re-render the active effect at its
/// configured rate and recomposite.
fn effect_loop(
    sink: &Arc<dyn DisplaySink>,
    state: &Arc<Mutex<PipelineState>>,
    stop: &StopFlag,
) {
    let black = Frame::filled(sink.width(), sink.height(), Rgb::BLACK);
    loop {
        let interval = state
            .lock()
            .unwrap()
            .effect
            .as_ref()
            .map_or(IDLE_TICK, |effect| effect.interval);
        if stop.wait(interval) {
            return;
        }

        let mut guard = state.lock().unwrap();
        let shared = &mut *guard;
        let Some(effect) = shared.effect.as_mut() else {
            continue;
        };
        let base = shared.base_frame.as_ref().unwrap_or(&black);
        let t = effect.started.elapsed().as_secs_f32();
        let rendered = match &mut effect.instance {
            GeneratorKind::Full(source) => source.render(t),
            GeneratorKind::Transform(transform) => transform.apply(base, t),
        };
        let output = match &effect.instance {
            GeneratorKind::Full(_) => base.composite_max(&rendered),
            GeneratorKind::Transform(_) => rendered.clone(),
        };
        effect.last_frame = Some(rendered);
        guard.push(sink, &output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDisplay;
    use crate::generators::{FrameEffect, Generator};

    fn solid_factory(width: u32, height: u32, _params: &ParamBag) -> GeneratorKind {
        struct Solid {
            width: u32,
            height: u32,
        }
        impl Generator for Solid {
            fn render(&mut self, _t: f32) -> Frame {
                Frame::filled(self.width, self.height, Rgb::new(0, 50, 0))
            }
        }
        GeneratorKind::Full(Box::new(Solid { width, height }))
    }

    fn invert_factory(_width: u32, _height: u32, _params: &ParamBag) -> GeneratorKind {
        struct Invert;
        impl FrameEffect for Invert {
            fn apply(&mut self, base: &Frame, _t: f32) -> Frame {
                let mut out = base.clone();
                for px in out.pixels_mut() {
                    *px = Rgb::new(255 - px.r, 255 - px.g, 255 - px.b);
                }
                out
            }
        }
        GeneratorKind::Transform(Box::new(Invert))
    }

    fn test_registry() -> Arc<GeneratorRegistry> {
        let mut registry = GeneratorRegistry::new();
        registry.register("solid", solid_factory);
        registry.register("invert", invert_factory);
        Arc::new(registry)
    }

    fn pipeline() -> (Arc<MockDisplay>, RenderPipeline) {
        let sink = Arc::new(MockDisplay::new(4, 4));
        let pipeline = RenderPipeline::new(sink.clone(), test_registry());
        (sink, pipeline)
    }

    #[test]
    fn test_show_image_forwards_without_effect() {
        let (sink, pipeline) = pipeline();
        let frame = Frame::filled(4, 4, Rgb::new(100, 0, 0));
        pipeline.show_image(&frame);
        assert_eq!(sink.push_count(), 1);
        assert_eq!(sink.last_frame().unwrap().get(0, 0), Some(Rgb::new(100, 0, 0)));
    }

    #[test]
    fn test_full_effect_max_composites_over_base() {
        let (sink, pipeline) = pipeline();
        pipeline.show_image(&Frame::filled(4, 4, Rgb::new(100, 0, 0)));
        pipeline.set_effect("solid", &ParamBag::new(), 100.0);

        thread::sleep(Duration::from_millis(100));
        let shown = sink.last_frame().unwrap();
        assert_eq!(shown.get(0, 0), Some(Rgb::new(100, 50, 0)));
        assert_eq!(pipeline.active_effect_name().as_deref(), Some("solid"));
    }

    #[test]
    fn test_transform_effect_replaces_output() {
        let (sink, pipeline) = pipeline();
        pipeline.show_image(&Frame::filled(4, 4, Rgb::new(100, 0, 0)));
        pipeline.set_effect("invert", &ParamBag::new(), 100.0);

        thread::sleep(Duration::from_millis(100));
        let shown = sink.last_frame().unwrap();
        assert_eq!(shown.get(0, 0), Some(Rgb::new(155, 255, 255)));
    }

    #[test]
    fn test_unknown_effect_is_noop() {
        let (sink, pipeline) = pipeline();
        pipeline.show_image(&Frame::filled(4, 4, Rgb::new(9, 9, 9)));
        pipeline.set_effect("nope", &ParamBag::new(), 100.0);
        assert_eq!(pipeline.active_effect_name(), None);
        assert_eq!(sink.push_count(), 1);
    }

    #[test]
    fn test_clear_effect_redisplays_base() {
        let (sink, pipeline) = pipeline();
        pipeline.show_image(&Frame::filled(4, 4, Rgb::new(100, 0, 0)));
        pipeline.set_effect("solid", &ParamBag::new(), 100.0);
        thread::sleep(Duration::from_millis(100));

        pipeline.clear_effect();
        assert_eq!(pipeline.active_effect_name(), None);
        assert_eq!(sink.last_frame().unwrap().get(0, 0), Some(Rgb::new(100, 0, 0)));
    }

    #[test]
    fn test_base_push_uses_current_effect_frame() {
        let (sink, pipeline) = pipeline();
        // Effect so slow its first tick never lands during the test.
        pipeline.set_effect("solid", &ParamBag::new(), 0.001);
        pipeline.show_image(&Frame::filled(4, 4, Rgb::new(7, 7, 7)));
        // No effect frame rendered yet, so the base passes through.
        assert_eq!(sink.last_frame().unwrap().get(0, 0), Some(Rgb::new(7, 7, 7)));
    }

    static SEEN_TEXT: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn text_probe_factory(_w: u32, _h: u32, _params: &ParamBag) -> GeneratorKind {
        struct TextProbe;
        impl Generator for TextProbe {
            fn render(&mut self, _t: f32) -> Frame {
                Frame::new(4, 4)
            }
            fn set_text(&mut self, text: &str) -> bool {
                SEEN_TEXT.lock().unwrap().push(text.to_string());
                true
            }
        }
        GeneratorKind::Full(Box::new(TextProbe))
    }

    #[test]
    fn test_staged_text_hands_off_exactly_once() {
        let mut registry = GeneratorRegistry::new();
        registry.register("probe", text_probe_factory);
        let sink = Arc::new(MockDisplay::new(4, 4));
        let pipeline = RenderPipeline::new(sink, Arc::new(registry));

        pipeline.set_effect_text("HELLO");
        pipeline.set_effect("probe", &ParamBag::new(), 0.001);
        assert_eq!(SEEN_TEXT.lock().unwrap().as_slice(), ["HELLO"]);

        // The staged text was consumed; a second effect gets nothing.
        pipeline.set_effect("probe", &ParamBag::new(), 0.001);
        assert_eq!(SEEN_TEXT.lock().unwrap().as_slice(), ["HELLO"]);

        // A live text-capable effect receives text directly.
        pipeline.set_effect_text("LIVE");
        assert_eq!(SEEN_TEXT.lock().unwrap().as_slice(), ["HELLO", "LIVE"]);
    }

    #[test]
    fn test_fps_estimate() {
        let (_sink, pipeline) = pipeline();
        assert_eq!(pipeline.get_fps(), 0.0);

        let frame = Frame::new(4, 4);
        pipeline.show_image(&frame);
        assert_eq!(pipeline.get_fps(), 0.0, "one sample is not a rate");

        for _ in 0..4 {
            thread::sleep(Duration::from_millis(10));
            pipeline.show_image(&frame);
        }
        let fps = pipeline.get_fps();
        assert!(fps > 0.0 && fps < 1000.0, "implausible fps {fps}");
    }

    #[test]
    fn test_brightness_clamped_to_100() {
        let (sink, pipeline) = pipeline();
        pipeline.set_brightness(255);
        assert_eq!(sink.brightness(), 100);
        pipeline.set_brightness(40);
        assert_eq!(sink.brightness(), 40);
    }
}
