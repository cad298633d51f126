//! Expression selection: transitions, playback tasks, and the idle blink.

use crate::animation::AnimationEngine;
use crate::config::Config;
use crate::display::DisplaySink;
use crate::expression::{Expression, ExpressionCatalogue, ExpressionKind};
use crate::frame::{Frame, Rgb};
use crate::generators::{GeneratorKind, GeneratorRegistry};
use crate::task::{StopFlag, TaskHandle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Rate of cross-fade interpolation steps, independent of the target
/// expression's own playback rate.
const TRANSITION_FPS: f32 = 30.0;

/// A live procedural generator shared between its playback loop and
/// text/parameter updates arriving from commands.
pub type SharedGenerator = Arc<Mutex<GeneratorKind>>;

struct ManagerState {
    current: Option<String>,
    blink_enabled: bool,
}

/// Records the last base frame pushed through manager pathways, which
/// becomes the source frame for the next cross-fade.
struct TeeSink {
    inner: Arc<dyn DisplaySink>,
    last: Mutex<Option<Frame>>,
}

impl TeeSink {
    fn last_frame(&self) -> Option<Frame> {
        self.last.lock().unwrap().clone()
    }
}

impl DisplaySink for TeeSink {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn show_image(&self, frame: &Frame) {
        *self.last.lock().unwrap() = Some(frame.clone());
        self.inner.show_image(frame);
    }

    fn clear(&self) {
        *self.last.lock().unwrap() = None;
        self.inner.clear();
    }

    fn set_brightness(&self, value: u8) {
        self.inner.set_brightness(value);
    }

    fn brightness(&self) -> u8 {
        self.inner.brightness()
    }
}

/// Owns which expression is current and the tasks presenting it.
///
/// At most one presentation task (transition plus playback) and one blink
/// task run at a time; starting a new expression cancels and joins the
/// previous presentation task before its replacement is spawned.
pub struct ExpressionManager {
    tee: Arc<TeeSink>,
    registry: Arc<GeneratorRegistry>,
    catalogue: ExpressionCatalogue,
    state: Arc<Mutex<ManagerState>>,
    current_generator: Arc<Mutex<Option<SharedGenerator>>>,
    playback: Mutex<Option<TaskHandle>>,
    blink_task: Mutex<Option<TaskHandle>>,
    blink_range: (f32, f32),
    transition: Duration,
}

impl ExpressionManager {
    /// Create a manager pushing frames into `sink`.
    ///
    /// Blink starts enabled; intervals and the transition duration come
    /// from `config`.
    pub fn new(
        sink: Arc<dyn DisplaySink>,
        registry: Arc<GeneratorRegistry>,
        catalogue: ExpressionCatalogue,
        config: &Config,
    ) -> Self {
        let lo = config.blink_interval_min.min(config.blink_interval_max);
        let hi = config.blink_interval_min.max(config.blink_interval_max);
        let manager = Self {
            tee: Arc::new(TeeSink {
                inner: sink,
                last: Mutex::new(None),
            }),
            registry,
            catalogue,
            state: Arc::new(Mutex::new(ManagerState {
                current: None,
                blink_enabled: true,
            })),
            current_generator: Arc::new(Mutex::new(None)),
            playback: Mutex::new(None),
            blink_task: Mutex::new(None),
            blink_range: (lo, hi),
            transition: Duration::from_millis(config.transition_duration_ms),
        };
        *manager.blink_task.lock().unwrap() = Some(manager.spawn_blink_task());
        manager
    }

    /// Switch to the named expression, cross-fading from whatever is on
    /// screen. Unknown names are ignored.
    pub fn set_expression(&self, name: &str) {
        let Some(expr) = self.catalogue.get(name) else {
            tracing::debug!(name, "unknown expression, ignoring");
            return;
        };

        // Supersede the previous presentation before state changes.
        let prior = self.playback.lock().unwrap().take();
        if let Some(task) = prior {
            task.cancel();
        }
        *self.current_generator.lock().unwrap() = None;

        let old_frame = self.tee.last_frame();
        self.state.lock().unwrap().current = Some(expr.name.clone());
        tracing::info!(name, "expression set");

        let sink: Arc<dyn DisplaySink> = self.tee.clone();
        let registry = self.registry.clone();
        let slot = self.current_generator.clone();
        let transition = self.transition;
        let task = TaskHandle::spawn("visor-play", move |stop| {
            let engine = AnimationEngine::with_stop_flag(sink.clone(), stop.clone());
            if let Some(old) = old_frame {
                if !transition.is_zero() {
                    if let Some(target) = first_frame(&registry, &sink, &expr) {
                        crossfade(&sink, &old, &target, transition, &stop);
                    }
                }
            }
            if stop.is_stopped() {
                return;
            }
            show_expression(&engine, &sink, &registry, &slot, &expr);
        });
        *self.playback.lock().unwrap() = Some(task);
    }

    /// Flip the blink flag, starting or cancelling the idle-blink task.
    /// Returns the new state.
    pub fn toggle_blink(&self) -> bool {
        let enabled = {
            let mut guard = self.state.lock().unwrap();
            guard.blink_enabled = !guard.blink_enabled;
            guard.blink_enabled
        };
        let mut task = self.blink_task.lock().unwrap();
        if enabled {
            if task.is_none() {
                *task = Some(self.spawn_blink_task());
            }
        } else if let Some(handle) = task.take() {
            handle.cancel();
        }
        tracing::info!(enabled, "blink toggled");
        enabled
    }

    /// Forward text to the active procedural generator, if it takes text.
    pub fn set_text(&self, text: &str) {
        let shared = self.current_generator.lock().unwrap().clone();
        if let Some(generator) = shared {
            generator.lock().unwrap().set_text(text);
        }
    }

    /// PNG still representing the named expression: the static image, the
    /// first animation frame, or a t=0 render for procedural entries.
    pub fn get_thumbnail(&self, name: &str) -> Option<Vec<u8>> {
        let expr = self.catalogue.get(name)?;
        let width = self.tee.width();
        let height = self.tee.height();
        let frame = match &expr.kind {
            ExpressionKind::Static { image } => image.clone(),
            ExpressionKind::Animation { frames, .. } => frames.first()?.clone(),
            ExpressionKind::Procedural { generator, params, .. } => {
                let kind = self.registry.create(generator, width, height, params)?;
                render_still(kind, width, height)
            }
        };
        match frame.encode_png() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(name, "thumbnail encode failed: {e}");
                None
            }
        }
    }

    /// All expression names, sorted; the cycling order.
    pub fn expression_names(&self) -> Vec<String> {
        self.catalogue.names()
    }

    /// Name of the current expression, if one was ever set.
    pub fn current_name(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    /// Whether idle blinking is enabled.
    pub fn blink_enabled(&self) -> bool {
        self.state.lock().unwrap().blink_enabled
    }

    fn spawn_blink_task(&self) -> TaskHandle {
        let sink: Arc<dyn DisplaySink> = self.tee.clone();
        let catalogue = self.catalogue.clone();
        let state = self.state.clone();
        let (lo, hi) = self.blink_range;
        TaskHandle::spawn("visor-blink", move |stop| {
            let mut rng = SmallRng::from_entropy();
            loop {
                let interval = Duration::from_secs_f32(rng.gen_range(lo..=hi));
                if stop.wait(interval) {
                    return;
                }
                blink_once(&sink, &catalogue, &state, &stop);
                if stop.is_stopped() {
                    return;
                }
            }
        })
    }
}

/// First frame the expression would display, used as the cross-fade
/// target. `None` for empty animations or unknown generators.
fn first_frame(
    registry: &GeneratorRegistry,
    sink: &Arc<dyn DisplaySink>,
    expr: &Expression,
) -> Option<Frame> {
    match &expr.kind {
        ExpressionKind::Static { image } => Some(image.clone()),
        ExpressionKind::Animation { frames, .. } => frames.first().cloned(),
        ExpressionKind::Procedural { generator, params, .. } => {
            let kind = registry.create(generator, sink.width(), sink.height(), params)?;
            Some(render_still(kind, sink.width(), sink.height()))
        }
    }
}

/// Render a single still from a fresh generator instance at t=0.
fn render_still(mut kind: GeneratorKind, width: u32, height: u32) -> Frame {
    match &mut kind {
        GeneratorKind::Full(source) => source.render(0.0),
        GeneratorKind::Transform(effect) => {
            effect.apply(&Frame::filled(width, height, Rgb::BLACK), 0.0)
        }
    }
}

/// Push linear interpolation steps from `from` to `to` at a fixed rate.
/// The final step lands exactly on `to`.
fn crossfade(
    sink: &Arc<dyn DisplaySink>,
    from: &Frame,
    to: &Frame,
    duration: Duration,
    stop: &StopFlag,
) {
    if from.width() != to.width() || from.height() != to.height() {
        return;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = (duration.as_secs_f32() * TRANSITION_FPS).round().max(1.0) as u32;
    let interval = Duration::from_secs_f32(1.0 / TRANSITION_FPS);
    for step in 1..=steps {
        if stop.is_stopped() {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let t = step as f32 / steps as f32;
        sink.show_image(&from.lerp(to, t));
        if stop.wait(interval) {
            return;
        }
    }
}

/// Hand an expression to its normal playback pathway. Animation and
/// procedural entries block inside the engine until cancelled or done.
fn show_expression(
    engine: &AnimationEngine,
    sink: &Arc<dyn DisplaySink>,
    registry: &GeneratorRegistry,
    slot: &Mutex<Option<SharedGenerator>>,
    expr: &Expression,
) {
    match &expr.kind {
        ExpressionKind::Static { image } => sink.show_image(image),
        ExpressionKind::Animation {
            frames, fps, looped, ..
        } => engine.play(frames, *fps, *looped),
        ExpressionKind::Procedural {
            generator,
            params,
            fps,
        } => {
            let Some(kind) = registry.create(generator, sink.width(), sink.height(), params)
            else {
                tracing::debug!(generator = %generator, "unknown procedural generator");
                return;
            };
            let shared: SharedGenerator = Arc::new(Mutex::new(kind));
            *slot.lock().unwrap() = Some(shared.clone());
            engine.play_procedural(&shared, *fps);
        }
    }
}

/// One idle-blink cycle: play the current expression's idle animation
/// once, then restore the static face if nothing changed meanwhile.
fn blink_once(
    sink: &Arc<dyn DisplaySink>,
    catalogue: &ExpressionCatalogue,
    state: &Arc<Mutex<ManagerState>>,
    stop: &StopFlag,
) {
    let expr = {
        let guard = state.lock().unwrap();
        if !guard.blink_enabled {
            return;
        }
        let Some(current) = guard.current.as_deref() else {
            return;
        };
        let Some(expr) = catalogue.get(current) else {
            return;
        };
        expr
    };
    if !matches!(expr.kind, ExpressionKind::Static { .. }) {
        return;
    }
    let Some(idle_name) = expr.idle_animation.as_deref() else {
        return;
    };
    let Some(idle) = catalogue.get(idle_name) else {
        return;
    };
    let ExpressionKind::Animation { frames, fps, .. } = &idle.kind else {
        return;
    };
    if frames.is_empty() {
        return;
    }

    let engine = AnimationEngine::with_stop_flag(sink.clone(), stop.clone());
    engine.play(frames, *fps, false);

    // Restore the face under the state lock so a concurrent expression
    // switch cannot be overwritten by a stale blink frame.
    let guard = state.lock().unwrap();
    if stop.is_stopped() || !guard.blink_enabled {
        return;
    }
    if guard.current.as_deref() == Some(expr.name.as_str()) {
        if let ExpressionKind::Static { image } = &expr.kind {
            sink.show_image(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDisplay;
    use crate::generators::{Generator, ParamBag};
    use std::thread;
    use std::time::Instant;

    fn wait_for(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not met within 2s");
    }

    fn static_expr(name: &str, color: Rgb) -> Expression {
        Expression {
            name: name.to_string(),
            kind: ExpressionKind::Static {
                image: Frame::filled(4, 4, color),
            },
            idle_animation: None,
        }
    }

    fn test_config(transition_ms: u64) -> Config {
        Config {
            transition_duration_ms: transition_ms,
            ..Config::default()
        }
    }

    fn manager_with(
        catalogue: ExpressionCatalogue,
        config: &Config,
    ) -> (Arc<MockDisplay>, ExpressionManager) {
        let sink = Arc::new(MockDisplay::recording(4, 4));
        let manager = ExpressionManager::new(
            sink.clone(),
            Arc::new(GeneratorRegistry::with_builtins()),
            catalogue,
            config,
        );
        (sink, manager)
    }

    #[test]
    fn test_unknown_expression_is_noop() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("happy", Rgb::WHITE));
        let (sink, manager) = manager_with(catalogue, &test_config(0));

        manager.set_expression("nope");
        thread::sleep(Duration::from_millis(30));
        assert_eq!(manager.current_name(), None);
        assert_eq!(sink.push_count(), 0);
    }

    #[test]
    fn test_static_expression_is_pushed() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("happy", Rgb::new(0, 255, 0)));
        let (sink, manager) = manager_with(catalogue, &test_config(0));

        manager.set_expression("happy");
        wait_for(|| sink.push_count() == 1);
        assert_eq!(manager.current_name().as_deref(), Some("happy"));
        assert_eq!(sink.last_frame().unwrap().get(0, 0), Some(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn test_crossfade_ends_exactly_on_target() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("red", Rgb::new(255, 0, 0)));
        catalogue.insert(static_expr("green", Rgb::new(0, 255, 0)));
        let (sink, manager) = manager_with(catalogue, &test_config(100));

        manager.set_expression("red");
        wait_for(|| sink.push_count() >= 1);
        manager.set_expression("green");
        wait_for(|| {
            sink.last_frame()
                .is_some_and(|f| f.get(0, 0) == Some(Rgb::new(0, 255, 0)))
        });

        let history = sink.history();
        let blended = history.iter().any(|frame| {
            let px = frame.get(0, 0).unwrap();
            px.r > 0 && px.r < 255 && px.g > 0 && px.g < 255
        });
        assert!(blended, "expected interpolated frames between red and green");
    }

    #[test]
    fn test_zero_transition_swaps_without_blends() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("red", Rgb::new(255, 0, 0)));
        catalogue.insert(static_expr("green", Rgb::new(0, 255, 0)));
        let (sink, manager) = manager_with(catalogue, &test_config(0));

        manager.set_expression("red");
        wait_for(|| sink.push_count() >= 1);
        manager.set_expression("green");
        wait_for(|| {
            sink.last_frame()
                .is_some_and(|f| f.get(0, 0) == Some(Rgb::new(0, 255, 0)))
        });

        let history = sink.history();
        let pure = history.iter().all(|frame| {
            let px = frame.get(0, 0).unwrap();
            px == Rgb::new(255, 0, 0) || px == Rgb::new(0, 255, 0)
        });
        assert!(pure, "zero-duration switch must not emit blended frames");
    }

    #[test]
    fn test_first_expression_skips_transition() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("happy", Rgb::new(9, 9, 9)));
        let (sink, manager) = manager_with(catalogue, &test_config(500));

        manager.set_expression("happy");
        wait_for(|| sink.push_count() >= 1);
        // No prior frame, so the image lands directly without blend steps.
        assert_eq!(sink.push_count(), 1);
        assert_eq!(sink.last_frame().unwrap().get(0, 0), Some(Rgb::new(9, 9, 9)));
    }

    #[test]
    fn test_new_expression_cancels_looping_animation() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(Expression {
            name: "spin".to_string(),
            kind: ExpressionKind::Animation {
                frames: vec![Frame::filled(4, 4, Rgb::WHITE), Frame::new(4, 4)],
                fps: 200.0,
                looped: true,
                next: None,
            },
            idle_animation: None,
        });
        catalogue.insert(static_expr("calm", Rgb::new(0, 0, 128)));
        let (sink, manager) = manager_with(catalogue, &test_config(0));

        manager.set_expression("spin");
        wait_for(|| sink.push_count() > 4);
        manager.set_expression("calm");
        wait_for(|| {
            sink.last_frame()
                .is_some_and(|f| f.get(0, 0) == Some(Rgb::new(0, 0, 128)))
        });

        let settled = sink.push_count();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(sink.push_count(), settled, "loop must stop after supersede");
    }

    #[test]
    fn test_empty_animation_displays_nothing() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(Expression {
            name: "void".to_string(),
            kind: ExpressionKind::Animation {
                frames: Vec::new(),
                fps: 12.0,
                looped: true,
                next: None,
            },
            idle_animation: None,
        });
        let (sink, manager) = manager_with(catalogue, &test_config(100));

        manager.set_expression("void");
        thread::sleep(Duration::from_millis(50));
        assert_eq!(manager.current_name().as_deref(), Some("void"));
        assert_eq!(sink.push_count(), 0);
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
    fn test_set_text_reaches_live_procedural_generator() {
        let mut registry = GeneratorRegistry::new();
        registry.register("probe", text_probe_factory);
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(Expression {
            name: "talk".to_string(),
            kind: ExpressionKind::Procedural {
                generator: "probe".to_string(),
                params: ParamBag::new(),
                fps: 100.0,
            },
            idle_animation: None,
        });

        let sink = Arc::new(MockDisplay::new(4, 4));
        let manager = ExpressionManager::new(
            sink.clone(),
            Arc::new(registry),
            catalogue,
            &test_config(0),
        );

        manager.set_expression("talk");
        wait_for(|| sink.push_count() >= 1);
        manager.set_text("HELLO");
        wait_for(|| !SEEN_TEXT.lock().unwrap().is_empty());
        assert_eq!(SEEN_TEXT.lock().unwrap().as_slice(), ["HELLO"]);
    }

    #[test]
    fn test_blink_plays_idle_animation_then_restores_face() {
        let face = Rgb::new(0, 128, 0);
        let wink = Rgb::new(128, 0, 128);
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(Expression {
            name: "happy".to_string(),
            kind: ExpressionKind::Static {
                image: Frame::filled(4, 4, face),
            },
            idle_animation: Some("wink".to_string()),
        });
        catalogue.insert(Expression {
            name: "wink".to_string(),
            kind: ExpressionKind::Animation {
                frames: vec![Frame::filled(4, 4, wink)],
                fps: 100.0,
                looped: false,
                next: None,
            },
            idle_animation: None,
        });

        let mut config = test_config(0);
        config.blink_interval_min = 0.01;
        config.blink_interval_max = 0.02;
        let (sink, manager) = manager_with(catalogue, &config);

        manager.set_expression("happy");
        wait_for(|| {
            sink.history().iter().any(|f| f.get(0, 0) == Some(wink))
        });
        wait_for(|| {
            sink.last_frame().is_some_and(|f| f.get(0, 0) == Some(face))
        });
    }

    #[test]
    fn test_toggle_blink_stops_blinking() {
        let mut catalogue = ExpressionCatalogue::new();
        let mut happy = static_expr("happy", Rgb::new(0, 128, 0));
        happy.idle_animation = Some("wink".to_string());
        catalogue.insert(happy);
        catalogue.insert(Expression {
            name: "wink".to_string(),
            kind: ExpressionKind::Animation {
                frames: vec![Frame::filled(4, 4, Rgb::new(128, 0, 128))],
                fps: 100.0,
                looped: false,
                next: None,
            },
            idle_animation: None,
        });

        let mut config = test_config(0);
        config.blink_interval_min = 0.01;
        config.blink_interval_max = 0.02;
        let (sink, manager) = manager_with(catalogue, &config);

        assert!(manager.blink_enabled());
        assert!(!manager.toggle_blink(), "toggle returns the new state");
        assert!(!manager.blink_enabled());

        manager.set_expression("happy");
        wait_for(|| sink.push_count() >= 1);
        let settled = sink.push_count();
        thread::sleep(Duration::from_millis(80));
        assert_eq!(sink.push_count(), settled, "no blinks while disabled");

        assert!(manager.toggle_blink());
        wait_for(|| sink.push_count() > settled);
    }

    #[test]
    fn test_thumbnails() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("happy", Rgb::new(10, 20, 30)));
        catalogue.insert(Expression {
            name: "trippy".to_string(),
            kind: ExpressionKind::Procedural {
                generator: "plasma".to_string(),
                params: ParamBag::new(),
                fps: 20.0,
            },
            idle_animation: None,
        });
        let (_sink, manager) = manager_with(catalogue, &test_config(0));

        let png = manager.get_thumbnail("happy").unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30]);

        assert!(manager.get_thumbnail("trippy").is_some());
        assert!(manager.get_thumbnail("nope").is_none());
    }

    #[test]
    fn test_expression_names_sorted() {
        let mut catalogue = ExpressionCatalogue::new();
        catalogue.insert(static_expr("surprised", Rgb::WHITE));
        catalogue.insert(static_expr("angry", Rgb::WHITE));
        let (_sink, manager) = manager_with(catalogue, &test_config(0));
        assert_eq!(manager.expression_names(), vec!["angry", "surprised"]);
    }
}
