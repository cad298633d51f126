//! Key input: a dedicated thread polling terminal events and translating
//! keys into commands.

use crate::commands::Command;
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long one poll waits before re-checking shutdown.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Brightness change per keypress.
const BRIGHTNESS_STEP: u8 = 10;

/// Cycling state and starting values for the key thread.
pub struct KeyInputOptions {
    /// Expression names in cycling order (sorted).
    pub expressions: Vec<String>,
    /// Effect names in cycling order (sorted).
    pub effects: Vec<String>,
    /// Starting brightness for the nudge keys.
    pub brightness: u8,
}

/// What a keypress translates to.
#[derive(Debug, PartialEq)]
enum KeyAction {
    Command(Command),
    Quit,
    Ignore,
}

struct KeyState {
    expressions: Vec<String>,
    expression_index: Option<usize>,
    effects: Vec<String>,
    effect_index: Option<usize>,
    brightness: u8,
}

impl KeyState {
    fn new(options: KeyInputOptions) -> Self {
        Self {
            expressions: options.expressions,
            expression_index: None,
            effects: options.effects,
            effect_index: None,
            brightness: options.brightness.min(100),
        }
    }
}

/// Input actor polling the terminal for keypresses.
///
/// Key map: left/right (or p/n) cycle expressions, up/down nudge
/// brightness, `b` toggles blink, `e` cycles effects, `x` clears the
/// effect, `q`/Esc/Ctrl-C quits.
pub struct KeyInput {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl KeyInput {
    /// Spawn the input thread.
    ///
    /// Commands go to `sender`; a quit keypress sends on `quit` and the
    /// thread exits.
    pub fn spawn(sender: Sender<Command>, quit: Sender<()>, options: KeyInputOptions) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let handle = thread::Builder::new()
            .name("visor-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &quit, &shutdown_flag, KeyState::new(options));
            })
            .expect("failed to spawn input thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the input thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Signal shutdown and wait for the thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(
        sender: &Sender<Command>,
        quit: &Sender<()>,
        shutdown: &Arc<AtomicBool>,
        mut state: KeyState,
    ) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            match event::poll(POLL_TIMEOUT) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        match translate_key(key.code, key.modifiers, &mut state) {
                            KeyAction::Command(command) => {
                                if sender.send(command).is_err() {
                                    break;
                                }
                            }
                            KeyAction::Quit => {
                                let _ = quit.send(());
                                break;
                            }
                            KeyAction::Ignore => {}
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("input read failed: {e}"),
                },
                Ok(false) => {}
                Err(e) => tracing::warn!("input poll failed: {e}"),
            }
        }
    }
}

impl Drop for KeyInput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Translate one keypress against the cycling state.
fn translate_key(code: KeyCode, modifiers: KeyModifiers, state: &mut KeyState) -> KeyAction {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Right | KeyCode::Char('n') => cycle_expression(state, true),
        KeyCode::Left | KeyCode::Char('p') => cycle_expression(state, false),
        KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
            state.brightness = (state.brightness + BRIGHTNESS_STEP).min(100);
            KeyAction::Command(Command::SetBrightness(state.brightness))
        }
        KeyCode::Down | KeyCode::Char('-') => {
            state.brightness = state.brightness.saturating_sub(BRIGHTNESS_STEP);
            KeyAction::Command(Command::SetBrightness(state.brightness))
        }
        KeyCode::Char('b') => KeyAction::Command(Command::ToggleBlink),
        KeyCode::Char('e') => cycle_effect(state),
        KeyCode::Char('x') => KeyAction::Command(Command::ClearEffect),
        _ => KeyAction::Ignore,
    }
}

fn cycle_expression(state: &mut KeyState, forward: bool) -> KeyAction {
    if state.expressions.is_empty() {
        return KeyAction::Ignore;
    }
    let len = state.expressions.len();
    let next = match (state.expression_index, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    state.expression_index = Some(next);
    KeyAction::Command(Command::SetExpression(state.expressions[next].clone()))
}

fn cycle_effect(state: &mut KeyState) -> KeyAction {
    if state.effects.is_empty() {
        return KeyAction::Ignore;
    }
    let next = state
        .effect_index
        .map_or(0, |i| (i + 1) % state.effects.len());
    state.effect_index = Some(next);
    KeyAction::Command(Command::SetEffect(state.effects[next].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> KeyState {
        KeyState::new(KeyInputOptions {
            expressions: vec!["angry".to_string(), "happy".to_string()],
            effects: vec!["rain".to_string(), "sparkle".to_string()],
            brightness: 80,
        })
    }

    fn press(code: KeyCode, state: &mut KeyState) -> KeyAction {
        translate_key(code, KeyModifiers::NONE, state)
    }

    #[test]
    fn test_expression_cycling_wraps() {
        let mut state = state();
        assert_eq!(
            press(KeyCode::Right, &mut state),
            KeyAction::Command(Command::SetExpression("angry".to_string()))
        );
        assert_eq!(
            press(KeyCode::Right, &mut state),
            KeyAction::Command(Command::SetExpression("happy".to_string()))
        );
        assert_eq!(
            press(KeyCode::Right, &mut state),
            KeyAction::Command(Command::SetExpression("angry".to_string()))
        );
        assert_eq!(
            press(KeyCode::Left, &mut state),
            KeyAction::Command(Command::SetExpression("happy".to_string()))
        );
    }

    #[test]
    fn test_brightness_nudges_clamp() {
        let mut state = state();
        for _ in 0..4 {
            press(KeyCode::Up, &mut state);
        }
        assert_eq!(
            press(KeyCode::Up, &mut state),
            KeyAction::Command(Command::SetBrightness(100))
        );
        for _ in 0..11 {
            press(KeyCode::Down, &mut state);
        }
        assert_eq!(
            press(KeyCode::Down, &mut state),
            KeyAction::Command(Command::SetBrightness(0))
        );
    }

    #[test]
    fn test_effect_cycle_and_clear() {
        let mut state = state();
        assert_eq!(
            press(KeyCode::Char('e'), &mut state),
            KeyAction::Command(Command::SetEffect("rain".to_string()))
        );
        assert_eq!(
            press(KeyCode::Char('e'), &mut state),
            KeyAction::Command(Command::SetEffect("sparkle".to_string()))
        );
        assert_eq!(
            press(KeyCode::Char('x'), &mut state),
            KeyAction::Command(Command::ClearEffect)
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut state = state();
        assert_eq!(press(KeyCode::Char('q'), &mut state), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc, &mut state), KeyAction::Quit);
        assert_eq!(
            translate_key(KeyCode::Char('c'), KeyModifiers::CONTROL, &mut state),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_unmapped_keys_ignored() {
        let mut state = state();
        assert_eq!(press(KeyCode::Char('z'), &mut state), KeyAction::Ignore);
        assert_eq!(press(KeyCode::Tab, &mut state), KeyAction::Ignore);

        let empty = &mut KeyState::new(KeyInputOptions {
            expressions: Vec::new(),
            effects: Vec::new(),
            brightness: 50,
        });
        assert_eq!(press(KeyCode::Right, empty), KeyAction::Ignore);
        assert_eq!(press(KeyCode::Char('e'), empty), KeyAction::Ignore);
    }
}
