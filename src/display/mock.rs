//! Mock display: headless sink that stores the last shown frame.

use super::DisplaySink;
use crate::frame::{Frame, Rgb};
use std::sync::Mutex;

/// A sink that keeps the last pushed frame in memory.
///
/// Used by tests and by headless deployments that only serve thumbnails.
/// With [`MockDisplay::recording`] every pushed frame is also appended to
/// a history, letting tests assert on exact frame sequences.
pub struct MockDisplay {
    width: u32,
    height: u32,
    state: Mutex<MockState>,
}

struct MockState {
    last_frame: Option<Frame>,
    brightness: u8,
    pushes: u64,
    history: Option<Vec<Frame>>,
}

impl MockDisplay {
    /// Create a mock sink of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: Mutex::new(MockState {
                last_frame: None,
                brightness: 100,
                pushes: 0,
                history: None,
            }),
        }
    }

    /// Create a mock sink that records every pushed frame.
    pub fn recording(width: u32, height: u32) -> Self {
        let display = Self::new(width, height);
        display.state.lock().unwrap().history = Some(Vec::new());
        display
    }

    /// The most recently shown frame, if any.
    pub fn last_frame(&self) -> Option<Frame> {
        self.state.lock().unwrap().last_frame.clone()
    }

    /// Total number of `show_image` calls (clears included).
    pub fn push_count(&self) -> u64 {
        self.state.lock().unwrap().pushes
    }

    /// All recorded frames, oldest first. Empty unless constructed
    /// with [`MockDisplay::recording`].
    pub fn history(&self) -> Vec<Frame> {
        self.state
            .lock()
            .unwrap()
            .history
            .clone()
            .unwrap_or_default()
    }
}

impl DisplaySink for MockDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show_image(&self, frame: &Frame) {
        let mut state = self.state.lock().unwrap();
        state.pushes += 1;
        if let Some(history) = state.history.as_mut() {
            history.push(frame.clone());
        }
        state.last_frame = Some(frame.clone());
    }

    fn clear(&self) {
        self.show_image(&Frame::filled(self.width, self.height, Rgb::BLACK));
    }

    fn set_brightness(&self, value: u8) {
        self.state.lock().unwrap().brightness = value.min(100);
    }

    fn brightness(&self) -> u8 {
        self.state.lock().unwrap().brightness
    }
}
