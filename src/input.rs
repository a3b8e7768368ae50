//! Keyboard input as delivered by the host.

use crate::carousel::Direction;

/// A key-down event. Handlers call [`KeyEvent::prevent_default`] when they
/// consume the key so the host skips its own behaviour (scrolling on space).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            default_prevented: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Shortcuts available while a video element has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoShortcut {
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
}

impl VideoShortcut {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Enter" => Some(VideoShortcut::TogglePlay),
            "m" | "M" => Some(VideoShortcut::ToggleMute),
            "f" | "F" => Some(VideoShortcut::ToggleFullscreen),
            _ => None,
        }
    }
}

/// Arrow keys navigate the hovered carousel.
pub fn arrow_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" => Some(Direction::Previous),
        "ArrowRight" => Some(Direction::Next),
        _ => None,
    }
}
