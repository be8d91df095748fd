//! Host input events
//!
//! Pointer positions arrive in the host's client (screen) space. Printable
//! text arrives separately through `text_input`; `key_down` only carries
//! editing keys and shortcuts.

use pdf_canvas_core::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer press, move or release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// 2 for the second press of a double click
    #[serde(default = "single_click")]
    pub click_count: u8,
}

fn single_click() -> u8 {
    1
}

impl PointerEvent {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
            click_count: 1,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn double_click(mut self) -> Self {
        self.click_count = 2;
        self
    }
}

/// Keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Delete,
    Tab,
    /// A character key, used for shortcuts such as Ctrl+D
    Char(char),
}
