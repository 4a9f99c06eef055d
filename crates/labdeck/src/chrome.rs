//! Window chrome: fullscreen flag, on-screen control visibility, keyboard
//! hints.

use std::cell::Cell;
use std::rc::Rc;

/// Mirrors the viewport's fullscreen state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullscreenState {
    fullscreen: bool,
}

impl FullscreenState {
    pub fn new(fullscreen: bool) -> Self {
        Self { fullscreen }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Flip the flag and return the state to request from the viewport.
    pub fn toggle(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Adopt the real viewport state, so leaving fullscreen through the window
    /// manager or Esc does not leave the flag stale. Returns true on change.
    pub fn sync(&mut self, actual: Option<bool>) -> bool {
        match actual {
            Some(actual) if actual != self.fullscreen => {
                tracing::debug!(fullscreen = actual, "fullscreen state changed outside the app");
                self.fullscreen = actual;
                true
            }
            _ => false,
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.fullscreen {
            "\u{2913} Exit Fullscreen"
        } else {
            "\u{2922} Fullscreen"
        }
    }
}

/// Shared visibility of the toolbar, navigation bar and draw controls.
///
/// Controls are hidden while at least one [`HiddenControls`] guard is alive.
#[derive(Debug, Clone, Default)]
pub struct ControlsVisibility {
    hidden: Rc<Cell<usize>>,
}

impl ControlsVisibility {
    pub fn is_visible(&self) -> bool {
        self.hidden.get() == 0
    }

    pub fn hide(&self) -> HiddenControls {
        self.hidden.set(self.hidden.get() + 1);
        HiddenControls {
            hidden: Rc::clone(&self.hidden),
        }
    }
}

/// Controls reappear when this is dropped.
#[derive(Debug)]
#[must_use = "controls are shown again as soon as the guard is dropped"]
pub struct HiddenControls {
    hidden: Rc<Cell<usize>>,
}

impl Drop for HiddenControls {
    fn drop(&mut self) {
        self.hidden.set(self.hidden.get().saturating_sub(1));
    }
}

pub const KEYBOARD_HINTS: &[(&str, &str)] = &[
    ("\u{2190} / \u{2191}", "Previous slide"),
    ("\u{2192} / \u{2193} / Space", "Next point / slide"),
    ("Home / End", "First / last slide"),
    ("F", "Toggle fullscreen"),
    ("Ctrl+F", "Search"),
    ("Enter / Shift+Enter", "Next / previous result"),
    ("S", "Save drawing"),
    ("C", "Clear drawing"),
    ("Esc", "Close drawing / leave search"),
    ("D", "Toggle theme"),
    ("H", "Toggle this panel"),
    ("Q", "Quit"),
];

pub const CODE_BLOCK_LABEL: &str = "MATLAB code for current experiment step";

pub fn jump_button_label(number: usize) -> String {
    format!("Go to slide {number}")
}
