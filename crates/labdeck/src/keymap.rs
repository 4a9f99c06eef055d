//! Keyboard surface.

use eframe::egui::{Key, Modifiers};

/// Everything the presenter can ask for, from keys or on-screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Previous,
    First,
    Last,
    GoTo(usize),
    ToggleFullscreen,
    ToggleDraw,
    CloseDraw,
    SaveDrawing,
    ClearDrawing,
    ExportPdf,
    FocusSearch,
    LeaveSearch,
    NextMatch,
    PreviousMatch,
    ToggleHints,
    ToggleTheme,
    Quit,
}

/// Input state that decides which keys are live.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyContext {
    pub overlay_active: bool,
    pub search_focused: bool,
}

/// Map one key press to an action.
///
/// While the draw overlay is open every key is ignored except Esc, which
/// closes it. While the search box has focus only Ctrl/Cmd+F, Enter and Esc
/// are handled here; everything else is typing.
pub fn action_for(key: Key, modifiers: Modifiers, cx: KeyContext) -> Option<Action> {
    if cx.overlay_active {
        return (key == Key::Escape).then_some(Action::CloseDraw);
    }

    if key == Key::F && (modifiers.command || modifiers.ctrl) {
        return Some(Action::FocusSearch);
    }

    if cx.search_focused {
        return match key {
            Key::Enter if modifiers.shift => Some(Action::PreviousMatch),
            Key::Enter => Some(Action::NextMatch),
            Key::Escape => Some(Action::LeaveSearch),
            _ => None,
        };
    }

    if modifiers.command || modifiers.ctrl || modifiers.alt {
        return None;
    }

    match key {
        Key::ArrowLeft | Key::ArrowUp => Some(Action::Previous),
        Key::ArrowRight | Key::ArrowDown | Key::Space => Some(Action::Next),
        Key::Home => Some(Action::First),
        Key::End => Some(Action::Last),
        Key::F => Some(Action::ToggleFullscreen),
        Key::S => Some(Action::SaveDrawing),
        Key::C => Some(Action::ClearDrawing),
        Key::H => Some(Action::ToggleHints),
        Key::D => Some(Action::ToggleTheme),
        Key::Q => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: KeyContext = KeyContext {
        overlay_active: false,
        search_focused: false,
    };
    const DRAWING: KeyContext = KeyContext {
        overlay_active: true,
        search_focused: false,
    };
    const TYPING: KeyContext = KeyContext {
        overlay_active: false,
        search_focused: true,
    };

    #[test]
    fn test_navigation_keys() {
        for key in [Key::ArrowLeft, Key::ArrowUp] {
            assert_eq!(action_for(key, Modifiers::NONE, IDLE), Some(Action::Previous));
        }
        for key in [Key::ArrowRight, Key::ArrowDown, Key::Space] {
            assert_eq!(action_for(key, Modifiers::NONE, IDLE), Some(Action::Next));
        }
        assert_eq!(action_for(Key::Home, Modifiers::NONE, IDLE), Some(Action::First));
        assert_eq!(action_for(Key::End, Modifiers::NONE, IDLE), Some(Action::Last));
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(
            action_for(Key::F, Modifiers::NONE, IDLE),
            Some(Action::ToggleFullscreen)
        );
        assert_eq!(action_for(Key::S, Modifiers::NONE, IDLE), Some(Action::SaveDrawing));
        assert_eq!(action_for(Key::C, Modifiers::NONE, IDLE), Some(Action::ClearDrawing));
    }

    #[test]
    fn test_ctrl_f_focuses_search_not_fullscreen() {
        for cx in [IDLE, TYPING] {
            assert_eq!(
                action_for(Key::F, Modifiers::CTRL, cx),
                Some(Action::FocusSearch)
            );
            assert_eq!(
                action_for(Key::F, Modifiers::COMMAND, cx),
                Some(Action::FocusSearch)
            );
        }
    }

    #[test]
    fn test_overlay_swallows_plain_keys() {
        for key in [Key::ArrowRight, Key::F, Key::S, Key::C, Key::Q] {
            assert_eq!(action_for(key, Modifiers::NONE, DRAWING), None, "{key:?}");
        }
        assert_eq!(action_for(Key::F, Modifiers::CTRL, DRAWING), None);
        assert_eq!(
            action_for(Key::Escape, Modifiers::NONE, DRAWING),
            Some(Action::CloseDraw)
        );
    }

    #[test]
    fn test_search_box_keys() {
        assert_eq!(action_for(Key::Enter, Modifiers::NONE, TYPING), Some(Action::NextMatch));
        assert_eq!(
            action_for(Key::Enter, Modifiers::SHIFT, TYPING),
            Some(Action::PreviousMatch)
        );
        assert_eq!(
            action_for(Key::Escape, Modifiers::NONE, TYPING),
            Some(Action::LeaveSearch)
        );
        assert_eq!(action_for(Key::S, Modifiers::NONE, TYPING), None, "typing an s");
        assert_eq!(action_for(Key::Space, Modifiers::NONE, TYPING), None);
    }
}
