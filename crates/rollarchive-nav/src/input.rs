use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::keymap::{KeyBinding, Keymap};

/// What a key press asks the archive browser to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextItem,
    PreviousItem,
    ActivateSelected,
    Deselect,
    JumpToFirstPage,
    OlderPage,
    NewerPage,
    ToggleTrim,
    Restore,
    HistoryBack,
    HistoryForward,
    None,
}

pub fn handle_key_event(key: KeyEvent, keymap: &Keymap) -> Action {
    let mut binding = KeyBinding::new(key.code, key.modifiers);
    // Terminals report uppercase letters with or without SHIFT
    if let KeyCode::Char(c) = key.code {
        if c.is_ascii_uppercase() {
            binding.modifiers |= KeyModifiers::SHIFT;
        }
    }
    keymap.get(&binding).cloned().unwrap_or(Action::None)
}

/// Pointer interaction with the page slider track
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderGesture {
    Press(f64),
    Drag(f64),
    Release,
}

/// Translate a mouse event into a slider gesture when it concerns the track
pub fn slider_gesture(mouse: MouseEvent, track: Rect, dragging: bool) -> Option<SliderGesture> {
    let inside = mouse.row >= track.y
        && mouse.row < track.y + track.height.max(1)
        && mouse.column >= track.x
        && mouse.column < track.x + track.width;
    let fraction = if track.width > 1 {
        (mouse.column.saturating_sub(track.x) as f64 / (track.width - 1) as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => Some(SliderGesture::Press(fraction)),
        MouseEventKind::Drag(MouseButton::Left) if dragging => Some(SliderGesture::Drag(fraction)),
        MouseEventKind::Up(MouseButton::Left) if dragging => Some(SliderGesture::Release),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_lookup() {
        let keymap = Keymap::default();
        let key = KeyEvent::new_with_kind(KeyCode::Char('r'), KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(handle_key_event(key, &keymap), Action::Restore);

        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key, &keymap), Action::None);
    }

    #[test]
    fn test_slider_gestures() {
        let track = Rect::new(10, 2, 11, 1);
        assert_eq!(
            slider_gesture(mouse(MouseEventKind::Down(MouseButton::Left), 15, 2), track, false),
            Some(SliderGesture::Press(0.5))
        );
        assert_eq!(
            slider_gesture(mouse(MouseEventKind::Down(MouseButton::Left), 15, 5), track, false),
            None
        );
        // Dragging continues outside the track and clamps
        assert_eq!(
            slider_gesture(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 9), track, true),
            Some(SliderGesture::Drag(1.0))
        );
        assert_eq!(
            slider_gesture(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0), track, true),
            Some(SliderGesture::Release)
        );
    }
}
