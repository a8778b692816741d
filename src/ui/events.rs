// Keyboard handling - each screen has its own key map
// The append dialog has a text filter, so plain letters go there instead of to shortcuts

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    Up,
    Down,

    // Library
    ToggleMark,
    OpenPlaylistDialog,

    // Append dialog
    FilterInput(char),
    FilterBackspace,
    ChoosePlaylist,
    CreateNewPlaylist,
    CloseDialog,

    // Creation dialog
    NameInput(char),
    NameBackspace,
    ConfirmCreation,
    CancelCreation,

    /// Posted by the dismiss callback once a dialog flow ends
    DialogDismissed,
}

pub fn key_to_library_event(key: KeyEvent) -> Option<AppEvent> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Some(AppEvent::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppEvent::Quit),

        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => Some(AppEvent::Up),
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => Some(AppEvent::Down),

        (KeyCode::Char(' '), _) => Some(AppEvent::ToggleMark),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(AppEvent::OpenPlaylistDialog),

        _ => None,
    }
}

pub fn key_to_append_dialog_event(key: KeyEvent) -> Option<AppEvent> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppEvent::Quit),
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Some(AppEvent::CreateNewPlaylist),

        (KeyCode::Esc, _) => Some(AppEvent::CloseDialog),
        (KeyCode::Enter, _) => Some(AppEvent::ChoosePlaylist),
        (KeyCode::Up, _) => Some(AppEvent::Up),
        (KeyCode::Down, _) => Some(AppEvent::Down),

        (KeyCode::Backspace, _) => Some(AppEvent::FilterBackspace),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) if !c.is_control() => {
            Some(AppEvent::FilterInput(c))
        }

        _ => None,
    }
}

pub fn key_to_creation_dialog_event(key: KeyEvent) -> Option<AppEvent> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppEvent::Quit),

        (KeyCode::Enter, _) => Some(AppEvent::ConfirmCreation),
        (KeyCode::Esc, _) => Some(AppEvent::CancelCreation),

        (KeyCode::Backspace, _) => Some(AppEvent::NameBackspace),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) if !c.is_control() => {
            Some(AppEvent::NameInput(c))
        }

        _ => None,
    }
}
