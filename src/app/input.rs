use crossterm::event::KeyEvent;

use super::keymap;

/// Named actions the keymap can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Save,
    Quit,
    ResetStatus,
    OpenChooser,
    FocusStep(i32),
    AppendElement,
    RemoveElement,
    GenerateGuid,
    /// Bound only for the help line; the key goes to the focused widget.
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Action(KeyAction),
    Input(KeyEvent),
}

pub fn classify(key: &KeyEvent) -> Command {
    match keymap::classify_key(key) {
        Some(KeyAction::Input) | None => Command::Input(*key),
        Some(action) => Command::Action(action),
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn bound_keys_become_actions() {
        let back = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(classify(&back), Command::Action(KeyAction::FocusStep(-1)));
        let append = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(classify(&append), Command::Action(KeyAction::AppendElement));
        let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(classify(&quit), Command::Action(KeyAction::Quit));
    }

    #[test]
    fn everything_else_goes_to_the_widget() {
        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(classify(&left), Command::Input(left));
        let letter = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(classify(&letter), Command::Input(letter));
    }
}
