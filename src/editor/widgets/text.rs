use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use crate::domain::StringType;

/// Apply a text editing key to `buffer`. Returns whether the buffer changed.
pub(crate) fn edit_buffer(buffer: &mut String, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return false;
            }
            buffer.push(ch);
            true
        }
        KeyCode::Backspace => buffer.pop().is_some(),
        KeyCode::Delete => {
            let changed = !buffer.is_empty();
            buffer.clear();
            changed
        }
        _ => false,
    }
}

/// Text shown for a string slot. Non-string values are shown as JSON so the
/// user sees what is there before overwriting it.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn regex_error(label: &str, string: &StringType, text: &str) -> Option<String> {
    (!string.accepts(text)).then(|| format!("Invalid {label}: Regex does not match."))
}
