use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use std::sync::LazyLock;

use super::input::KeyAction;

macro_rules! keymap_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/keymap/default.keymap.json"
        ))
    };
}

/// Which bindings the help line shows for the focused row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum KeymapContext {
    Default,
    Union,
    Array,
    Element,
    Guid,
    Stepper,
}

impl KeymapContext {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "default" => Some(KeymapContext::Default),
            "union" => Some(KeymapContext::Union),
            "array" => Some(KeymapContext::Array),
            "element" => Some(KeymapContext::Element),
            "guid" => Some(KeymapContext::Guid),
            "stepper" => Some(KeymapContext::Stepper),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    description: String,
    contexts: Vec<String>,
    action: RawAction,
    combos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum RawAction {
    Save,
    Quit,
    ResetStatus,
    OpenChooser,
    FocusStep { delta: i32 },
    AppendElement,
    RemoveElement,
    GenerateGuid,
    Input,
}

impl RawAction {
    fn into_action(self) -> KeyAction {
        match self {
            RawAction::Save => KeyAction::Save,
            RawAction::Quit => KeyAction::Quit,
            RawAction::ResetStatus => KeyAction::ResetStatus,
            RawAction::OpenChooser => KeyAction::OpenChooser,
            RawAction::FocusStep { delta } => KeyAction::FocusStep(delta),
            RawAction::AppendElement => KeyAction::AppendElement,
            RawAction::RemoveElement => KeyAction::RemoveElement,
            RawAction::GenerateGuid => KeyAction::GenerateGuid,
            RawAction::Input => KeyAction::Input,
        }
    }
}

struct KeyBinding {
    action: KeyAction,
    contexts: Vec<KeymapContext>,
    combos: Vec<KeyPattern>,
    snippet: String,
}

impl KeyBinding {
    fn from_raw(raw: RawEntry) -> Result<Self, String> {
        let contexts = raw
            .contexts
            .iter()
            .map(|ctx| {
                KeymapContext::parse(ctx)
                    .ok_or_else(|| format!("unknown context '{ctx}' in {}", raw.id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if contexts.is_empty() {
            return Err(format!("keymap entry {} must declare a context", raw.id));
        }
        let combos = raw
            .combos
            .iter()
            .map(|combo| {
                KeyPattern::parse(combo)
                    .map_err(|err| format!("failed to parse combo '{combo}' for {}: {err}", raw.id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if combos.is_empty() {
            return Err(format!("keymap entry {} must declare combos", raw.id));
        }
        let combos_display = combos
            .iter()
            .map(|pattern| pattern.display.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Ok(Self {
            action: raw.action.into_action(),
            contexts,
            combos,
            snippet: format!("{combos_display} {}", raw.description),
        })
    }

    fn matches(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.combos
            .iter()
            .find(|pattern| pattern.matches(key))
            .map(|_| self.action)
    }
}

struct KeyPattern {
    code: KeyCode,
    required: KeyModifiers,
    allow_shift: bool,
    display: String,
}

impl KeyPattern {
    fn parse(spec: &str) -> Result<Self, String> {
        let display = spec.trim().to_string();
        let mut tokens = display
            .split('+')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        let Some(key_token) = tokens.pop() else {
            return Err("combo must contain a key".into());
        };
        let code = parse_code(key_token)?;
        let mut required = KeyModifiers::empty();
        for token in tokens {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => required |= KeyModifiers::CONTROL,
                "shift" => required |= KeyModifiers::SHIFT,
                "alt" => required |= KeyModifiers::ALT,
                other => return Err(format!("unsupported modifier '{other}'")),
            }
        }
        // terminals report BackTab and letters with or without SHIFT
        let allow_shift = matches!(code, KeyCode::Char(_) | KeyCode::BackTab)
            && !required.contains(KeyModifiers::SHIFT);
        Ok(Self {
            code,
            required,
            allow_shift,
            display,
        })
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        let code_matches = match (self.code, key.code) {
            (KeyCode::Char(expected), KeyCode::Char(actual)) => {
                actual.to_ascii_lowercase() == expected
            }
            (expected, actual) => expected == actual,
        };
        if !code_matches || !key.modifiers.contains(self.required) {
            return false;
        }
        let mut extra = key.modifiers.difference(self.required);
        if self.allow_shift {
            extra.remove(KeyModifiers::SHIFT);
        }
        extra.is_empty()
    }
}

fn parse_code(token: &str) -> Result<KeyCode, String> {
    let code = match token.to_lowercase().as_str() {
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return Err(format!("unsupported key '{token}'")),
            }
        }
    };
    Ok(code)
}

static KEYMAP: LazyLock<Vec<KeyBinding>> = LazyLock::new(|| {
    let raw_entries: Vec<RawEntry> =
        serde_json::from_str(keymap_source!()).expect("invalid keymap/default.keymap.json");
    raw_entries
        .into_iter()
        .map(KeyBinding::from_raw)
        .collect::<Result<_, _>>()
        .expect("invalid keymap/default.keymap.json")
});

pub(crate) fn classify_key(key: &KeyEvent) -> Option<KeyAction> {
    KEYMAP.iter().find_map(|binding| binding.matches(key))
}

/// Bindings relevant to any of `contexts`, in keymap order.
pub(crate) fn help_text(contexts: &[KeymapContext]) -> Option<String> {
    let snippets = KEYMAP
        .iter()
        .filter(|binding| binding.contexts.iter().any(|ctx| contexts.contains(ctx)))
        .map(|binding| binding.snippet.as_str())
        .collect::<Vec<_>>();
    if snippets.is_empty() {
        None
    } else {
        Some(snippets.join(" • "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn bundled_keymap_parses() {
        assert!(!KEYMAP.is_empty());
    }

    #[test]
    fn shift_tab_steps_back() {
        assert_eq!(
            classify_key(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(KeyAction::FocusStep(-1))
        );
        assert_eq!(
            classify_key(&key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(KeyAction::FocusStep(1))
        );
    }

    #[test]
    fn control_chords_need_control() {
        assert_eq!(
            classify_key(&key(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(KeyAction::AppendElement)
        );
        assert_eq!(classify_key(&key(KeyCode::Char('n'), KeyModifiers::NONE)), None);
        assert_eq!(
            classify_key(&key(KeyCode::Char('S'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
            Some(KeyAction::Save)
        );
        assert_eq!(
            classify_key(&key(KeyCode::Down, KeyModifiers::ALT)),
            None,
            "unexpected modifiers do not match"
        );
    }

    #[test]
    fn help_lists_only_matching_contexts() {
        let default = help_text(&[KeymapContext::Default]).unwrap();
        assert!(default.contains("Ctrl+S save"), "{default}");
        assert!(!default.contains("Ctrl+N"), "{default}");
        let array = help_text(&[KeymapContext::Default, KeymapContext::Array]).unwrap();
        assert!(array.contains("Ctrl+N add element"), "{array}");
    }

    #[test]
    fn rejects_malformed_combos() {
        assert!(KeyPattern::parse("Hyper+X").is_err());
        assert!(KeyPattern::parse("PageDown").is_err());
        assert!(KeyPattern::parse("+").is_err());
    }
}
