use crate::editor::EditorError;

/// Swatches Left/Right cycle through.
pub const PALETTE: [(&str, &str); 12] = [
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("orange", "#ffa500"),
    ("yellow", "#ffff00"),
    ("green", "#008000"),
    ("teal", "#008080"),
    ("cyan", "#00ffff"),
    ("blue", "#0000ff"),
    ("purple", "#800080"),
    ("magenta", "#ff00ff"),
    ("gray", "#808080"),
];

/// `#rrggbb` as its three channels.
pub fn parse_hex(text: &str) -> Option<(u8, u8, u8)> {
    let digits = text.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn check(text: &str) -> Result<(), EditorError> {
    if text.is_empty() || parse_hex(text).is_some() {
        Ok(())
    } else {
        Err(EditorError::InvalidInput {
            what: "color",
            input: text.to_string(),
        })
    }
}

/// Next palette entry after the current color, wrapping in both directions.
/// Colors outside the palette start from its first entry.
pub fn step(text: &str, delta: i64) -> String {
    let len = PALETTE.len() as i64;
    let next = match PALETTE
        .iter()
        .position(|(_, hex)| hex.eq_ignore_ascii_case(text))
    {
        Some(current) => (current as i64 + delta).rem_euclid(len),
        None => 0,
    };
    PALETTE[next as usize].1.to_string()
}

pub fn name_of(text: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(_, hex)| hex.eq_ignore_ascii_case(text))
        .map(|(name, _)| *name)
}
