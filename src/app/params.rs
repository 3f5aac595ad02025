use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped in keys and values; everything but `A-Za-z0-9-_.~`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Session parameters (`source`, `type`) kept in insertion order and shown as
/// a query string in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionParams {
    entries: IndexMap<String, String>,
}

impl SessionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2`, with or without a leading `?`. `+` decodes to a space
    /// and keys without `=` get an empty value. Later duplicates win.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.set(decode(key), decode(value));
        }
        params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// `?key=value&…`, or an empty string when there are no parameters.
    pub fn to_query_string(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let pairs = self
            .entries
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect::<Vec<_>>();
        format!("?{}", pairs.join("&"))
    }
}

impl fmt::Display for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_insertion_order() {
        let mut params = SessionParams::new();
        params.set("source", "data/fstab.tyml.json");
        params.set("type", "FStab");
        assert_eq!(
            params.to_query_string(),
            "?source=data%2Ffstab.tyml.json&type=FStab"
        );
        params.set("source", "a b");
        assert_eq!(params.to_string(), "?source=a%20b&type=FStab");
    }

    #[test]
    fn parses_what_it_prints() {
        let params = SessionParams::parse("?source=my%20file.json&type=FStab&flag");
        assert_eq!(params.get("source"), Some("my file.json"));
        assert_eq!(params.get("type"), Some("FStab"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(SessionParams::parse(&params.to_query_string()), params);
        assert_eq!(SessionParams::parse("a=1+2").get("a"), Some("1 2"));
    }

    #[test]
    fn empty_params_render_nothing() {
        assert_eq!(SessionParams::parse("").to_query_string(), "");
        assert_eq!(SessionParams::parse("?").to_query_string(), "");
        let mut params = SessionParams::parse("type=Path");
        assert_eq!(params.remove("type").as_deref(), Some("Path"));
        assert!(params.is_empty());
    }
}
