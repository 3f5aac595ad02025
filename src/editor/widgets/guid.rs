use uuid::Uuid;

/// Fresh random GUID, lowercase and hyphenated.
pub fn generate() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    #[test]
    fn generated_guids_match_the_guid_pattern() {
        let pattern =
            Regex::new("^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap();
        let first = generate();
        assert!(pattern.is_match(&first), "{first}");
        assert_eq!(first.as_bytes()[14], b'4', "version 4");
        assert_ne!(first, generate());
    }
}
