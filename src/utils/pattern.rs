//! One-shot regex helpers for scraping response text.
//!
//! Each call compiles its pattern; hold a `regex::Regex` directly when the
//! same pattern runs in a loop.

use regex::Regex;

/// Whether `pattern` matches anywhere in `text`.
pub fn is_match(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    Ok(Regex::new(pattern)?.is_match(text))
}

/// Every match of `pattern` in `text`, each as `[whole, group1, group2, ...]`.
/// Groups that did not participate are empty strings.
pub fn find_all_captures(pattern: &str, text: &str) -> Result<Vec<Vec<String>>, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(regex
        .captures_iter(text)
        .map(|captures| {
            captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect()
        })
        .collect())
}

/// Replaces every match of `pattern` in `text` with `replacement` (`$1`
/// style group references allowed).
pub fn replace_all(pattern: &str, text: &str, replacement: &str) -> Result<String, regex::Error> {
    Ok(Regex::new(pattern)?
        .replace_all(text, replacement)
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match() {
        assert!(is_match(r"\d{3}", "code 404").unwrap());
        assert!(!is_match(r"^\d+$", "abc").unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(is_match("(unclosed", "x").is_err());
        assert!(find_all_captures("[", "x").is_err());
        assert!(replace_all("(", "x", "y").is_err());
    }

    #[test]
    fn test_find_all_captures() {
        let found = find_all_captures(r#"name="(\w+)"(?: id="(\d+)")?"#, r#"name="a" id="1" name="b""#)
            .unwrap();
        assert_eq!(
            found,
            vec![
                vec![r#"name="a" id="1""#.to_string(), "a".to_string(), "1".to_string()],
                vec![r#"name="b""#.to_string(), "b".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_replace_all_with_groups() {
        let out = replace_all(r"(\w+)@(\w+)\.com", "mail bob@example.com now", "$2:$1").unwrap();
        assert_eq!(out, "mail example:bob now");
    }
}
