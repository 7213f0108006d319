//! Slug generation for public form links

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid slug regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random token used when a slug would otherwise be empty
pub const FALLBACK_SUFFIX_LEN: usize = 5;

/// Length of the random token appended on slug conflicts and duplicates
pub const CONFLICT_SUFFIX_LEN: usize = 4;

/// Random `[a-z0-9]` token of the given length
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercases and trims the input, drops everything outside `[a-z0-9]`,
/// whitespace and `-`, turns whitespace runs into `-` and collapses repeated
/// hyphens. Leading and trailing hyphens produced by stripped punctuation
/// are kept. An empty result becomes `form-xxxxx`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped = DISALLOWED.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let normalized = HYPHENS.replace_all(&hyphenated, "-");

    if normalized.is_empty() {
        format!("form-{}", random_suffix(FALLBACK_SUFFIX_LEN))
    } else {
        normalized.into_owned()
    }
}

/// Slug used for the n-th insert attempt: the base first, then `base-xxxx`
pub fn attempt_slug(base: &str, attempt: usize) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, random_suffix(CONFLICT_SUFFIX_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_token(s: &str, len: usize) -> bool {
        s.len() == len
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    }

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_trailing_punctuation_keeps_hyphen() {
        assert_eq!(slugify("Test! @#$%^&*"), "test-");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(slugify("  multi  word  "), "multi-word");
    }

    #[test]
    fn test_collapses_repeated_hyphens() {
        assert_eq!(slugify("a -- b---c"), "a-b-c");
    }

    #[test]
    fn test_strips_non_ascii() {
        assert_eq!(slugify("Café Menü 2026"), "caf-men-2026");
    }

    #[test]
    fn test_empty_input_gets_random_slug() {
        let slug = slugify("");
        let token = slug.strip_prefix("form-").unwrap();
        assert!(is_token(token, FALLBACK_SUFFIX_LEN));
    }

    #[test]
    fn test_only_punctuation_gets_random_slug() {
        assert!(slugify("!!!").starts_with("form-"));
    }

    #[test]
    fn test_attempt_slug() {
        assert_eq!(attempt_slug("survey", 0), "survey");
        let retry = attempt_slug("survey", 2);
        let token = retry.strip_prefix("survey-").unwrap();
        assert!(is_token(token, CONFLICT_SUFFIX_LEN));
    }
}
