//! Entity patterns matched in free text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld` with a purely alphabetic top-level domain.
pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Three groups of three digits, optionally preceded by a 3-digit area code
/// (bare or parenthesized) and, in the first alternative, a `+` and 2-digit
/// country code. Groups may be separated by one whitespace character.
pub const PHONE_PATTERN: &str = r"(?:\+\d{2}\s?(?:\d{3}\s?|\(\d{3}\)\s?)?\d{3}\s?\d{3}\s?\d{3}|(?:\d{3}\s?|\(\d{3}\)\s?)?\d{3}\s?\d{3}\s?\d{3})";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is compile-time constant and known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(EMAIL_PATTERN).expect("Hard-coded regex pattern should be valid")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(PHONE_PATTERN).expect("Hard-coded regex pattern should be valid")
});

/// Non-overlapping email matches, left to right.
pub fn find_emails(text: &str) -> Vec<String> {
    find_all(&EMAIL_REGEX, text)
}

/// Non-overlapping phone number matches, left to right.
pub fn find_phones(text: &str) -> Vec<String> {
    find_all(&PHONE_REGEX, text)
}

fn find_all(regex: &Regex, text: &str) -> Vec<String> {
    regex
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_emails() {
        assert_eq!(
            find_emails("write to a@b.com, or to first.last+tag@mail.example.org!"),
            vec!["a@b.com", "first.last+tag@mail.example.org"]
        );
        assert!(find_emails("user@localhost").is_empty());
        assert!(find_emails("user@host.c").is_empty());
        assert!(find_emails("user@host.123").is_empty());
    }

    #[test]
    fn test_find_phones_plain_groups() {
        assert_eq!(find_phones("call 555 123 456 now"), vec!["555 123 456"]);
        assert_eq!(find_phones("call 555123456 now"), vec!["555123456"]);
    }

    #[test]
    fn test_find_phones_with_area_and_country_code() {
        assert_eq!(
            find_phones("office: +48 (022) 555 123 456"),
            vec!["+48 (022) 555 123 456"]
        );
        assert_eq!(find_phones("+48 555 123 456"), vec!["+48 555 123 456"]);
        assert_eq!(find_phones("(022) 555 123 456"), vec!["(022) 555 123 456"]);
        assert_eq!(find_phones("022 555 123 456"), vec!["022 555 123 456"]);
    }

    #[test]
    fn test_find_phones_rejects_short_sequences() {
        assert!(find_phones("555 123").is_empty());
        assert!(find_phones("12 34 56 78").is_empty());
    }

    #[test]
    fn test_matches_are_non_overlapping_and_ordered() {
        assert_eq!(
            find_phones("111222333 and 444555666"),
            vec!["111222333", "444555666"]
        );
    }
}
