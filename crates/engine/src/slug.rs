//! Slug generation.
//!
//! Converts titles and taxonomy names into URL-safe slugs. Generating the
//! candidate is pure; uniqueness resolution belongs to the callers, which
//! check the target table and disambiguate with a date suffix (see
//! [`date_suffix`]).

use chrono::{Datelike, NaiveDate};

/// Maximum slug length in characters.
const MAX_SLUG_LEN: usize = 128;

/// Convert text into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with
/// hyphens, collapses consecutive hyphens, and trims leading/trailing
/// hyphens. Deterministic and idempotent: slugifying a slug returns it
/// unchanged.
pub fn slugify(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim
    let mut result = String::with_capacity(lowered.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in lowered.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > MAX_SLUG_LEN {
        // result is pure ASCII (alphanumerics + hyphens from the map above)
        let truncated = &result[..MAX_SLUG_LEN];
        // Don't cut in the middle of a word
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Compact numeric date suffix (`MMDDYYYY`) appended to a slug candidate
/// when it collides with an existing row.
pub fn date_suffix(date: NaiveDate) -> String {
    format!("{:02}{:02}{:04}", date.month(), date.day(), date.year())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("About Us"), "about-us");
        assert_eq!(slugify("2024 Card Show Recap"), "2024-card-show-recap");
    }

    #[test]
    fn slugify_special_chars() {
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("Rookie Card #42: The Grail"), "rookie-card-42-the-grail");
        assert_eq!(slugify("foo & bar + baz"), "foo-bar-baz");
    }

    #[test]
    fn slugify_collapses_hyphens() {
        assert_eq!(slugify("hello   world"), "hello-world");
        assert_eq!(slugify("a---b"), "a-b");
    }

    #[test]
    fn slugify_trims() {
        assert_eq!(slugify("  hello  "), "hello");
        assert_eq!(slugify("---hello---"), "hello");
    }

    #[test]
    fn slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_idempotent() {
        for input in ["Hello World", "What's New?", "a---b", "PSA 10 Charizard!"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn slugify_long_text() {
        let long_title = "word ".repeat(60);
        let slug = slugify(&long_title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn date_suffix_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(date_suffix(date), "08292026");

        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(date_suffix(date), "12012026");
    }
}
