//! Plain-text derivation helpers for excerpts and SEO descriptions.

/// Derive an excerpt from a content body.
///
/// Strips markup, collapses whitespace, and truncates at a word boundary
/// within `max_chars` characters, appending an ellipsis when anything was
/// cut. Bodies that already fit are returned unchanged (minus markup).
pub fn derive_excerpt(body: &str, max_chars: usize) -> String {
    let text = strip_markup(body);

    if text.chars().count() <= max_chars {
        return text;
    }

    let mut excerpt = String::with_capacity(max_chars);
    let mut last_word_end = 0;
    for (count, c) in text.chars().enumerate() {
        if count >= max_chars {
            break;
        }
        if c.is_whitespace() {
            last_word_end = excerpt.len();
        }
        excerpt.push(c);
    }

    // Back off to the last complete word
    if last_word_end > 0 {
        excerpt.truncate(last_word_end);
    }

    excerpt.push_str("...");
    excerpt
}

/// Remove HTML tags and collapse whitespace runs into single spaces.
fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    let mut prev_space = true;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Tag boundaries separate words
                if !prev_space {
                    out.push(' ');
                    prev_space = true;
                }
            }
            _ if in_tag => {}
            c if c.is_whitespace() => {
                if !prev_space {
                    out.push(' ');
                    prev_space = true;
                }
            }
            c => {
                out.push(c);
                prev_space = false;
            }
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn short_body_passes_through() {
        assert_eq!(derive_excerpt("A short body.", 160), "A short body.");
    }

    #[test]
    fn strips_tags() {
        assert_eq!(
            derive_excerpt("<p>Hello <strong>world</strong></p>", 160),
            "Hello world"
        );
    }

    #[test]
    fn truncates_at_word_boundary() {
        let body = "The quick brown fox jumps over the lazy dog";
        let excerpt = derive_excerpt(body, 20);
        assert_eq!(excerpt, "The quick brown fox...");
    }

    #[test]
    fn appends_ellipsis_only_when_cut() {
        let body = "word ".repeat(100);
        let excerpt = derive_excerpt(&body, 50);
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.chars().count() <= 53);

        assert!(!derive_excerpt("short", 50).ends_with("..."));
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(derive_excerpt("a\n\n  b\tc", 160), "a b c");
    }
}
