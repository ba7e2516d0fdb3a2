// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises review text after deduplication:
//
//   1. Lower-case the whole string
//   2. Strip embedded markup (<br/>, <p>, </a>, <!-- ... -->)
//
// Stripping is repeated until no tag is left, so text such as
// "<<b>i>" cannot reassemble into a new tag. Both steps are
// idempotent: cleaning already-clean text changes nothing.
//
// Character entities (&amp; etc.) are left as they are.
//
// Reference: Rust Book §8 (Strings in Rust)
//            regex crate documentation

use regex::Regex;
use std::sync::OnceLock;

/// Matches an HTML/XML comment or a single tag that starts with a
/// letter (optionally after '/'), e.g. `<br/>`, `<a href="x">`, `</p>`.
/// A bare `<` followed by a space or digit is ordinary text.
const MARKUP_PATTERN: &str = r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>";

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MARKUP_PATTERN).expect("markup pattern is a valid regex"))
}

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Lower-case, then strip markup. The pipeline runs the two
    /// halves as separate stages.
    #[cfg(test)]
    pub fn clean(&self, text: &str) -> String {
        self.strip_markup(&self.normalize(text))
    }

    /// Unicode-aware lower-casing.
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
    }

    /// Remove every markup tag, keeping only the text between them.
    pub fn strip_markup(&self, text: &str) -> String {
        let re = markup_regex();
        let mut current = text.to_string();

        while re.is_match(&current) {
            current = re.replace_all(&current, "").into_owned();
        }

        current
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_break() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Great phone!! <br/>Loved it"), "great phone!! loved it");
    }

    #[test]
    fn test_strips_nested_and_attributed_tags() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_markup(r#"<p>see <a href="x">this</a></p>"#), "see this");
        assert_eq!(p.strip_markup("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn test_reassembled_tag_is_removed() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_markup("x<<b>i>y"), "xy");
    }

    #[test]
    fn test_comparison_is_not_markup() {
        let p = Preprocessor::new();
        assert_eq!(p.strip_markup("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let p = Preprocessor::new();
        for raw in [
            "Great phone!! <br/>Loved it",
            "<DIV>ÀBC</DIV> x<<b>i>y",
            "plain text, nothing to do",
            "",
        ] {
            let once  = p.clean(raw);
            let twice = p.clean(&once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
