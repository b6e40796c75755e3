use std::sync::LazyLock;

use regex::Regex;

static LINKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("valid link pattern"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s.,!?']").expect("valid charset pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Normalize free text before classification: links dropped, everything
/// outside letters, digits and basic punctuation blanked, whitespace collapsed.
pub fn clean_text(text: &str) -> String {
    let text = LINKS.replace_all(text, "");
    let text = DISALLOWED.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_links() {
        assert_eq!(
            clean_text("Read https://x.example/a?b=1 and www.site.in now"),
            "Read and now"
        );
    }

    #[test]
    fn blanks_symbols_and_keeps_punctuation() {
        assert_eq!(
            clean_text("Breaking\u{1F6A8}: PM's #plan \u{2014} \"approved\"!"),
            "Breaking PM's plan approved !"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn idempotent_on_clean_text() {
        let once = clean_text("Officials confirmed the report, citing data.");
        assert_eq!(clean_text(&once), once);
    }
}
