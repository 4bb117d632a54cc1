//! Text cleanup helpers.

use scraper::Html;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce an HTML fragment to its visible text.
pub fn strip_html(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return normalize_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let text: Vec<&str> = parsed.root_element().text().collect();
    normalize_whitespace(&text.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hand-thrown <strong>stoneware</strong> mug</p>\n<ul><li>12oz</li></ul>"),
            "Hand-thrown stoneware mug 12oz"
        );
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(strip_html("Salt &amp; Pepper"), "Salt & Pepper");
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(strip_html("  plain\n text "), "plain text");
    }
}
