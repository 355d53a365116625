//! HTML to plain text reduction.
//!
//! Strips non-content structural elements, removes the remaining tags,
//! decodes common entities and collapses whitespace so a rendered page
//! becomes a single run of clean text for the extraction prompt.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::content::MAX_CONTENT_CHARS;

fn removal_patterns() -> &'static [Regex; 5] {
    static PATTERNS: OnceLock<[Regex; 5]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap(),
            Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap(),
            Regex::new(r"(?is)<nav[^>]*>.*?</nav>").unwrap(),
            Regex::new(r"(?is)<footer[^>]*>.*?</footer>").unwrap(),
            Regex::new(r"(?is)<header[^>]*>.*?</header>").unwrap(),
        ]
    })
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Reduce raw HTML to clean plain text, capped at [`MAX_CONTENT_CHARS`].
///
/// Text nodes are joined with single spaces. The tail is truncated at
/// the cap so one pathological page cannot dominate downstream token
/// budgets.
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    // Drop non-content structural elements wholesale
    for pattern in removal_patterns() {
        text = pattern.replace_all(&text, " ").to_string();
    }

    // Remaining tags become whitespace so adjacent text nodes stay separated
    text = tag_pattern().replace_all(&text, " ").to_string();

    text = decode_entities(&text);

    let mut collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_CONTENT_CHARS {
        collapsed = collapsed.chars().take(MAX_CONTENT_CHARS).collect();
    }

    collapsed
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"
            <html><head><style>body { color: red; }</style></head>
            <body><script>alert("x")</script><p>Real content here</p></body></html>
        "#;
        let text = html_to_text(html);
        assert_eq!(text, "Real content here");
    }

    #[test]
    fn test_strips_structural_elements() {
        let html = r#"
            <header>Site header</header>
            <nav><a href="/">Home</a></nav>
            <main><p>Market size is $29.4B</p></main>
            <footer>Copyright</footer>
        "#;
        let text = html_to_text(html);
        assert_eq!(text, "Market size is $29.4B");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<p>first</p>\n\n\n   <p>second</p>";
        assert_eq!(html_to_text(html), "first second");
    }

    #[test]
    fn test_decodes_entities() {
        let html = "<p>AT&amp;T &quot;research&quot;&nbsp;note</p>";
        assert_eq!(html_to_text(html), "AT&T \"research\" note");
    }

    #[test]
    fn test_caps_output() {
        let body = "word ".repeat(40_000); // 200k chars
        let html = format!("<p>{body}</p>");
        let text = html_to_text(&html);
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_case_insensitive_tags() {
        let html = "<SCRIPT>var x = 1;</SCRIPT><P>kept</P>";
        assert_eq!(html_to_text(html), "kept");
    }
}
