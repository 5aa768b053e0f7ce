//! HTML-to-text sanitation.
//!
//! Converts an HTML body fragment into plain text while keeping the line
//! structure implied by `<br>` and `<p>` boundaries. Callers collapse any
//! pre-existing line breaks first (see `ContentExtractor`), so a bare
//! line feed is a safe sentinel: one is injected before every break tag,
//! every other piece of markup is stripped under an allow-nothing policy,
//! and surviving sentinels are materialized as CRLF.

use regex::Regex;

/// Line-break sequence used in rendered message text.
pub const LINE_FEED: &str = "\r\n";

/// Strips markup from HTML fragments, preserving block/line boundaries.
pub struct HtmlTextSanitizer {
    break_tags: Regex,
}

impl HtmlTextSanitizer {
    pub fn new() -> Self {
        Self {
            break_tags: Regex::new(r"(?i)<(?:br|p)\b").unwrap(),
        }
    }

    /// Reduce an HTML fragment to text and line breaks only.
    ///
    /// Never fails: malformed markup degrades to best-effort text.
    pub fn sanitize(&self, html: &str) -> String {
        let marked = self.break_tags.replace_all(html, "\n${0}");
        let text = ammonia::Builder::empty().clean(&marked).to_string();
        decode_entities(&text).replace('\n', LINE_FEED)
    }
}

impl Default for HtmlTextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the entities the cleaner leaves behind in text content.
/// `&amp;` goes last so a double-escaped entity decodes exactly once.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
