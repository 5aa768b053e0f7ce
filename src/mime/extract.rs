//! Body text extraction from a parsed MIME tree.
//!
//! Depth-first walk over the part tree: plain-text leaves contribute
//! their content with trailing line feeds stripped, HTML leaves are
//! flattened and sanitized, multipart containers are recursed in
//! document order, and anything else contributes nothing. Fragments are
//! deduplicated by exact string equality with first-seen order kept.

use std::collections::HashSet;

use regex::Regex;

use crate::error::ExtractionError;
use crate::mime::html::{HtmlTextSanitizer, LINE_FEED};
use crate::mime::{MimePart, PartKind};

// ── Extracted body ──────────────────────────────────────────────────

/// Ordered, deduplicated text fragments collected from one message.
#[derive(Debug, Default)]
pub struct ExtractedBody {
    fragments: Vec<String>,
    seen: HashSet<String>,
}

impl ExtractedBody {
    fn push(&mut self, fragment: String) {
        if self.seen.insert(fragment.clone()) {
            self.fragments.push(fragment);
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Render as a single string, fragments joined by CRLF and the whole
    /// body prefixed by one CRLF to preserve vertical baseline spacing.
    pub fn render(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!("{LINE_FEED}{}", self.fragments.join(LINE_FEED))
        }
    }
}

// ── Extractor ───────────────────────────────────────────────────────

/// Walks a MIME tree and produces the normalized body text.
pub struct ContentExtractor {
    sanitizer: HtmlTextSanitizer,
    line_breaks: Regex,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self {
            sanitizer: HtmlTextSanitizer::new(),
            line_breaks: Regex::new(r"\r\n|\r|\n").unwrap(),
        }
    }

    /// Extract the body text of the tree rooted at `root`.
    ///
    /// An undecodable text or HTML part aborts extraction for the whole
    /// message; there is no partial result.
    pub fn extract(&self, root: &MimePart) -> Result<ExtractedBody, ExtractionError> {
        let mut body = ExtractedBody::default();
        self.walk(root, &mut body)?;
        Ok(body)
    }

    fn walk(&self, part: &MimePart, body: &mut ExtractedBody) -> Result<(), ExtractionError> {
        match &part.kind {
            PartKind::PlainText(text) => {
                self.check_readable(part)?;
                body.push(strip_trailing_line_feeds(text).to_string());
            }
            PartKind::Html(html) => {
                self.check_readable(part)?;
                // HTML line structure is irrelevant pre-sanitization;
                // collapse it so break tags alone decide line boundaries.
                let flat = self.line_breaks.replace_all(html, "");
                body.push(self.sanitizer.sanitize(&flat));
            }
            PartKind::Multipart(children) => {
                for child in children {
                    self.walk(child, body)?;
                }
            }
            PartKind::Other(_) => {}
        }
        Ok(())
    }

    fn check_readable(&self, part: &MimePart) -> Result<(), ExtractionError> {
        if part.encoding_problem {
            return Err(ExtractionError::UnreadablePart {
                content_type: part.content_type.clone(),
            });
        }
        Ok(())
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip every trailing line-break sequence, not just the last one.
pub fn strip_trailing_line_feeds(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}
