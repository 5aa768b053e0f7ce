//! Inbound MIME model.
//!
//! `mail-parser` does the heavy lifting; this module adapts its flat
//! part list into an owned tree of [`MimePart`] nodes with a closed set
//! of part kinds, plus the envelope fields the relay needs. The original
//! top-level content-type and body bytes are kept verbatim so a forward
//! carries the message as it arrived, not the extracted text.

use std::fmt;

use mail_parser::{Address, Encoding, Message, MessageParser, MessagePart, MimeHeaders, PartType};

use crate::error::ParseError;

pub mod attachment;
pub mod extract;
pub mod html;

pub use attachment::extract_attachments;
pub use extract::{ContentExtractor, ExtractedBody};
pub use html::HtmlTextSanitizer;

// ── Part tree ───────────────────────────────────────────────────────

/// What one MIME part holds.
#[derive(Debug, Clone)]
pub enum PartKind {
    PlainText(String),
    Html(String),
    Multipart(Vec<MimePart>),
    /// Binary, embedded message, or any other content the body walk skips.
    Other(Vec<u8>),
}

/// One node of the parsed MIME tree.
#[derive(Debug, Clone)]
pub struct MimePart {
    pub content_type: String,
    pub kind: PartKind,
    pub is_attachment: bool,
    pub filename: Option<String>,
    /// The decoder had to recover lossily; extraction treats this as terminal.
    pub encoding_problem: bool,
}

impl MimePart {
    /// Leaf content as bytes, for attachment capture. `None` for containers.
    pub fn content_bytes(&self) -> Option<Vec<u8>> {
        match &self.kind {
            PartKind::PlainText(text) | PartKind::Html(text) => Some(text.as_bytes().to_vec()),
            PartKind::Other(bytes) => Some(bytes.clone()),
            PartKind::Multipart(_) => None,
        }
    }
}

// ── Addresses ───────────────────────────────────────────────────────

/// A single sender or recipient address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: String,
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Format an address list the way it appears in a header.
pub fn format_address_list(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Parsed message ──────────────────────────────────────────────────

/// An inbound message: envelope fields, verbatim top-level content, and
/// the typed part tree.
#[derive(Debug, Clone)]
pub struct ParsedEmail {
    pub subject: Option<String>,
    pub from: Vec<EmailAddress>,
    pub to: Vec<EmailAddress>,
    /// Top-level content-type, boundary and charset included.
    pub content_type: String,
    /// Top-level transfer encoding (`quoted-printable` or `base64`).
    /// Must accompany [`body`](Self::body), which stays encoded.
    pub transfer_encoding: Option<String>,
    /// Top-level body section, byte-for-byte as received.
    pub body: Vec<u8>,
    pub root: MimePart,
}

/// Parse raw message bytes into a [`ParsedEmail`].
pub fn parse(raw: &[u8]) -> Result<ParsedEmail, ParseError> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or(ParseError::MalformedMessage)?;

    let root = build_part(&message, 0)?;
    let transfer_encoding = message.part(0).and_then(transfer_encoding);

    Ok(ParsedEmail {
        subject: message.subject().map(str::to_string),
        from: address_list(message.from()),
        to: address_list(message.to()),
        content_type: root.content_type.clone(),
        transfer_encoding,
        body: body_section(raw),
        root,
    })
}

/// The declared transfer encoding of a part, when it is one that
/// actually transforms the bytes.
fn transfer_encoding(part: &MessagePart<'_>) -> Option<String> {
    match part.encoding {
        Encoding::QuotedPrintable => Some("quoted-printable".to_string()),
        Encoding::Base64 => Some("base64".to_string()),
        Encoding::None => None,
    }
}

fn build_part(message: &Message<'_>, id: u32) -> Result<MimePart, ParseError> {
    let part = message.part(id).ok_or(ParseError::MissingPart { id })?;

    let kind = match &part.body {
        PartType::Text(text) if is_plain_text(part) => PartKind::PlainText(text.to_string()),
        PartType::Html(html) => PartKind::Html(html.to_string()),
        PartType::Multipart(children) => {
            let mut parts = Vec::with_capacity(children.len());
            for &child in children {
                parts.push(build_part(message, child)?);
            }
            PartKind::Multipart(parts)
        }
        _ => PartKind::Other(part.contents().to_vec()),
    };

    Ok(MimePart {
        content_type: render_content_type(part),
        kind,
        is_attachment: part
            .content_disposition()
            .map(|disposition| disposition.is_attachment())
            .unwrap_or(false),
        filename: part.attachment_name().map(str::to_string),
        encoding_problem: part.is_encoding_problem,
    })
}

/// A text part counts as plain only when declared text/plain (or when the
/// content-type header is absent, which defaults to it).
fn is_plain_text(part: &MessagePart<'_>) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .is_none_or(|subtype| subtype.eq_ignore_ascii_case("plain"))
        }
        None => true,
    }
}

/// Rebuild the content-type header value, keeping the parameters that
/// matter for relaying the body verbatim.
fn render_content_type(part: &MessagePart<'_>) -> String {
    match part.content_type() {
        Some(ct) => {
            let mut rendered = match ct.subtype() {
                Some(subtype) => format!("{}/{subtype}", ct.ctype()),
                None => ct.ctype().to_string(),
            };
            if let Some(charset) = ct.attribute("charset") {
                rendered.push_str(&format!("; charset=\"{charset}\""));
            }
            if let Some(boundary) = ct.attribute("boundary") {
                rendered.push_str(&format!("; boundary=\"{boundary}\""));
            }
            rendered
        }
        None => "text/plain".to_string(),
    }
}

fn address_list(header: Option<&Address<'_>>) -> Vec<EmailAddress> {
    header
        .map(|address| {
            address
                .iter()
                .map(|addr| EmailAddress {
                    name: addr.name().map(str::to_string),
                    address: addr.address().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The raw body section: everything after the first blank line, whether
/// the header block is CRLF- or LF-terminated.
fn body_section(raw: &[u8]) -> Vec<u8> {
    match (find_bytes(raw, b"\r\n\r\n"), find_bytes(raw, b"\n\n")) {
        (Some(crlf), Some(lf)) if lf < crlf => raw[lf + 2..].to_vec(),
        (Some(crlf), _) => raw[crlf + 4..].to_vec(),
        (None, Some(lf)) => raw[lf + 2..].to_vec(),
        (None, None) => Vec::new(),
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &[u8] = b"From: Jane Doe <jane@x.com>\r\n\
To: inbox@relay.test\r\n\
Subject: Invoice\r\n\
Content-Type: text/plain; charset=\"utf-8\"\r\n\
\r\n\
Please review the attached invoice.\r\n";

    const ALTERNATIVE: &[u8] = b"From: bob@example.com\r\n\
To: one@x.com, Two <two@x.com>\r\n\
Subject: Update\r\n\
Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
\r\n\
--sep\r\n\
Content-Type: text/plain\r\n\
\r\n\
plain body\r\n\
--sep\r\n\
Content-Type: text/html\r\n\
\r\n\
<p>html body</p>\r\n\
--sep--\r\n";

    #[test]
    fn parses_simple_plain_message() {
        let email = parse(PLAIN).unwrap();
        assert_eq!(email.subject.as_deref(), Some("Invoice"));
        assert_eq!(email.from.len(), 1);
        assert_eq!(email.from[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(email.from[0].address, "jane@x.com");
        assert_eq!(email.to[0].address, "inbox@relay.test");
        assert!(matches!(email.root.kind, PartKind::PlainText(_)));
        assert!(email.content_type.starts_with("text/plain"));
    }

    #[test]
    fn top_level_body_is_verbatim() {
        let email = parse(PLAIN).unwrap();
        assert_eq!(email.body, b"Please review the attached invoice.\r\n");
    }

    #[test]
    fn multipart_tree_has_children_in_document_order() {
        let email = parse(ALTERNATIVE).unwrap();
        let PartKind::Multipart(children) = &email.root.kind else {
            panic!("expected multipart root, got {:?}", email.root.kind);
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0].kind, PartKind::PlainText(_)));
        assert!(matches!(children[1].kind, PartKind::Html(_)));
    }

    #[test]
    fn multipart_content_type_keeps_boundary() {
        let email = parse(ALTERNATIVE).unwrap();
        assert!(email.content_type.starts_with("multipart/alternative"));
        assert!(email.content_type.contains("boundary=\"sep\""));
    }

    #[test]
    fn multipart_body_is_verbatim() {
        let email = parse(ALTERNATIVE).unwrap();
        assert!(email.body.starts_with(b"--sep\r\n"));
        assert!(email.body.ends_with(b"--sep--\r\n"));
    }

    #[test]
    fn to_list_keeps_all_recipients() {
        let email = parse(ALTERNATIVE).unwrap();
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.to[1].name.as_deref(), Some("Two"));
        assert_eq!(
            format_address_list(&email.to),
            "one@x.com, Two <two@x.com>"
        );
    }

    const QUOTED_PRINTABLE: &[u8] = b"From: jane@x.com\r\n\
To: inbox@relay.test\r\n\
Subject: Menu\r\n\
Content-Type: text/plain; charset=\"utf-8\"\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=C3=A9 =E2=82=AC\r\n";

    #[test]
    fn transfer_encoding_is_surfaced_and_body_stays_encoded() {
        let email = parse(QUOTED_PRINTABLE).unwrap();
        assert_eq!(email.transfer_encoding.as_deref(), Some("quoted-printable"));
        assert_eq!(email.body, b"caf=C3=A9 =E2=82=AC\r\n");
        // The part tree still holds the decoded text.
        let PartKind::PlainText(text) = &email.root.kind else {
            panic!("expected plain text root");
        };
        assert!(text.starts_with("caf\u{e9} \u{20ac}"));
    }

    #[test]
    fn unencoded_message_has_no_transfer_encoding() {
        let email = parse(PLAIN).unwrap();
        assert_eq!(email.transfer_encoding, None);
    }

    #[test]
    fn lf_terminated_headers_split_at_first_blank_line() {
        let raw = b"From: jane@x.com\n\
To: inbox@relay.test\n\
Subject: Mixed\n\
Content-Type: text/plain\n\
\n\
line one\r\n\r\nline two\r\n";
        let email = parse(raw).unwrap();
        assert_eq!(email.body, b"line one\r\n\r\nline two\r\n");
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(parse(b""), Err(ParseError::MalformedMessage)));
    }

    #[test]
    fn email_address_display() {
        let named = EmailAddress {
            name: Some("Jane Doe".into()),
            address: "jane@x.com".into(),
        };
        let bare = EmailAddress {
            name: None,
            address: "ops@example.com".into(),
        };
        assert_eq!(named.to_string(), "Jane Doe <jane@x.com>");
        assert_eq!(bare.to_string(), "ops@example.com");
    }
}
