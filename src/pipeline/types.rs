//! Shared types for the forwarding pipeline.

use lettre::message::{Mailbox, Mailboxes};

// ── Filter configuration ────────────────────────────────────────────

/// Filter rules and rewrite settings, loaded once per invocation.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Exact subject to forward (case-insensitive). `None` matches all.
    pub subject: Option<String>,
    /// Substring the body text must contain (case-insensitive). `None` matches all.
    pub content: Option<String>,
    /// Substrings that suppress forwarding when any appears in the body
    /// text (case-insensitive).
    pub content_ignore: Vec<String>,
    /// Destination addresses. Empty disables forwarding entirely.
    pub destinations: Vec<String>,
    /// Replacement from address. A bare address (no `<`) inherits the
    /// original sender's display name when one is present.
    pub from_override: Option<String>,
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Decision for one inbound message.
#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    /// Filter predicate failed; log and stop. Not an error.
    Suppressed { reason: String },
    /// Filter passed; relay the rewritten message.
    Forward(Box<OutboundMessage>),
}

impl ForwardOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Suppressed { .. } => "suppressed",
            Self::Forward(_) => "forward",
        }
    }
}

// ── Outbound message ────────────────────────────────────────────────

/// The rewritten message handed to the transport.
///
/// Subject, content-type, and body are copied verbatim from the inbound
/// message — the extracted text is used only for filtering.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub subject: String,
    pub content_type: String,
    /// Inbound transfer encoding; the body bytes are still encoded with
    /// it, so it must be declared on the relayed message as well.
    pub transfer_encoding: Option<String>,
    pub body: Vec<u8>,
    /// Computed from addresses (override rule applied).
    pub from: Mailboxes,
    /// Original senders, so replies go back to them.
    pub reply_to: Mailboxes,
    /// Formatted original recipient list, carried as `X-Original-To`.
    pub x_original_to: String,
    /// Configured destinations, validated.
    pub to: Vec<Mailbox>,
}
