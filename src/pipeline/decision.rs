//! Forward/suppress decision and outbound rewrite.

use lettre::Address;
use lettre::message::{Mailbox, Mailboxes};
use tracing::debug;

use crate::error::AddressError;
use crate::mime::{EmailAddress, ExtractedBody, ParsedEmail, format_address_list};
use crate::pipeline::types::{FilterConfig, ForwardOutcome, OutboundMessage};

/// Applies the filter predicate and builds the outbound message.
pub struct DecisionEngine {
    config: FilterConfig,
}

impl DecisionEngine {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Decide whether to forward `email`.
    ///
    /// All of the following must hold: destinations configured, subject
    /// filter matches (exact, case-insensitive), content filter matches
    /// (contains, case-insensitive), and no ignore substring appears in
    /// the body text. Malformed configured addresses are terminal.
    pub fn decide(
        &self,
        email: &ParsedEmail,
        body: &ExtractedBody,
    ) -> Result<ForwardOutcome, AddressError> {
        if self.config.destinations.is_empty() {
            return Ok(suppressed("no destinations configured"));
        }

        if let Some(expected) = non_empty(self.config.subject.as_deref()) {
            let matched = email
                .subject
                .as_deref()
                .is_some_and(|subject| subject.to_lowercase() == expected.to_lowercase());
            if !matched {
                return Ok(suppressed("subject does not match filter"));
            }
        }

        let rendered = body.render().to_lowercase();

        if let Some(needle) = non_empty(self.config.content.as_deref())
            && !rendered.contains(&needle.to_lowercase())
        {
            return Ok(suppressed("content does not match filter"));
        }

        for ignore in &self.config.content_ignore {
            if !ignore.is_empty() && rendered.contains(&ignore.to_lowercase()) {
                return Ok(ForwardOutcome::Suppressed {
                    reason: format!("content matches ignore pattern {ignore:?}"),
                });
            }
        }

        debug!(subject = ?email.subject, "Filter passed, building outbound message");
        Ok(ForwardOutcome::Forward(Box::new(self.build_outbound(email)?)))
    }

    fn build_outbound(&self, email: &ParsedEmail) -> Result<OutboundMessage, AddressError> {
        let mut to = Vec::with_capacity(self.config.destinations.len());
        for destination in &self.config.destinations {
            let mailbox: Mailbox =
                destination
                    .parse()
                    .map_err(|e: lettre::address::AddressError| AddressError::Destination {
                        address: destination.clone(),
                        reason: e.to_string(),
                    })?;
            to.push(mailbox);
        }

        Ok(OutboundMessage {
            subject: email.subject.clone().unwrap_or_default(),
            content_type: email.content_type.clone(),
            transfer_encoding: email.transfer_encoding.clone(),
            body: email.body.clone(),
            from: self.compose_from(&email.from)?,
            reply_to: mailboxes_from(&email.from)?,
            x_original_to: format_address_list(&email.to),
            to,
        })
    }

    /// Apply the from-override rule: a bare override address inherits the
    /// original first sender's display name; an override carrying its own
    /// display part is used verbatim; no override keeps the original list.
    fn compose_from(&self, original: &[EmailAddress]) -> Result<Mailboxes, AddressError> {
        match non_empty(self.config.from_override.as_deref()) {
            Some(over) if !over.contains('<') => {
                let address: Address = over.parse().map_err(|e: lettre::address::AddressError| {
                    AddressError::From {
                        address: over.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let display = original.first().and_then(|sender| sender.name.clone());
                Ok(Mailboxes::new().with(Mailbox::new(display, address)))
            }
            Some(over) => {
                let mailbox: Mailbox =
                    over.parse()
                        .map_err(|e: lettre::address::AddressError| AddressError::From {
                            address: over.to_string(),
                            reason: e.to_string(),
                        })?;
                Ok(Mailboxes::new().with(mailbox))
            }
            None => mailboxes_from(original),
        }
    }
}

fn suppressed(reason: &str) -> ForwardOutcome {
    ForwardOutcome::Suppressed {
        reason: reason.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn mailboxes_from(addresses: &[EmailAddress]) -> Result<Mailboxes, AddressError> {
    let mut mailboxes = Mailboxes::new();
    for entry in addresses {
        let address: Address =
            entry
                .address
                .parse()
                .map_err(|e: lettre::address::AddressError| AddressError::From {
                    address: entry.address.clone(),
                    reason: e.to_string(),
                })?;
        mailboxes.push(Mailbox::new(entry.name.clone(), address));
    }
    Ok(mailboxes)
}
