//! Outbound delivery.
//!
//! [`assemble_mime`] turns an [`OutboundMessage`] into a full MIME
//! message; the [`Transport`] implementations in [`smtp`] and [`api`]
//! hand it off.

use async_trait::async_trait;
use lettre::Message;
use lettre::message::Body;
use lettre::message::header::{
    self, ContentTransferEncoding, ContentType, Header, HeaderName, HeaderValue,
};

use crate::error::TransportError;
use crate::pipeline::OutboundMessage;

pub mod api;
pub mod smtp;

pub use api::ApiTransport;
pub use smtp::SmtpRelay;

/// Outbound delivery channel.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, outbound: &OutboundMessage) -> Result<(), TransportError>;
}

/// `X-Original-To` carries the inbound recipient list through the relay.
#[derive(Debug, Clone)]
pub struct XOriginalTo(pub String);

impl Header for XOriginalTo {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Original-To")
    }

    fn parse(value: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(value.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Build the full outbound MIME message.
///
/// The original content-type and body bytes pass through unchanged;
/// only the envelope headers are rewritten. Reply-To points back at the
/// original senders. A declared transfer encoding is carried over as-is
/// so the still-encoded body is not encoded a second time.
pub fn assemble_mime(outbound: &OutboundMessage) -> Result<Message, TransportError> {
    let content_type = ContentType::parse(&outbound.content_type)
        .map_err(|e| TransportError::Assembly(format!("invalid content type: {e}")))?;

    let mut builder = Message::builder()
        .subject(outbound.subject.clone())
        .header(header::From::from(outbound.from.clone()))
        .header(header::ReplyTo::from(outbound.reply_to.clone()))
        .header(XOriginalTo(outbound.x_original_to.clone()));

    for mailbox in &outbound.to {
        builder = builder.to(mailbox.clone());
    }

    let body = match outbound.transfer_encoding.as_deref() {
        Some(value) => {
            let encoding: ContentTransferEncoding = value.parse().map_err(|_| {
                TransportError::Assembly(format!("unsupported transfer encoding {value:?}"))
            })?;
            Body::new_with_encoding(outbound.body.clone(), encoding).map_err(|_| {
                TransportError::Assembly(format!(
                    "body bytes are not valid {value} content"
                ))
            })?
        }
        None => Body::new(outbound.body.clone()),
    };

    builder
        .header(content_type)
        .body(body)
        .map_err(|e| TransportError::Assembly(e.to_string()))
}
