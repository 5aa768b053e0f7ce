//! SMTP submission over STARTTLS.

use async_trait::async_trait;
use lettre::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::TransportError;
use crate::pipeline::OutboundMessage;
use crate::transport::{Transport, assemble_mime};

/// Delivers via an authenticated SMTP relay.
pub struct SmtpRelay {
    transport: SmtpTransport,
}

impl SmtpRelay {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| TransportError::Smtp(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.expose_secret().to_string(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Transport for SmtpRelay {
    async fn deliver(&self, outbound: &OutboundMessage) -> Result<(), TransportError> {
        let message = assemble_mime(outbound)?;
        let response = lettre::Transport::send(&self.transport, &message)
            .map_err(|e| TransportError::Smtp(e.to_string()))?;
        info!(code = %response.code(), "SMTP delivery accepted");
        Ok(())
    }
}
