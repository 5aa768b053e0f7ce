//! Delivery through an outbound email HTTP API.
//!
//! The assembled message is posted raw, base64-encoded, together with
//! the resolved envelope addresses. Used when no SMTP relay is
//! configured.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::TransportError;
use crate::pipeline::OutboundMessage;
use crate::transport::{Transport, assemble_mime};

pub struct ApiTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl ApiTransport {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl Transport for ApiTransport {
    async fn deliver(&self, outbound: &OutboundMessage) -> Result<(), TransportError> {
        let message = assemble_mime(outbound)?;
        let payload = json!({
            "from": outbound.from.to_string(),
            "destinations": outbound.to.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "raw": BASE64.encode(message.formatted()),
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Api(e.to_string()))?
            .error_for_status()
            .map_err(|e| TransportError::Api(e.to_string()))?;

        info!(status = %response.status(), "API delivery accepted");
        Ok(())
    }
}
