//! End-to-end relay flow: event in, forward or suppress out.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::event::{EventEnvelope, StorageEvent};
use crate::mime;
use crate::mime::ContentExtractor;
use crate::pipeline::{DecisionEngine, FilterConfig, ForwardOutcome};
use crate::storage::ObjectStore;
use crate::transport::Transport;

/// What happened to one stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Forwarded,
    Suppressed,
}

/// Ties retrieval, parsing, the decision engine, and delivery together.
pub struct Relay {
    store: Arc<dyn ObjectStore>,
    transport: Arc<dyn Transport>,
    extractor: ContentExtractor,
    engine: DecisionEngine,
}

impl Relay {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        transport: Arc<dyn Transport>,
        filter: FilterConfig,
    ) -> Self {
        Self {
            store,
            transport,
            extractor: ContentExtractor::new(),
            engine: DecisionEngine::new(filter),
        }
    }

    /// Process one notification payload.
    ///
    /// Records are handled in order; the first failing record aborts the
    /// batch and the error propagates to the caller.
    pub async fn handle_event(&self, payload: &str) -> Result<()> {
        let envelope: EventEnvelope = serde_json::from_str(payload)
            .map_err(crate::error::EventError::Payload)?;
        info!(records = envelope.records.len(), "Handling notification");

        for record in &envelope.records {
            let event = StorageEvent::parse(&record.notification.message)?;
            for stored in &event.records {
                self.process_object(&stored.s3.bucket.name, &stored.s3.object.key)
                    .await?;
            }
        }
        Ok(())
    }

    /// Fetch one stored message and run it through the pipeline.
    pub async fn process_object(&self, bucket: &str, key: &str) -> Result<RelayOutcome> {
        info!(bucket, key, "Processing stored message");

        let raw = self.store.fetch(bucket, key).await?;
        let email = mime::parse(&raw)?;
        let body = self.extractor.extract(&email.root)?;

        match self.engine.decide(&email, &body)? {
            ForwardOutcome::Suppressed { reason } => {
                info!(bucket, key, reason, "Message suppressed");
                Ok(RelayOutcome::Suppressed)
            }
            ForwardOutcome::Forward(outbound) => {
                self.transport.deliver(&outbound).await?;
                info!(bucket, key, subject = %outbound.subject, "Message forwarded");
                Ok(RelayOutcome::Forwarded)
            }
        }
    }
}
