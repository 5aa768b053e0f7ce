//! Notification envelope and storage event types.
//!
//! The trigger is a two-layer JSON document: an outer push notification
//! whose records each carry a storage event as an embedded JSON string,
//! and the inner storage event naming the bucket and object key of a
//! stored raw message.

use serde::Deserialize;

use crate::error::EventError;

// ── Outer envelope ──────────────────────────────────────────────────

/// Push notification envelope delivered to the relay endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<EnvelopeRecord>,
}

/// One record of the outer envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeRecord {
    #[serde(rename = "Sns")]
    pub notification: TopicNotification,
}

/// The published notification; `message` is the storage event as JSON text.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicNotification {
    #[serde(rename = "Message")]
    pub message: String,
}

// ── Inner storage event ─────────────────────────────────────────────

/// Storage event describing one or more newly stored objects.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records")]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl StorageEvent {
    /// Parse the storage event embedded in a notification message.
    pub fn parse(message: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(message)?)
    }
}
