//! End-to-end relay flow against in-memory store and transport fakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mailrelay::error::{Error, RetrievalError, TransportError};
use mailrelay::pipeline::{FilterConfig, OutboundMessage};
use mailrelay::relay::{Relay, RelayOutcome};
use mailrelay::storage::ObjectStore;
use mailrelay::transport::Transport;

struct InMemoryStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    fn put(mut self, bucket: &str, key: &str, bytes: &[u8]) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
        self
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

#[derive(Default)]
struct RecordingTransport {
    delivered: Mutex<Vec<OutboundMessage>>,
}

impl RecordingTransport {
    fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, outbound: &OutboundMessage) -> Result<(), TransportError> {
        self.delivered.lock().unwrap().push(outbound.clone());
        Ok(())
    }
}

const RAW_PLAIN: &[u8] = b"From: Jane Doe <jane@x.com>\r\n\
To: inbox@relay.test\r\n\
Subject: Invoice\r\n\
Content-Type: text/plain; charset=\"utf-8\"\r\n\
\r\n\
Please review the invoice.\r\n";

const RAW_QUOTED_PRINTABLE: &[u8] = b"From: jane@x.com\r\n\
To: inbox@relay.test\r\n\
Subject: Menu\r\n\
Content-Type: text/plain; charset=\"utf-8\"\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=C3=A9 =E2=82=AC\r\n";

const RAW_NEWSLETTER: &[u8] = b"From: news@example.com\r\n\
To: inbox@relay.test\r\n\
Subject: Weekly digest\r\n\
Content-Type: text/plain\r\n\
\r\n\
Click here to unsubscribe.\r\n";

fn envelope(entries: &[(&str, &str)]) -> String {
    let records: Vec<String> = entries
        .iter()
        .map(|(bucket, key)| {
            let inner = format!(
                r#"{{"Records":[{{"s3":{{"bucket":{{"name":"{bucket}"}},"object":{{"key":"{key}"}}}}}}]}}"#
            );
            format!(
                r#"{{"Sns":{{"Message":{}}}}}"#,
                serde_json::to_string(&inner).unwrap()
            )
        })
        .collect();
    format!(r#"{{"Records":[{}]}}"#, records.join(","))
}

fn filter() -> FilterConfig {
    FilterConfig {
        destinations: vec!["ops@example.com".to_string()],
        ..Default::default()
    }
}

fn relay(store: InMemoryStore, transport: Arc<RecordingTransport>, filter: FilterConfig) -> Relay {
    Relay::new(Arc::new(store), transport, filter)
}

#[tokio::test]
async fn forwards_a_stored_message() {
    let store = InMemoryStore::new().put("mail", "msg1", RAW_PLAIN);
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, Arc::clone(&transport), filter());

    relay.handle_event(&envelope(&[("mail", "msg1")])).await.unwrap();

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].subject, "Invoice");
    assert_eq!(delivered[0].body, b"Please review the invoice.\r\n");
    assert_eq!(delivered[0].x_original_to, "inbox@relay.test");
    let reply_to = delivered[0].reply_to.iter().next().unwrap();
    assert_eq!(reply_to.name.as_deref(), Some("Jane Doe"));
    assert_eq!(reply_to.email.to_string(), "jane@x.com");
    assert_eq!(delivered[0].to[0].email.to_string(), "ops@example.com");
}

#[tokio::test]
async fn transfer_encoded_message_keeps_its_encoding() {
    let store = InMemoryStore::new().put("mail", "menu", RAW_QUOTED_PRINTABLE);
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, Arc::clone(&transport), filter());

    relay.process_object("mail", "menu").await.unwrap();

    let delivered = transport.delivered();
    assert_eq!(
        delivered[0].transfer_encoding.as_deref(),
        Some("quoted-printable")
    );
    assert_eq!(delivered[0].body, b"caf=C3=A9 =E2=82=AC\r\n");
}

#[tokio::test]
async fn suppressed_message_is_not_delivered() {
    let store = InMemoryStore::new().put("mail", "msg1", RAW_NEWSLETTER);
    let transport = Arc::new(RecordingTransport::default());
    let config = FilterConfig {
        content_ignore: vec!["unsubscribe".to_string()],
        ..filter()
    };
    let relay = relay(store, Arc::clone(&transport), config);

    let outcome = relay.process_object("mail", "msg1").await.unwrap();
    assert_eq!(outcome, RelayOutcome::Suppressed);
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn subject_filter_applies_end_to_end() {
    let store = InMemoryStore::new()
        .put("mail", "invoice", RAW_PLAIN)
        .put("mail", "digest", RAW_NEWSLETTER);
    let transport = Arc::new(RecordingTransport::default());
    let config = FilterConfig {
        subject: Some("invoice".to_string()),
        ..filter()
    };
    let relay = relay(store, Arc::clone(&transport), config);

    assert_eq!(
        relay.process_object("mail", "invoice").await.unwrap(),
        RelayOutcome::Forwarded
    );
    assert_eq!(
        relay.process_object("mail", "digest").await.unwrap(),
        RelayOutcome::Suppressed
    );
    assert_eq!(transport.delivered().len(), 1);
}

#[tokio::test]
async fn from_override_rewrites_sender() {
    let store = InMemoryStore::new().put("mail", "msg1", RAW_PLAIN);
    let transport = Arc::new(RecordingTransport::default());
    let config = FilterConfig {
        from_override: Some("relay@forwarder.test".to_string()),
        ..filter()
    };
    let relay = relay(store, Arc::clone(&transport), config);

    relay.process_object("mail", "msg1").await.unwrap();
    let delivered = transport.delivered();
    let from = delivered[0].from.iter().next().unwrap();
    assert_eq!(from.name.as_deref(), Some("Jane Doe"));
    assert_eq!(from.email.to_string(), "relay@forwarder.test");
}

#[tokio::test]
async fn missing_object_fails_the_batch() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, Arc::clone(&transport), filter());

    let err = relay
        .handle_event(&envelope(&[("mail", "gone")]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Retrieval(RetrievalError::NotFound { .. })));
}

#[tokio::test]
async fn first_failing_record_short_circuits() {
    let store = InMemoryStore::new().put("mail", "second", RAW_PLAIN);
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, Arc::clone(&transport), filter());

    let result = relay
        .handle_event(&envelope(&[("mail", "missing"), ("mail", "second")]))
        .await;
    assert!(result.is_err());
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn records_process_in_order() {
    let store = InMemoryStore::new()
        .put("mail", "a", RAW_PLAIN)
        .put("mail", "b", RAW_NEWSLETTER);
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, Arc::clone(&transport), filter());

    relay
        .handle_event(&envelope(&[("mail", "a"), ("mail", "b")]))
        .await
        .unwrap();

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].subject, "Invoice");
    assert_eq!(delivered[1].subject, "Weekly digest");
}

#[tokio::test]
async fn malformed_payload_is_an_event_error() {
    let store = InMemoryStore::new();
    let transport = Arc::new(RecordingTransport::default());
    let relay = relay(store, transport, filter());

    let err = relay.handle_event("not json").await.unwrap_err();
    assert!(matches!(err, Error::Event(_)));
}
