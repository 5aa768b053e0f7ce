//! Raw message retrieval from the object store.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::RetrievalError;

/// Source of raw message bytes, keyed by bucket and object key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full object. A missing object is terminal for the
    /// record that referenced it; anything else is transient.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError>;
}

/// Object store client speaking plain HTTP GET against
/// `{endpoint}/{bucket}/{key}`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        let url = format!("{}/{bucket}/{key}", self.endpoint);
        debug!(%url, "Fetching message object");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| RetrievalError::Transient {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RetrievalError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|e| RetrievalError::Transient {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RetrievalError::Transient {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trailing_slash_is_normalized() {
        let store = HttpObjectStore::new("http://store.local/".into());
        assert_eq!(store.endpoint, "http://store.local");
    }
}
