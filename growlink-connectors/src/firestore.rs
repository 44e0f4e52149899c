//! Document Store Client (Firestore-style REST `runQuery`)
//!
//! ## Overview
//!
//! Telemetry history lives in per-group subcollections
//! (`growthChamber/<group>/sensorData`). The query is always the same shape:
//! the `limit` most recent documents by `timestamp`, descending. Documents
//! come back with wrapper-typed fields (`{"integerValue": "1200"}`); this
//! client hands the raw `fields` maps through untouched so the core's decode
//! boundary stays the single place that understands the encoding.
//!
//! ## Subscriptions
//!
//! The REST surface has no push channel, so `subscribe_latest` approximates
//! realtime with interval polling. Every delivery is a complete page
//! (snapshot semantics, exactly what the view-model's wholesale replacement
//! expects); fetch failures are forwarded in-band and polling continues.
//! The initial query runs inside `subscribe_latest` itself, so setup
//! failures surface as an `Err` return rather than a dead channel.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use growlink_core::errors::StoreError;
use growlink_core::store::{DocumentStore, PageDelivery, DELIVERY_BUFFER};

/// Default REST endpoint root.
const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Document store configuration.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Cloud project id
    pub project_id: String,
    /// Optional API key appended to every request
    pub api_key: Option<String>,
    /// Endpoint root; overridable for self-hosted emulators
    pub endpoint: String,
    /// Interval between subscription polls
    pub poll_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl FirestoreConfig {
    /// Create a configuration for the given project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.into(),
            poll_interval: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }

    /// Attach an API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point at a different endpoint root (e.g. a local emulator).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        self.endpoint = endpoint;
        self
    }

    /// Set the subscription poll interval in seconds.
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(secs);
        self
    }
}

/// Client for the document store.
pub struct FirestoreClient {
    config: FirestoreConfig,
    http: reqwest::Client,
}

impl FirestoreClient {
    /// Build a client.
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// `runQuery` URL for a collection path like
    /// `growthChamber/group30/sensorData`: the final segment is the queried
    /// collection id, everything before it the parent document.
    fn query_url(&self, collection: &str) -> (String, String) {
        let collection = collection.trim_matches('/');
        let (parent, collection_id) = match collection.rsplit_once('/') {
            Some((parent, id)) => (format!("/{parent}"), id.to_string()),
            None => (String::new(), collection.to_string()),
        };

        let mut url = format!(
            "{}/projects/{}/databases/(default)/documents{parent}:runQuery",
            self.config.endpoint, self.config.project_id
        );
        if let Some(key) = &self.config.api_key {
            url.push_str(&format!("?key={key}"));
        }
        (url, collection_id)
    }

    async fn run_query(&self, collection: &str, limit: usize) -> Result<Vec<Value>, StoreError> {
        let (url, collection_id) = self.query_url(collection);
        let body = json!({
            "structuredQuery": {
                "from": [{"collectionId": collection_id}],
                "orderBy": [{
                    "field": {"fieldPath": "timestamp"},
                    "direction": "DESCENDING",
                }],
                "limit": limit,
            }
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(documents_from_rows(rows))
    }
}

/// Pull the raw `fields` map out of each result row. Rows without a document
/// (query progress markers) are skipped.
fn documents_from_rows(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter()
        .filter_map(|row| row.get("document")?.get("fields").cloned())
        .collect()
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn fetch_latest(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        self.run_query(collection, limit).await
    }

    async fn subscribe_latest(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<mpsc::Receiver<PageDelivery>, StoreError> {
        // First page inside the call: setup failures are the caller's to see.
        let first_page = self.run_query(collection, limit).await?;
        debug!("query subscription open: {collection}");

        let (tx, rx) = mpsc::channel(DELIVERY_BUFFER);
        let client = Self {
            config: self.config.clone(),
            http: self.http.clone(),
        };
        let collection = collection.to_string();

        tokio::spawn(async move {
            if tx.send(Ok(first_page)).await.is_err() {
                return;
            }
            loop {
                tokio::time::sleep(client.config.poll_interval).await;
                if tx.is_closed() {
                    return;
                }
                let delivery = match client.run_query(&collection, limit).await {
                    Ok(page) => Ok(page),
                    Err(err) => {
                        warn!("poll failed for {collection}: {err}");
                        Err(StoreError::Stream(err.to_string()))
                    }
                };
                if tx.send(delivery).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }
}
