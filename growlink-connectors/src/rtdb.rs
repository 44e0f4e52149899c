//! Keyed Store Client (Realtime Database over REST + SSE)
//!
//! ## Overview
//!
//! The keyed store is path-addressed and last-write-wins. One-shot reads and
//! writes are plain REST (`GET`/`PUT {base}/{path}.json`); subscriptions use
//! the streaming endpoint, a long-lived `text/event-stream` response that
//! pushes `put`/`patch` events whenever the subscribed subtree changes.
//!
//! ## Subscription lifecycle
//!
//! `subscribe` opens the stream *before* returning, so a setup failure
//! (unreachable host, auth rejection) surfaces as an `Err` to the caller.
//! After that, a background task pumps events into the delivery channel and
//! owns reconnection: when the stream drops, the task reports one in-band
//! `StoreError::Stream`, then retries with capped exponential backoff until
//! either the connection is back or the receiver is gone. Dropping the
//! receiver is the only way to end a subscription.
//!
//! Path segments are opaque: group names like `group6&35` are used verbatim
//! and never parsed or encoded beyond what the URL itself requires.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use tokio::sync::mpsc;

use growlink_core::errors::StoreError;
use growlink_core::store::{KeyedStore, ScalarDelivery, DELIVERY_BUFFER};

use crate::sse::SseParser;

/// First reconnect delay after a dropped stream.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Reconnect delay ceiling.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Keyed store configuration.
#[derive(Clone)]
pub struct RtdbConfig {
    /// Database base URL, e.g. `https://example.firebasedatabase.app`
    pub base_url: String,
    /// Optional auth token appended to every request
    pub auth_token: Option<String>,
    /// Timeout for one-shot requests (streams are exempt)
    pub timeout: Duration,
}

impl RtdbConfig {
    /// Create a configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Attach an auth token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the one-shot request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Client for the realtime keyed store.
pub struct RtdbClient {
    config: RtdbConfig,
    http: reqwest::Client,
    /// Separate client without a total-request timeout; streams are expected
    /// to stay open indefinitely.
    stream_http: reqwest::Client,
}

impl RtdbClient {
    /// Build a client, validating the base URL.
    pub fn new(config: RtdbConfig) -> Result<Self, StoreError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(StoreError::Connect(
                "base URL must start with http:// or https://".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(Self {
            config,
            http,
            stream_http,
        })
    }

    fn url_for(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        match &self.config.auth_token {
            Some(token) => format!("{}/{path}.json?auth={token}", self.config.base_url),
            None => format!("{}/{path}.json", self.config.base_url),
        }
    }

    async fn open_stream(
        http: &reqwest::Client,
        url: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let response = http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
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
        Ok(response)
    }
}

#[async_trait]
impl KeyedStore for RtdbClient {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .http
            .get(self.url_for(path))
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

        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.url_for(path))
            .json(&value)
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
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<mpsc::Receiver<ScalarDelivery>, StoreError> {
        let url = self.url_for(path);
        let response = Self::open_stream(&self.stream_http, &url).await?;
        debug!("stream open: {path}");

        let (tx, rx) = mpsc::channel(DELIVERY_BUFFER);
        tokio::spawn(stream_task(
            self.stream_http.clone(),
            url,
            path.to_string(),
            response,
            tx,
        ));
        Ok(rx)
    }
}

/// Pump one subscription's stream, reconnecting until the receiver is gone.
async fn stream_task(
    http: reqwest::Client,
    url: String,
    path: String,
    mut response: reqwest::Response,
    tx: mpsc::Sender<ScalarDelivery>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let reason = match pump_events(&mut response, &tx).await {
            PumpEnd::ReceiverGone => return,
            PumpEnd::StreamLost(reason) => reason,
        };

        warn!("stream lost on {path}: {reason}");
        if tx.send(Err(StoreError::Stream(reason))).await.is_err() {
            return;
        }

        // Reconnect with capped exponential backoff.
        loop {
            tokio::time::sleep(backoff).await;
            if tx.is_closed() {
                return;
            }
            match RtdbClient::open_stream(&http, &url).await {
                Ok(new_response) => {
                    debug!("stream reopened: {path}");
                    response = new_response;
                    backoff = INITIAL_BACKOFF;
                    break;
                }
                Err(err) => {
                    warn!("stream reconnect failed on {path}: {err}");
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }
}

enum PumpEnd {
    /// Receiver dropped; the subscription is over.
    ReceiverGone,
    /// The transport ended or errored; reconnect.
    StreamLost(String),
}

async fn pump_events(response: &mut reqwest::Response, tx: &mpsc::Sender<ScalarDelivery>) -> PumpEnd {
    let mut parser = SseParser::new();

    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return PumpEnd::StreamLost("stream ended".into()),
            Err(err) => return PumpEnd::StreamLost(err.to_string()),
        };

        for event in parser.push(&chunk) {
            match event.event.as_str() {
                "put" | "patch" => {
                    let Some(delivery) = delivery_from_event(&event.data) else {
                        continue;
                    };
                    if tx.send(Ok(delivery)).await.is_err() {
                        return PumpEnd::ReceiverGone;
                    }
                }
                "keep-alive" => {}
                "cancel" | "auth_revoked" => {
                    return PumpEnd::StreamLost(format!("server sent {}", event.event));
                }
                other => debug!("ignoring stream event {other}"),
            }
        }
    }
}

/// Extract the new value from a `put`/`patch` payload.
///
/// Payloads are `{"path": <subpath>, "data": <value>}`. We subscribe to leaf
/// paths, so only root-path events carry the value itself; deeper patches
/// are ignored rather than guessed at.
fn delivery_from_event(data: &str) -> Option<Option<Value>> {
    let payload: Value = serde_json::from_str(data).ok()?;
    let sub_path = payload.get("path")?.as_str()?;
    if sub_path != "/" {
        return None;
    }
    let value = payload.get("data")?.clone();
    Some(if value.is_null() { None } else { Some(value) })
}
