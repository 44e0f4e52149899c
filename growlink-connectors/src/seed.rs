//! Seed/Demo REST API Client
//!
//! A small companion service exposes illustrative chamber data over plain
//! REST (a current snapshot, two history arrays, and the static plant
//! profile), all wrapped in `{success, data}` envelopes. The dashboard uses
//! it as its [`ProfileSource`]; the sensor endpoints exist for demos and
//! local development without live store credentials.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use growlink_core::errors::StoreError;
use growlink_core::records::{LuxPoint, PlantProfile, RpmPoint, SensorSnapshot};
use growlink_core::store::ProfileSource;

/// `{success, data}` response envelope used by every endpoint.
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

/// Client for the seed REST API.
pub struct SeedApi {
    base_url: String,
    http: reqwest::Client,
}

impl SeedApi {
    /// Client over the service's base URL (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
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

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(StoreError::Decode("endpoint reported failure".into()));
        }
        Ok(envelope.data)
    }

    /// Current scalar readings.
    pub async fn current_snapshot(&self) -> Result<SensorSnapshot, StoreError> {
        self.get_enveloped("/api/sensors/current").await
    }

    /// Seed light intensity history.
    pub async fn lux_history(&self) -> Result<Vec<LuxPoint>, StoreError> {
        self.get_enveloped("/api/sensors/history/lux").await
    }

    /// Seed fan RPM history.
    pub async fn rpm_history(&self) -> Result<Vec<RpmPoint>, StoreError> {
        self.get_enveloped("/api/sensors/history/rpm").await
    }
}

#[async_trait]
impl ProfileSource for SeedApi {
    async fn plant_profile(&self) -> Result<PlantProfile, StoreError> {
        self.get_enveloped("/api/plant-info").await
    }
}
