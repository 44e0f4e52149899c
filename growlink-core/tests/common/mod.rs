//! Shared fakes for integration tests
//!
//! The view-model and assistant only see the store traits, so the tests
//! drive them with hand-fed in-memory stores: deliveries go in through
//! explicit `deliver_*` calls, and `wait_for` polls the model until the
//! effect is observable (deliveries cross a task boundary, so assertions
//! cannot run synchronously after a send).

#![allow(dead_code)] // each test binary uses a different slice of this harness

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch, Mutex};

use growlink_core::errors::StoreError;
use growlink_core::model::{DashboardState, LiveModel};
use growlink_core::records::PlantProfile;
use growlink_core::store::{
    DocumentStore, KeyedStore, PageDelivery, ProfileSource, ScalarDelivery, DELIVERY_BUFFER,
};

/// Keyed store whose subscriptions are fed by the test body.
#[derive(Default)]
pub struct ScriptedKeyedStore {
    subscribers: Mutex<HashMap<String, mpsc::Sender<ScalarDelivery>>>,
    reads: Mutex<HashMap<String, Value>>,
    writes: Mutex<Vec<(String, Value)>>,
    refuse_subscribe: Mutex<Vec<String>>,
}

impl ScriptedKeyedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `subscribe` fail for one path (setup-failure scenarios).
    pub async fn refuse_subscribe(&self, path: &str) {
        self.refuse_subscribe.lock().await.push(path.to_string());
    }

    /// Seed the value returned by one-shot reads of `path`.
    pub async fn set_read(&self, path: &str, value: Value) {
        self.reads.lock().await.insert(path.to_string(), value);
    }

    /// Everything written through the store so far, in order.
    pub async fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().await.clone()
    }

    pub async fn deliver(&self, path: &str, value: Value) {
        self.send(path, Ok(Some(value))).await;
    }

    /// Like `deliver`, but reports whether the subscriber still listens
    /// instead of panicking (for after-teardown assertions).
    pub async fn try_deliver(&self, path: &str, value: Value) -> bool {
        let subscribers = self.subscribers.lock().await;
        match subscribers.get(path) {
            Some(tx) => tx.send(Ok(Some(value))).await.is_ok(),
            None => false,
        }
    }

    pub async fn deliver_null(&self, path: &str) {
        self.send(path, Ok(None)).await;
    }

    pub async fn deliver_error(&self, path: &str, message: &str) {
        self.send(path, Err(StoreError::Stream(message.to_string())))
            .await;
    }

    async fn send(&self, path: &str, delivery: ScalarDelivery) {
        let subscribers = self.subscribers.lock().await;
        let tx = subscribers
            .get(path)
            .unwrap_or_else(|| panic!("no subscriber for {path}"));
        tx.send(delivery).await.expect("subscriber gone");
    }
}

#[async_trait]
impl KeyedStore for ScriptedKeyedStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.reads.lock().await.get(path).cloned())
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.writes.lock().await.push((path.to_string(), value));
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<mpsc::Receiver<ScalarDelivery>, StoreError> {
        if self.refuse_subscribe.lock().await.iter().any(|p| p == path) {
            return Err(StoreError::Connect(format!("refused: {path}")));
        }
        let (tx, rx) = mpsc::channel(DELIVERY_BUFFER);
        self.subscribers.lock().await.insert(path.to_string(), tx);
        Ok(rx)
    }
}

/// Document store whose query subscriptions are fed by the test body.
#[derive(Default)]
pub struct ScriptedDocumentStore {
    subscribers: Mutex<HashMap<String, mpsc::Sender<PageDelivery>>>,
    pages: Mutex<HashMap<String, Vec<Value>>>,
}

impl ScriptedDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the page returned by one-shot fetches of `collection`.
    pub async fn set_page(&self, collection: &str, page: Vec<Value>) {
        self.pages.lock().await.insert(collection.to_string(), page);
    }

    pub async fn deliver_page(&self, collection: &str, page: Vec<Value>) {
        self.send(collection, Ok(page)).await;
    }

    pub async fn deliver_error(&self, collection: &str, message: &str) {
        self.send(collection, Err(StoreError::Stream(message.to_string())))
            .await;
    }

    async fn send(&self, collection: &str, delivery: PageDelivery) {
        let subscribers = self.subscribers.lock().await;
        let tx = subscribers
            .get(collection)
            .unwrap_or_else(|| panic!("no subscriber for {collection}"));
        tx.send(delivery).await.expect("subscriber gone");
    }
}

#[async_trait]
impl DocumentStore for ScriptedDocumentStore {
    async fn fetch_latest(
        &self,
        collection: &str,
        _limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .pages
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn subscribe_latest(
        &self,
        collection: &str,
        _limit: usize,
    ) -> Result<mpsc::Receiver<PageDelivery>, StoreError> {
        let (tx, rx) = mpsc::channel(DELIVERY_BUFFER);
        self.subscribers
            .lock()
            .await
            .insert(collection.to_string(), tx);
        Ok(rx)
    }
}

/// Keyed store where every operation fails.
pub struct FailingKeyedStore;

#[async_trait]
impl KeyedStore for FailingKeyedStore {
    async fn read(&self, _path: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }

    async fn write(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }

    async fn subscribe(&self, _path: &str) -> Result<mpsc::Receiver<ScalarDelivery>, StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }
}

/// Document store where every operation fails.
pub struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn fetch_latest(
        &self,
        _collection: &str,
        _limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }

    async fn subscribe_latest(
        &self,
        _collection: &str,
        _limit: usize,
    ) -> Result<mpsc::Receiver<PageDelivery>, StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }
}

/// Profile source answering immediately with a fixed profile.
pub struct StaticProfiles(pub PlantProfile);

#[async_trait]
impl ProfileSource for StaticProfiles {
    async fn plant_profile(&self) -> Result<PlantProfile, StoreError> {
        Ok(self.0.clone())
    }
}

/// Profile source that always fails.
pub struct FailingProfiles;

#[async_trait]
impl ProfileSource for FailingProfiles {
    async fn plant_profile(&self) -> Result<PlantProfile, StoreError> {
        Err(StoreError::Connect("unreachable".into()))
    }
}

/// Profile source that blocks until the test releases a profile, for
/// resolve-after-teardown scenarios.
pub struct GatedProfiles {
    rx: watch::Receiver<Option<PlantProfile>>,
}

pub fn gated_profiles() -> (watch::Sender<Option<PlantProfile>>, GatedProfiles) {
    let (tx, rx) = watch::channel(None);
    (tx, GatedProfiles { rx })
}

#[async_trait]
impl ProfileSource for GatedProfiles {
    async fn plant_profile(&self) -> Result<PlantProfile, StoreError> {
        let mut rx = self.rx.clone();
        loop {
            if let Some(profile) = rx.borrow().clone() {
                return Ok(profile);
            }
            if rx.changed().await.is_err() {
                return Err(StoreError::Closed);
            }
        }
    }
}

/// Example plant used across tests.
pub fn dieffenbachia() -> PlantProfile {
    PlantProfile {
        name: "Dieffenbachia".into(),
        scientific_name: "Dieffenbachia seguine".into(),
        description: "Tropical ornamental with variegated leaves".into(),
    }
}

/// Fan telemetry document in the wrapper-typed encoding.
pub fn rpm_doc(timestamp: &str, rpm: i64) -> Value {
    json!({
        "rpm1": {"integerValue": rpm.to_string()},
        "rpm2": {"integerValue": (rpm + 10).to_string()},
        "rpm3": {"integerValue": (rpm + 20).to_string()},
        "rpm4": {"integerValue": (rpm + 30).to_string()},
        "timestamp": {"stringValue": timestamp},
    })
}

/// Light telemetry document in the plain encoding.
pub fn lux_doc(timestamp: &str, lux: i64) -> Value {
    json!({"lightIntensity": lux, "timestamp": timestamp})
}

/// Poll the model until `predicate` holds, panicking after two seconds.
pub async fn wait_for<F>(model: &LiveModel, predicate: F) -> DashboardState
where
    F: Fn(&DashboardState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = model.snapshot().await;
            if predicate(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached within 2s")
}

/// Let in-flight deliveries settle when there is nothing to wait for.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Arc helper so tests read less noisily.
pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
