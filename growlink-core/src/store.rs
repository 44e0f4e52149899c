//! Store Abstractions the View-Model and Assistant Depend On
//!
//! These traits are the only thing the core knows about the remote stores.
//! Concrete network clients live in `growlink-connectors`; tests use
//! in-memory fakes. Keeping the seams here (rather than reaching into a
//! shared client singleton) is what makes the view-model testable without a
//! network.
//!
//! Delivery model: `subscribe` methods establish the subscription before
//! returning, so setup failures surface as an `Err` return, while later
//! delivery failures travel in-band through the channel. One channel per
//! subscription; deliveries are FIFO within a channel and unordered across
//! channels.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::StoreError;
use crate::records::PlantProfile;

/// One delivery from a keyed-store subscription: the current value at the
/// path (`None` when the path is empty), or an in-stream error.
pub type ScalarDelivery = Result<Option<Value>, StoreError>;

/// One delivery from an ordered-query subscription: a complete result page,
/// newest-first, or an in-stream error. Pages are snapshots, never diffs.
pub type PageDelivery = Result<Vec<Value>, StoreError>;

/// Buffer depth for delivery channels. Subscriptions deliver at sensor
/// cadence (seconds apart), so a small buffer is plenty.
pub const DELIVERY_BUFFER: usize = 16;

/// A realtime, path-addressed key-value store with last-write-wins writes.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// One-shot read of the value at `path`. `None` means the path is empty.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Last-write-wins write to `path`.
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Subscribe to value changes at `path`. The initial value is delivered
    /// first, then every subsequent change. Dropping the receiver ends the
    /// subscription.
    async fn subscribe(&self, path: &str) -> Result<mpsc::Receiver<ScalarDelivery>, StoreError>;
}

/// A document store supporting ordered, limited queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot fetch of the `limit` most recent documents of `collection`,
    /// newest-first. Each element is one raw document (decode it with
    /// [`crate::decode`]).
    async fn fetch_latest(&self, collection: &str, limit: usize)
        -> Result<Vec<Value>, StoreError>;

    /// Subscribe to the `limit` most recent documents of `collection`. Every
    /// delivery is a complete page, newest-first. Dropping the receiver ends
    /// the subscription.
    async fn subscribe_latest(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<mpsc::Receiver<PageDelivery>, StoreError>;
}

/// Source of the static plant profile shown next to the sensor cards.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// One-shot fetch of the plant profile.
    async fn plant_profile(&self) -> Result<PlantProfile, StoreError>;
}
