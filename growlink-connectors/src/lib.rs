//! Network Clients for the Growlink Data Layer
//!
//! ## Overview
//!
//! `growlink-core` defines *what* the dashboard needs from the outside world
//! (the `KeyedStore`, `DocumentStore`, `ProfileSource`, and `TextGenerator`
//! seams); this crate provides the HTTPS clients that actually speak to the
//! deployed services:
//!
//! | Client | Seam | Transport |
//! |--------|------|-----------|
//! | [`RtdbClient`] | `KeyedStore` | REST read/write + `text/event-stream` subscribe |
//! | [`FirestoreClient`] | `DocumentStore` | `runQuery` + interval polling |
//! | [`GeminiClient`] | `TextGenerator` | `generateContent` POST |
//! | [`SeedApi`] | `ProfileSource` | `{success, data}` envelope GETs |
//!
//! ## Wiring
//!
//! Clients are constructed explicitly and passed in as `Arc<dyn …>` handles;
//! there is no module-level singleton. Typical application startup:
//!
//! ```no_run
//! use std::sync::Arc;
//! use growlink_core::model::LiveModel;
//! use growlink_connectors::{
//!     FirestoreClient, FirestoreConfig, RtdbClient, RtdbConfig, SeedApi,
//! };
//!
//! # fn main() -> Result<(), growlink_core::StoreError> {
//! let keyed = Arc::new(RtdbClient::new(
//!     RtdbConfig::new("https://growbox-123-default-rtdb.firebasedatabase.app"),
//! )?);
//! let documents = Arc::new(FirestoreClient::new(FirestoreConfig::new("growbox-123"))?);
//! let profiles = Arc::new(SeedApi::new("http://localhost:5000")?);
//!
//! let model = LiveModel::new(keyed, documents, profiles);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error mapping
//!
//! Every client converts its transport failures into the core error
//! taxonomy at the seam: connection problems become `StoreError::Connect`
//! (setup) or `StoreError::Stream` (delivery), HTTP status failures carry
//! the status code, and body-shape problems become `StoreError::Decode`.
//! Nothing in this crate panics on remote input.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod firestore;
pub mod gemini;
pub mod rtdb;
pub mod seed;
pub mod sse;

// Re-export the client types
pub use firestore::{FirestoreClient, FirestoreConfig};
pub use gemini::{GeminiClient, GeminiConfig};
pub use rtdb::{RtdbClient, RtdbConfig};
pub use seed::SeedApi;
