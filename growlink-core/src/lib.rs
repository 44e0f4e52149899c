//! Core data layer for the Growlink growth chamber dashboard
//!
//! Owns the live view-model (realtime subscriptions folded into one shared
//! snapshot), the decode boundary for raw store documents, the actuator
//! command writer, and the chat assistant's prompt assembly.
//!
//! Network clients live in `growlink-connectors`; this crate only sees the
//! trait seams in [`store`] and [`assistant::TextGenerator`], so everything
//! here runs against in-memory fakes in tests.
//!
//! ```no_run
//! use std::sync::Arc;
//! use growlink_core::model::LiveModel;
//! # use growlink_core::store::{KeyedStore, DocumentStore, ProfileSource};
//! # async fn example(
//! #     keyed: Arc<dyn KeyedStore>,
//! #     documents: Arc<dyn DocumentStore>,
//! #     profiles: Arc<dyn ProfileSource>,
//! # ) {
//! let model = LiveModel::new(keyed, documents, profiles);
//! let disposer = model.start().await;
//!
//! let state = model.snapshot().await;
//! // render `state`...
//!
//! drop(disposer); // detaches every subscription
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assistant;
pub mod command;
pub mod decode;
pub mod errors;
pub mod history;
pub mod model;
pub mod paths;
pub mod records;
pub mod store;

// Public API
pub use assistant::{Assistant, GenerationConfig, TextGenerator};
pub use command::{ActuatorCommand, CommandWriter, ControlMode};
pub use errors::{AiError, CommandError, StoreError};
pub use history::BoundedHistory;
pub use model::{DashboardState, Disposer, LiveModel};
pub use records::{ChatRole, ChatTurn, PlantProfile, SensorSnapshot};
pub use store::{DocumentStore, KeyedStore, ProfileSource};

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
