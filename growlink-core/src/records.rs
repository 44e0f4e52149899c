//! Application Record Types for Growth Chamber Data
//!
//! ## Overview
//!
//! Everything the dashboard renders is one of the fixed-shape records in this
//! module. The remote stores deliver loosely-shaped JSON (bare primitives or
//! wrapper-typed fields, see [`crate::decode`]); the decode boundary converts
//! those into these records, and nothing downstream ever touches raw JSON.
//!
//! ## Design notes
//!
//! - All records are plain owned values with `Clone`. The view-model hands
//!   out whole-state clones rather than references into its locked state, so
//!   renderers never hold a lock across a frame.
//! - History point `time` fields are *display strings* (`HH:MM` or
//!   `HH:MM:SS`). Chronological order comes from server query order, not
//!   from parsing these strings, so they are deliberately not a timestamp
//!   type.

use serde::{Deserialize, Serialize};

/// Current scalar sensor readings, one field per tracked metric.
///
/// Fields are updated independently by their own subscriptions; a snapshot
/// is *eventually* coherent, never transactionally so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    /// Air temperature in °C
    pub temperature: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Relative air humidity in %
    pub air_humidity: f64,
    /// Soil moisture in %
    pub soil_moisture: f64,
    /// Water tank fill level, 0-100 %
    pub water_tank_level: f64,
    /// Light intensity in lux
    pub light_intensity: i64,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            wind_speed: 0.0,
            air_humidity: 0.0,
            soil_moisture: 0.0,
            water_tank_level: 0.0,
            light_intensity: 0,
        }
    }
}

/// One time-labeled fan RPM sample (four named fans).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmPoint {
    /// Display time label, `HH:MM`
    pub time: String,
    /// Fan 1 speed in RPM
    pub fan1: i64,
    /// Fan 2 speed in RPM
    pub fan2: i64,
    /// Fan 3 speed in RPM
    pub fan3: i64,
    /// Fan 4 speed in RPM
    pub fan4: i64,
}

/// One time-labeled light intensity sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuxPoint {
    /// Display time label, `HH:MM`
    pub time: String,
    /// Light intensity in lux
    pub lux: i64,
}

/// One time-labeled soil moisture sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilMoisturePoint {
    /// Display time label, `HH:MM`
    pub time: String,
    /// Soil moisture in %
    pub soil_moisture: f64,
}

/// One time-labeled vapor pressure deficit sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpdPoint {
    /// Display time label, `HH:MM`
    pub time: String,
    /// VPD in kPa
    pub vpd: f64,
}

/// Static descriptive record for the plant under cultivation.
///
/// Fetched once at startup and on explicit refresh; a failed refresh keeps
/// the previous value (stale-but-valid beats an error state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantProfile {
    /// Common name
    pub name: String,
    /// Botanical name
    pub scientific_name: String,
    /// Short free-text description
    pub description: String,
}

impl Default for PlantProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            scientific_name: String::new(),
            description: String::new(),
        }
    }
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The operator asking questions
    User,
    /// The chamber assistant
    Assistant,
}

impl ChatRole {
    /// Label used when a turn is serialized into the prompt.
    pub const fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Windy",
        }
    }
}

/// One conversation turn, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who spoke
    pub role: ChatRole,
    /// What they said, verbatim
    pub content: String,
}

impl ChatTurn {
    /// A turn spoken by the operator.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// A turn spoken by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
