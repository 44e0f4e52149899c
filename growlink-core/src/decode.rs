//! Decode Boundary for Raw Store Documents
//!
//! ## Overview
//!
//! Documents arriving from the document store (and scalar values from the
//! keyed store) are not uniformly shaped: the embedded producer writes some
//! fields through a typed-field encoding (`{"integerValue": "1200"}`,
//! `{"doubleValue": "3.5"}`, `{"stringValue": "..."}`), while other writers
//! store bare primitives, and numeric values occasionally arrive as strings.
//!
//! Every raw document passes through exactly one function in this module and
//! comes out either as a fixed-shape record from [`crate::records`] or as
//! `None`. Nothing downstream of this boundary handles raw JSON.
//!
//! ## Decode rules
//!
//! For each expected field:
//! 1. if the value is an object exposing the wrapper key for its type,
//!    decode the inner value;
//! 2. otherwise, if it is already a usable primitive, coerce it;
//! 3. otherwise default: `0` / `0.0` for numerics, `""` for strings,
//!    `false` for booleans.
//!
//! Malformed numeric strings also fall back to the default, so a zero never
//! proves that real data was present.
//!
//! All functions here are total: no panics, no errors, only skips.

use serde_json::Value;

use crate::records::{LuxPoint, RpmPoint, SoilMoisturePoint, VpdPoint};

/// A raw document: field name to loosely-typed value.
pub type RawDoc = serde_json::Map<String, Value>;

/// Wrapper key for integer-as-string fields
const WRAPPER_INTEGER: &str = "integerValue";
/// Wrapper key for float-as-string fields
const WRAPPER_DOUBLE: &str = "doubleValue";
/// Wrapper key for string fields
const WRAPPER_STRING: &str = "stringValue";

/// Strip one level of typed-field wrapping, if present.
///
/// `{"integerValue": "1200"}` becomes `"1200"`; anything else is returned
/// unchanged. Coercion to the target type happens in the callers below.
fn unwrap_typed(value: &Value) -> &Value {
    if let Value::Object(map) = value {
        for key in [WRAPPER_INTEGER, WRAPPER_DOUBLE, WRAPPER_STRING] {
            if let Some(inner) = map.get(key) {
                return inner;
            }
        }
    }
    value
}

/// Coerce a raw value to an integer. Defaults to `0`.
pub fn coerce_i64(value: &Value) -> i64 {
    match unwrap_typed(value) {
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .unwrap_or_else(|_| s.parse::<f64>().map_or(0, |f| f as i64))
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Coerce a raw value to a float. Defaults to `0.0`.
pub fn coerce_f64(value: &Value) -> f64 {
    match unwrap_typed(value) {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Coerce a raw value to a string. Defaults to `""`.
pub fn coerce_string(value: &Value) -> String {
    match unwrap_typed(value) {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce a raw value to a boolean. Defaults to `false`.
pub fn coerce_bool(value: &Value) -> bool {
    match unwrap_typed(value) {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1" | "on"),
        _ => false,
    }
}

/// Integer field of a document, `0` when missing or malformed.
pub fn integer_field(doc: &RawDoc, name: &str) -> i64 {
    doc.get(name).map_or(0, coerce_i64)
}

/// Float field of a document, `0.0` when missing or malformed.
pub fn number_field(doc: &RawDoc, name: &str) -> f64 {
    doc.get(name).map_or(0.0, coerce_f64)
}

/// String field of a document, `""` when missing or malformed.
pub fn string_field(doc: &RawDoc, name: &str) -> String {
    doc.get(name).map_or_else(String::new, coerce_string)
}

/// Timestamps arrive as `<date>_<HH>-<MM>-<SS>`. Keep only the time segment
/// with `:` separators, truncated to `HH:MM`.
///
/// A string without `_` passes through unchanged: it is treated as already
/// formatted (or of unknown origin), not as a validation failure. That makes
/// the function idempotent on its own output.
pub fn short_time(raw: &str) -> String {
    match raw.split_once('_') {
        Some((_, time)) if !time.is_empty() => {
            time.chars().take(5).collect::<String>().replace('-', ":")
        }
        _ => raw.to_string(),
    }
}

/// Like [`short_time`] but keeps seconds (`HH:MM:SS`).
pub fn full_time(raw: &str) -> String {
    match raw.split_once('_') {
        Some((_, time)) if !time.is_empty() => {
            time.chars().take(8).collect::<String>().replace('-', ":")
        }
        _ => raw.to_string(),
    }
}

/// Decode a fan telemetry document into an [`RpmPoint`].
pub fn rpm_point(raw: &Value) -> Option<RpmPoint> {
    let doc = raw.as_object()?;
    Some(RpmPoint {
        time: short_time(&string_field(doc, "timestamp")),
        fan1: integer_field(doc, "rpm1"),
        fan2: integer_field(doc, "rpm2"),
        fan3: integer_field(doc, "rpm3"),
        fan4: integer_field(doc, "rpm4"),
    })
}

/// Decode a light telemetry document into a [`LuxPoint`].
pub fn lux_point(raw: &Value) -> Option<LuxPoint> {
    let doc = raw.as_object()?;
    Some(LuxPoint {
        time: short_time(&string_field(doc, "timestamp")),
        lux: integer_field(doc, "lightIntensity"),
    })
}

/// Decode a soil telemetry document into a [`SoilMoisturePoint`].
pub fn soil_moisture_point(raw: &Value) -> Option<SoilMoisturePoint> {
    let doc = raw.as_object()?;
    Some(SoilMoisturePoint {
        time: short_time(&string_field(doc, "timestamp")),
        soil_moisture: number_field(doc, "soilMoisture"),
    })
}

/// Decode a climate telemetry document into a [`VpdPoint`].
pub fn vpd_point(raw: &Value) -> Option<VpdPoint> {
    let doc = raw.as_object()?;
    Some(VpdPoint {
        time: short_time(&string_field(doc, "timestamp")),
        vpd: number_field(doc, "vpd"),
    })
}
