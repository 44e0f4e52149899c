//! Store Paths, Collections, and Stream Limits
//!
//! The deployment addresses its data by producer group. Group identifiers
//! are opaque path segments chosen by the hardware teams (including the
//! literal `&` in `group6&35`) and must never be parsed beyond segment
//! boundaries.

/// Environmental sensor group (soil, water, pump)
pub const GROUP_SOIL: &str = "group12";
/// Light control and monitoring group
pub const GROUP_LIGHT: &str = "group3";
/// Fan and ventilation group
pub const GROUP_FAN: &str = "group30";
/// Climate sensor group (temperature, humidity, VPD, heater)
pub const GROUP_CLIMATE: &str = "group6&35";

/// Current-status subtree of a group in the keyed store.
pub fn status_group(group: &str) -> String {
    format!("status/{group}")
}

/// Air temperature scalar, °C
pub const PATH_TEMPERATURE: &str = "status/group6&35/temperature";
/// Wind speed scalar, m/s
pub const PATH_WIND_SPEED: &str = "status/group30/windSpeed";
/// Light intensity scalar, lux
pub const PATH_LIGHT_INTENSITY: &str = "status/group3/lux";
/// Relative air humidity scalar, %
pub const PATH_AIR_HUMIDITY: &str = "status/group6&35/humidity";
/// Soil moisture scalar, %
pub const PATH_SOIL_MOISTURE: &str = "status/group12/soilMoisture";
/// Water tank fill level scalar, %
pub const PATH_WATER_TANK: &str = "status/group12/waterTank";

/// Irrigation pump running flag
pub const PATH_PUMP: &str = "status/group12/pump";
/// Heater running flag
pub const PATH_HEATER: &str = "status/group6&35/heater";
/// Grow light on-time today, display form
pub const PATH_LIGHT_DURATION: &str = "status/group3/lightDuration";
/// Free-text soil condition summary
pub const PATH_SOIL_STATUS: &str = "status/group12/soilStatus";
/// Vapor pressure deficit, display form (kPa)
pub const PATH_VPD: &str = "status/group6&35/vpd";

/// Fan actuator setpoint subtree (`autoControl`, `duty`)
pub const FAN_CONTROL: &str = "control/group30";
/// Light actuator setpoint subtree (`autoControl`, `pwm`)
pub const LIGHT_CONTROL: &str = "control/group3";

/// Fan RPM telemetry collection
pub const RPM_COLLECTION: &str = "growthChamber/group30/sensorData";
/// Light intensity telemetry collection
pub const LUX_COLLECTION: &str = "growthChamber/group3/sensorData";
/// Soil moisture telemetry collection
pub const SOIL_COLLECTION: &str = "growthChamber/group12/sensorData";
/// Climate (VPD) telemetry collection
pub const VPD_COLLECTION: &str = "growthChamber/group6&35/sensorData";

/// Fan RPM chart window
pub const RPM_HISTORY_LIMIT: usize = 10;
/// Light intensity chart window
pub const LUX_HISTORY_LIMIT: usize = 10;
/// Soil moisture chart window; slower-moving, so a wider window
pub const SOIL_HISTORY_LIMIT: usize = 20;
/// VPD chart window; slower-moving, so a wider window
pub const VPD_HISTORY_LIMIT: usize = 20;

/// Documents per history collection fetched for assistant context.
pub const CONTEXT_HISTORY_LIMIT: usize = 15;

/// Conversation turns forwarded to the assistant, most recent first kept.
pub const CONTEXT_TURN_LIMIT: usize = 5;
