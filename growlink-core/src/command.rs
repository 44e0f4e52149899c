//! Actuator Setpoint Writer
//!
//! Operator input flows one way: a command is validated, written to the
//! keyed store, and forgotten. There is no optimistic local update, no
//! retry, and no rollback; the dashboard's own subscriptions will reflect
//! the new setpoint once the store echoes it back. A failed write surfaces
//! exactly once to the caller as a [`CommandError`].

use std::sync::Arc;

use log::info;
use serde_json::json;

use crate::errors::CommandError;
use crate::paths;
use crate::store::KeyedStore;

/// Fan duty cycle upper bound, percent.
pub const FAN_DUTY_MAX: i64 = 100;
/// Light PWM upper bound, 8-bit.
pub const LIGHT_PWM_MAX: i64 = 255;

/// Whether the actuator follows its controller or the operator's setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Follow the on-device controller
    Auto,
    /// Hold the operator's setpoint
    Manual,
}

impl ControlMode {
    fn as_flag(self) -> bool {
        matches!(self, ControlMode::Auto)
    }
}

/// One write-only operator command, addressed to an actuator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Ventilation fans: duty cycle 0-100 %
    Fan { mode: ControlMode, duty: i64 },
    /// Grow light: PWM level 0-255
    Light { mode: ControlMode, pwm: i64 },
}

impl ActuatorCommand {
    /// Fan command with the given duty cycle (0-100 %).
    pub fn fan(mode: ControlMode, duty: i64) -> Self {
        ActuatorCommand::Fan { mode, duty }
    }

    /// Light command with the given PWM level (0-255).
    pub fn light(mode: ControlMode, pwm: i64) -> Self {
        ActuatorCommand::Light { mode, pwm }
    }

    fn validate(&self) -> Result<(), CommandError> {
        let (actuator, value, max) = match *self {
            ActuatorCommand::Fan { duty, .. } => ("fan duty", duty, FAN_DUTY_MAX),
            ActuatorCommand::Light { pwm, .. } => ("light pwm", pwm, LIGHT_PWM_MAX),
        };
        if value < 0 || value > max {
            return Err(CommandError::OutOfRange {
                actuator,
                value,
                min: 0,
                max,
            });
        }
        Ok(())
    }

    fn mode(&self) -> ControlMode {
        match *self {
            ActuatorCommand::Fan { mode, .. } => mode,
            ActuatorCommand::Light { mode, .. } => mode,
        }
    }

    fn group(&self) -> &'static str {
        match self {
            ActuatorCommand::Fan { .. } => paths::FAN_CONTROL,
            ActuatorCommand::Light { .. } => paths::LIGHT_CONTROL,
        }
    }

    fn level_field(&self) -> &'static str {
        match self {
            ActuatorCommand::Fan { .. } => "duty",
            ActuatorCommand::Light { .. } => "pwm",
        }
    }

    fn level(&self) -> i64 {
        match *self {
            ActuatorCommand::Fan { duty, .. } => duty,
            ActuatorCommand::Light { pwm, .. } => pwm,
        }
    }
}

/// Fire-and-forget writer for operator setpoints.
pub struct CommandWriter {
    keyed: Arc<dyn KeyedStore>,
}

impl CommandWriter {
    /// Writer over an explicit keyed-store handle.
    pub fn new(keyed: Arc<dyn KeyedStore>) -> Self {
        Self { keyed }
    }

    /// Validate and write one command.
    ///
    /// The mode flag is written before the level so an observer never sees a
    /// fresh setpoint under a stale mode.
    pub async fn send(&self, command: ActuatorCommand) -> Result<(), CommandError> {
        command.validate()?;

        let group = command.group();
        self.keyed
            .write(
                &format!("{group}/autoControl"),
                json!(command.mode().as_flag()),
            )
            .await?;
        self.keyed
            .write(
                &format!("{group}/{}", command.level_field()),
                json!(command.level()),
            )
            .await?;

        info!(
            "actuator command written: {group} {}={}",
            command.level_field(),
            command.level()
        );
        Ok(())
    }
}
