//! Error types.
//!
//! Device errors are produced by the adapter backends and almost never leave the control
//! loops: a missing snapshot is an empty snapshot, a missing joystick is a centered
//! joystick. Command errors are produced by the authority gate.

use snafu::Snafu;

use crate::competition::Mode;

/// An error reported by a hardware adapter.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum DeviceError {
    /// The device is not plugged in (or not responding on its port).
    #[snafu(display("{device} is disconnected"))]
    Disconnected { device: &'static str },

    /// The device is busy and refused the request.
    #[snafu(display("{device} is busy"))]
    Busy { device: &'static str },

    /// The device reported a fault.
    #[snafu(display("{device} fault: {message}"))]
    Hardware {
        device:  &'static str,
        message: String,
    },
}

/// An actuator command that was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    /// The issuing loop does not hold actuator authority in the current mode.
    #[snafu(display("{owner} loop has no authority while in {current}"))]
    NotAuthorized { owner: Mode, current: Mode },
}

/// A [`RobotConfig`](crate::config::RobotConfig) that violates an invariant.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// The joystick deadzone must not be negative.
    #[snafu(display("deadzone must be non-negative, got {deadzone}"))]
    NegativeDeadzone { deadzone: f64 },

    /// A loop period or poll interval is zero.
    #[snafu(display("{which} must be longer than zero"))]
    ZeroPeriod { which: &'static str },

    /// The grab envelope cannot match anything inside the vision frame.
    #[snafu(display("invalid grab envelope: {reason}"))]
    InvalidEnvelope { reason: &'static str },

    /// A percentage outside of 0..=100.
    #[snafu(display("{which} must be within 0..=100 percent, got {value}"))]
    InvalidPercent { which: &'static str, value: f64 },
}
