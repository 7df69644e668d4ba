//! Robot configuration.
//!
//! Every tunable constant of the robot in one place. The defaults are the values the robot
//! competes with. Nothing is read from storage: a configuration is built in code at
//! startup and checked once with [`RobotConfig::validate`].
//!
//! # Example
//!
//! ```ignore
//! use seeker::{config::RobotConfig, peripherals::vision::TeamColor};
//!
//! let config = RobotConfig {
//!     team: TeamColor::Blue,
//!     ..RobotConfig::default()
//! };
//! config.validate()?;
//! ```

use std::time::Duration;

use crate::{
    error::{ConfigError, InvalidPercentSnafu, NegativeDeadzoneSnafu, ZeroPeriodSnafu},
    motion::grab::GrabEnvelope,
    peripherals::{
        TurnDirection,
        drivetrain::{TURN_POLL, TURN_TIMEOUT},
        imu::CALIBRATION_POLL,
        vision::TeamColor,
    },
};

/// The search turn issued when no target is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleTurn {
    pub direction: TurnDirection,
    pub degrees:   f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotConfig {
    /// The color of the blocks this robot collects.
    pub team:             TeamColor,
    pub idle_turn:        IdleTurn,
    pub grab:             GrabEnvelope,
    /// Stick magnitudes strictly below this are treated as no input, in percent.
    pub deadzone:         f64,
    pub auton_period:     Duration,
    pub teleop_period:    Duration,
    pub calibration_poll: Duration,
    pub turn_poll:        Duration,
    /// Upper bound on a single turn before the drive is stopped.
    pub turn_timeout:     Duration,
    /// Velocity of [`drive_forward`](crate::peripherals::Actuators::drive_forward) and
    /// turns, in percent.
    pub drive_velocity:   f64,
    pub intake_velocity:  f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            team:             TeamColor::Red,
            idle_turn:        IdleTurn {
                direction: TurnDirection::Right,
                degrees:   8.0,
            },
            grab:             GrabEnvelope::default(),
            deadzone:         5.0,
            auton_period:     Duration::from_millis(50),
            teleop_period:    Duration::from_millis(20),
            calibration_poll: CALIBRATION_POLL,
            turn_poll:        TURN_POLL,
            turn_timeout:     TURN_TIMEOUT,
            drive_velocity:   50.0,
            intake_velocity:  50.0,
        }
    }
}

impl RobotConfig {
    /// Checks the configuration for values the control loops cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadzone.is_nan() || self.deadzone < 0.0 {
            return NegativeDeadzoneSnafu {
                deadzone: self.deadzone,
            }
            .fail();
        }

        for (which, period) in [
            ("autonomous period", self.auton_period),
            ("teleop period", self.teleop_period),
            ("calibration poll", self.calibration_poll),
            ("turn poll", self.turn_poll),
            ("turn timeout", self.turn_timeout),
        ] {
            if period.is_zero() {
                return ZeroPeriodSnafu { which }.fail();
            }
        }

        for (which, value) in [
            ("drive velocity", self.drive_velocity),
            ("intake velocity", self.intake_velocity),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return InvalidPercentSnafu { which, value }.fail();
            }
        }

        self.grab.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RobotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.team, TeamColor::Red);
        assert_eq!(config.grab, GrabEnvelope::new(35, 35, 145));
        assert_eq!(config.turn_poll, Duration::from_millis(10));
        assert_eq!(config.turn_timeout, Duration::from_secs(2));
        assert_eq!(config.calibration_poll, Duration::from_millis(25));
    }

    #[test]
    fn negative_deadzone_is_rejected() {
        let config = RobotConfig {
            deadzone: -1.0,
            ..RobotConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NegativeDeadzone {
            deadzone: -1.0,
        }));
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = RobotConfig {
            teleop_period: Duration::ZERO,
            ..RobotConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod {
            which: "teleop period",
        }));
    }

    #[test]
    fn velocity_over_full_is_rejected() {
        let config = RobotConfig {
            drive_velocity: 150.0,
            ..RobotConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPercent {
                which: "drive velocity",
                ..
            })
        ));
    }
}
