//! Robot assembly.
//!
//! Wires the devices and the configuration into the competition hooks and both control
//! loops. The actuators and the screen are shared; the vision sensor belongs to the
//! autonomous loop and the controller to the joystick loop.
//!
//! # Example
//!
//! ```ignore
//! use seeker::{config::RobotConfig, robot::{Devices, Robot}};
//!
//! let robot = Robot::new(RobotConfig::default(), Devices {
//!     vision,
//!     imu,
//!     joystick,
//!     actuators,
//!     display,
//! })?;
//! robot.calibrate().await;
//! ```

use std::sync::Arc;

use log::info;

use crate::{
    auton::AutonomousLoop,
    competition::Competition,
    config::RobotConfig,
    display::StatusDisplay,
    error::ConfigError,
    opcontrol::controller::TeleopLoop,
    peripherals::{Actuators, Imu, Joystick, VisionSensor, imu::calibrate_inertial},
    rt::Mutex,
    to_mutex,
};

/// The robot's devices, before they are shared between tasks.
pub struct Devices<V, I, J, A, D> {
    pub vision:    V,
    pub imu:       I,
    pub joystick:  J,
    pub actuators: A,
    pub display:   D,
}

/// The assembled robot.
pub struct Robot<V, I, J, A, D> {
    pub competition: Competition<A, D>,
    pub autonomous:  AutonomousLoop<V, A, D>,
    pub teleop:      TeleopLoop<J, I, A>,
    pub imu:         Arc<Mutex<I>>,
    pub display:     Arc<Mutex<D>>,
    config:          RobotConfig,
}

impl<V, I, J, A, D> Robot<V, I, J, A, D>
where
    V: VisionSensor,
    I: Imu,
    J: Joystick,
    A: Actuators,
    D: StatusDisplay,
{
    /// Validates `config` and builds the robot. The robot starts in
    /// [`Mode::Disabled`](crate::competition::Mode::Disabled).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is invalid.
    pub fn new(config: RobotConfig, devices: Devices<V, I, J, A, D>) -> Result<Self, ConfigError> {
        config.validate()?;

        let actuators = to_mutex(devices.actuators);
        let display = to_mutex(devices.display);
        let imu = to_mutex(devices.imu);

        let competition = Competition::new(actuators.clone(), display.clone());
        let autonomous = AutonomousLoop::new(
            &config,
            devices.vision,
            actuators.clone(),
            competition.mode(),
            display.clone(),
        );
        let teleop = TeleopLoop::new(
            &config,
            devices.joystick,
            imu.clone(),
            actuators,
            competition.mode(),
        );

        info!("Robot assembled for team {}", config.team);
        Ok(Self {
            competition,
            autonomous,
            teleop,
            imu,
            display,
            config,
        })
    }

    /// Calibrates the inertial sensor and shows the startup screen.
    ///
    /// Blocks until the calibration has finished. Run once at startup, before the control
    /// loops are spawned.
    pub async fn calibrate(&self) {
        {
            let mut display = self.display.lock().await;
            display.print("Calibrating");
            display.print("Inertial");
        }

        calibrate_inertial(&self.imu, self.config.calibration_poll).await;

        let mut display = self.display.lock().await;
        display.clear();
        display.print("Starting...");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        competition::Mode,
        peripherals::sim::{SimDisplay, SimDrivetrain, SimImu, SimJoystick, SimVision},
        rt::Instant,
    };

    type SimRobot = Robot<SimVision, SimImu, SimJoystick, SimDrivetrain, SimDisplay>;

    fn devices() -> Devices<SimVision, SimImu, SimJoystick, SimDrivetrain, SimDisplay> {
        Devices {
            vision:    SimVision::new(),
            imu:       SimImu::new(Duration::from_millis(250)),
            joystick:  SimJoystick::new(),
            actuators: SimDrivetrain::new(),
            display:   SimDisplay::default(),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RobotConfig {
            deadzone: -5.0,
            ..RobotConfig::default()
        };
        assert!(SimRobot::new(config, devices()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn starts_disabled_and_calibrates() {
        let robot = SimRobot::new(RobotConfig::default(), devices()).unwrap();
        assert_eq!(robot.competition.mode().current(), Mode::Disabled);

        let started = Instant::now();
        robot.calibrate().await;

        assert!(started.elapsed() >= Duration::from_millis(250));
        let display = robot.display.lock().await;
        assert_eq!(display.lines, ["Starting..."]);
        assert_eq!(display.clears, 1);
    }
}
