//! # Seeker
//!
//! Seeker is the control program for a vision-guided grabber robot built on top of
//! [Vexide](https://vexide.dev). The robot hunts blocks of its own team's color with an
//! AI Vision sensor during the autonomous period and hands the drivetrain to a tank-style
//! joystick loop during driver control.
//!
//! - **Targeting**: Picks the first block of the controlling team's color from each vision
//!   snapshot and turns towards it.
//! - **Grabbing**: A size/position envelope decides when a block is close enough for the
//!   intake to pull it in (or spit out a block of the wrong color).
//! - **Operator Control**: Tank drive with a per-side deadzone latch that stops a side
//!   exactly once when its stick returns to rest.
//! - **Competition Modes**: A mode cell owned by field control decides which loop may drive
//!   the shared actuators. Commands from the other loop are rejected at the actuator lock.
//! - **Logging**: A file-based logger for debugging and telemetry.
//!
//! ## Quick Start
//!
//! ```ignore
//! use seeker::{config::RobotConfig, robot::Robot};
//! use vexide::prelude::*;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let robot = Robot::new(RobotConfig::default(), devices(peripherals)).unwrap();
//!     robot.calibrate().await;
//!
//!     let Robot { competition, autonomous, teleop, .. } = robot;
//!     vexide::task::spawn(autonomous.run()).detach();
//!     vexide::task::spawn(teleop.run()).detach();
//!     competition.compete().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`peripherals`]: Adapter traits over the drivetrain, intake, vision sensor, IMU and
//!   controller, plus the V5 and simulated backends.
//! - [`motion`]: Target selection, bearing correction and the grab classifier.
//! - [`auton`]: The vision-driven autonomous loop.
//! - [`opcontrol`]: The joystick loop and its deadzone latch.
//! - [`competition`]: Competition modes and the mode entry hooks.
//! - [`robot`]: Wiring of all of the above into one robot.
//! - [`display`]: Brain screen status output.
//! - [`fs`]: Filesystem utilities including logging.

/// Vision-driven autonomous control.
///
/// Provides the [`AutonomousLoop`](auton::AutonomousLoop), which captures a snapshot every
/// cycle, turns towards the selected target and runs the intake.
pub mod auton;

/// Competition mode state machine.
///
/// Field control owns the [`Mode`](competition::Mode); the loops only read it. The
/// [`Competition`](competition::Competition) hooks publish a new mode under the actuator
/// lock so that the previous authority cannot write after a transition.
pub mod competition;

/// Robot configuration.
///
/// All tunable constants (team color, grab envelope, deadzone, loop periods) live in
/// [`RobotConfig`](config::RobotConfig).
pub mod config;

/// Brain screen status output.
///
/// The display is a sink only: mode banners, calibration messages and the per-object
/// telemetry of the autonomous loop.
pub mod display;

/// Error types shared across the crate.
pub mod error;

/// Filesystem utilities module.
///
/// Contains logging functionality for recording robot telemetry and debug
/// information to files on the V5 Brain's SD card.
pub mod fs;

/// Geometry and classification used by the autonomous loop.
///
/// - [`targeting`](motion::targeting): Target selection and bearing correction.
/// - [`grab`](motion::grab): The grab envelope predicate.
pub mod motion;

/// Operator control module.
///
/// Provides the [`TeleopLoop`](opcontrol::controller::TeleopLoop) and the per-side
/// [`AxisLatch`](opcontrol::deadzone::AxisLatch) deadzone state machine.
pub mod opcontrol;

/// Hardware adapters.
///
/// Defines the traits the control loops are written against and the authority-gated
/// actuator handle. Backends:
///
/// - `v5`: vexide devices (VEXos only).
/// - `sim`: simulated devices for host builds and tests.
pub mod peripherals;

/// Robot assembly.
pub mod robot;

/// Async runtime primitives for the current target.
pub mod rt;

use std::sync::Arc;

/// Wraps a value in an `Arc` and the target's async `Mutex` so it can be shared
/// between tasks.
pub fn to_mutex<T>(t: T) -> Arc<rt::Mutex<T>> { Arc::new(rt::Mutex::new(t)) }
