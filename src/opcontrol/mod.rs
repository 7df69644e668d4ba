//! Operator control for the driver control period.
//!
//! The robot drives tank style: the left stick's vertical axis drives the left side and
//! the right stick's vertical axis drives the right side. Each side goes through its own
//! [`AxisLatch`](deadzone::AxisLatch) so a resting stick stops its side exactly once.
//!
//! # Example
//!
//! ```ignore
//! use seeker::opcontrol::controller::TeleopLoop;
//!
//! let teleop = TeleopLoop::new(&config, controller, imu.clone(), actuators.clone(), mode.clone());
//! vexide::task::spawn(teleop.run()).detach();
//! ```

/// The joystick loop.
///
/// Provides [`TeleopLoop`](controller::TeleopLoop), which reads the sticks every cycle
/// and drives the sides through the authority gate.
pub mod controller;

/// The per-side deadzone state machine.
pub mod deadzone;
