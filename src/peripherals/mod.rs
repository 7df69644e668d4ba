//! Hardware adapters.
//!
//! The control loops never touch a device directly. They are written against the small
//! traits in this module, which are implemented twice:
//!
//! - [`v5`] wraps vexide devices and only builds for VEXos.
//! - [`sim`] simulates the robot for host builds and the test suite.
//!
//! # Shared Actuators
//!
//! The drivetrain and intake are shared between the autonomous loop and the joystick loop.
//! They live in one `Arc<Mutex<A: Actuators>>` and are only reached through a
//! [`Gated`](drivetrain::Gated) handle, which checks the competition mode under the
//! actuator lock before every command.
//!
//! # Example
//!
//! ```ignore
//! use seeker::{competition::Mode, peripherals::drivetrain::Gated, to_mutex};
//!
//! let actuators = to_mutex(drivetrain);
//! let driver = Gated::new(actuators.clone(), mode.clone(), Mode::DriverControl);
//! driver.set_side_velocity(Side::Left, 50.0).await?;
//! ```

use core::ops::{Index, IndexMut};

use crate::error::DeviceError;

/// Authority-gated access to the shared actuators.
pub mod drivetrain;

/// Inertial sensor helpers (startup calibration, calibration polling).
pub mod imu;

/// Vision snapshot types and the snapshot adapter.
pub mod vision;

/// Simulated devices for host builds.
#[cfg(not(target_os = "vexos"))]
pub mod sim;

/// vexide-backed devices.
#[cfg(target_os = "vexos")]
pub mod v5;

use vision::Snapshot;

/// One side of a differential drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub const fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A value kept per drivetrain side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides<T> {
    pub left:  T,
    pub right: T,
}

impl<T> Sides<T> {
    pub const fn new(left: T, right: T) -> Self { Self { left, right } }
}

impl<T: Clone> Sides<T> {
    /// The same value on both sides.
    pub fn splat(value: T) -> Self {
        Self {
            left:  value.clone(),
            right: value,
        }
    }
}

impl<T> Index<Side> for Sides<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Side> for Sides<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Direction of a point turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Direction a motor spins in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Forward,
    Reverse,
}

impl SpinDirection {
    /// `1.0` for forward, `-1.0` for reverse.
    pub const fn sign(self) -> f64 {
        match self {
            SpinDirection::Forward => 1.0,
            SpinDirection::Reverse => -1.0,
        }
    }
}

/// What the intake roller should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeCommand {
    /// Pull a block in.
    Forward,
    /// Push a block out.
    Reverse,
    #[default]
    Stop,
}

/// Drive and intake motors.
///
/// Every command is idempotent: sending the same command twice has the same effect as
/// sending it once. Commands only queue a motor target and return immediately. A turn is
/// split into [`start_turn`](Actuators::start_turn) and
/// [`turn_finished`](Actuators::turn_finished) so the caller decides how to wait for it.
pub trait Actuators {
    /// Drives both sides forward at the configured drive velocity.
    fn drive_forward(&mut self) -> Result<(), DeviceError>;

    /// Stops both sides of the drivetrain.
    fn stop_drive(&mut self) -> Result<(), DeviceError>;

    /// Starts a point turn of `degrees` (always positive) in `direction`.
    fn start_turn(&mut self, direction: TurnDirection, degrees: f64) -> Result<(), DeviceError>;

    /// Returns `true` once the last started turn is mechanically complete.
    ///
    /// Returns `true` when no turn was ever started.
    fn turn_finished(&mut self) -> Result<bool, DeviceError>;

    /// Sets the velocity used by the next [`spin_side`](Actuators::spin_side), in percent.
    fn set_side_velocity(&mut self, side: Side, percent: f64) -> Result<(), DeviceError>;

    /// Spins one side at its set velocity.
    fn spin_side(&mut self, side: Side, direction: SpinDirection) -> Result<(), DeviceError>;

    /// Stops one side.
    fn stop_side(&mut self, side: Side) -> Result<(), DeviceError>;

    /// Runs the intake roller.
    fn intake(&mut self, command: IntakeCommand) -> Result<(), DeviceError>;
}

/// A camera that reports the objects it currently sees.
pub trait VisionSensor {
    /// Reads every object visible right now, in sensor order.
    fn objects(&mut self) -> Result<Snapshot, DeviceError>;
}

/// The inertial sensor, only used for its calibration status.
pub trait Imu {
    /// Starts a calibration. Progress is reported by [`is_calibrating`](Imu::is_calibrating).
    fn begin_calibration(&mut self) -> Result<(), DeviceError>;

    fn is_calibrating(&self) -> Result<bool, DeviceError>;
}

/// The operator's controller.
pub trait Joystick {
    /// Reads the tank-drive axes in percent (-100 to 100): axis 3 on the left and axis 2 on
    /// the right.
    fn axes(&mut self) -> Result<Sides<f64>, DeviceError>;
}
