//! Simulated devices.
//!
//! These stand in for the V5 hardware on host builds: the simulated practice match in
//! `main.rs` and the test suite both run the real control loops against them. Time comes
//! from [`rt::Instant`](crate::rt::Instant), so tests with paused tokio time are
//! deterministic.

use std::{collections::VecDeque, time::Duration};

use super::{
    Actuators, Imu, IntakeCommand, Joystick, Side, Sides, SpinDirection, TurnDirection,
    VisionSensor, vision::Snapshot,
};
use crate::{
    display::StatusDisplay,
    error::{DeviceError, DisconnectedSnafu},
    peripherals::vision::DetectedObject,
    rt::Instant,
};

/// A command received by [`SimDrivetrain`], in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorEvent {
    DriveForward,
    StopDrive,
    Turn {
        direction: TurnDirection,
        degrees:   f64,
    },
    SideVelocity {
        side:    Side,
        percent: f64,
    },
    Spin {
        side:      Side,
        direction: SpinDirection,
    },
    StopSide(Side),
    Intake(IntakeCommand),
}

impl ActuatorEvent {
    /// Returns `true` for the per-side commands only the joystick loop sends.
    pub const fn is_side_command(&self) -> bool {
        matches!(
            self,
            ActuatorEvent::SideVelocity { .. } | ActuatorEvent::Spin { .. } | ActuatorEvent::StopSide(_)
        )
    }
}

struct TurnProgress {
    started:  Instant,
    /// `None` when the drivetrain cannot turn at all.
    duration: Option<Duration>,
}

/// A drivetrain and intake that record every command and turn at a fixed rate.
pub struct SimDrivetrain {
    events:         Vec<ActuatorEvent>,
    velocity:       Sides<f64>,
    output:         Sides<f64>,
    intake:         IntakeCommand,
    drive_velocity: f64,
    turn_rate:      f64,
    turn:           Option<TurnProgress>,
    connected:      bool,
}

impl Default for SimDrivetrain {
    fn default() -> Self { Self::new() }
}

impl SimDrivetrain {
    /// Drives at 50% and turns at 360 degrees per second.
    pub fn new() -> Self {
        Self {
            events:         Vec::new(),
            velocity:       Sides::splat(0.0),
            output:         Sides::splat(0.0),
            intake:         IntakeCommand::Stop,
            drive_velocity: 50.0,
            turn_rate:      360.0,
            turn:           None,
            connected:      true,
        }
    }

    /// Sets the turn rate in degrees per second. A rate of zero never finishes a turn.
    pub fn set_turn_rate(&mut self, degrees_per_second: f64) {
        self.turn_rate = degrees_per_second;
    }

    /// Sets the velocity of forward drives and turns, in percent.
    pub fn with_drive_velocity(mut self, percent: f64) -> Self {
        self.drive_velocity = percent;
        self
    }

    /// An unplugged drivetrain fails every command without recording it.
    pub fn set_connected(&mut self, connected: bool) { self.connected = connected; }

    fn check(&self) -> Result<(), DeviceError> {
        if !self.connected {
            return DisconnectedSnafu {
                device: "Drive Motor",
            }
            .fail();
        }
        Ok(())
    }

    pub fn events(&self) -> &[ActuatorEvent] { &self.events }

    pub fn take_events(&mut self) -> Vec<ActuatorEvent> { std::mem::take(&mut self.events) }

    /// The signed output of one side, in percent.
    pub fn output(&self, side: Side) -> f64 { self.output[side] }

    pub const fn intake_state(&self) -> IntakeCommand { self.intake }

    pub const fn is_turning(&self) -> bool { self.turn.is_some() }
}

impl Actuators for SimDrivetrain {
    fn drive_forward(&mut self) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::DriveForward);
        self.turn = None;
        self.output = Sides::splat(self.drive_velocity);
        Ok(())
    }

    fn stop_drive(&mut self) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::StopDrive);
        self.turn = None;
        self.output = Sides::splat(0.0);
        Ok(())
    }

    fn start_turn(&mut self, direction: TurnDirection, degrees: f64) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::Turn { direction, degrees });
        let duration = (self.turn_rate > 0.0)
            .then(|| Duration::from_secs_f64(degrees.abs() / self.turn_rate));
        self.turn = Some(TurnProgress {
            started: Instant::now(),
            duration,
        });
        self.output = match direction {
            TurnDirection::Right => Sides::new(self.drive_velocity, -self.drive_velocity),
            TurnDirection::Left => Sides::new(-self.drive_velocity, self.drive_velocity),
        };
        Ok(())
    }

    fn turn_finished(&mut self) -> Result<bool, DeviceError> {
        self.check()?;
        let Some(turn) = &self.turn else {
            return Ok(true);
        };
        let done = turn
            .duration
            .is_some_and(|duration| turn.started.elapsed() >= duration);
        if done {
            self.turn = None;
            self.output = Sides::splat(0.0);
        }
        Ok(done)
    }

    fn set_side_velocity(&mut self, side: Side, percent: f64) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::SideVelocity { side, percent });
        self.velocity[side] = percent;
        Ok(())
    }

    fn spin_side(&mut self, side: Side, direction: SpinDirection) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::Spin { side, direction });
        self.turn = None;
        self.output[side] = self.velocity[side] * direction.sign();
        Ok(())
    }

    fn stop_side(&mut self, side: Side) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::StopSide(side));
        self.output[side] = 0.0;
        Ok(())
    }

    fn intake(&mut self, command: IntakeCommand) -> Result<(), DeviceError> {
        self.check()?;
        self.events.push(ActuatorEvent::Intake(command));
        self.intake = command;
        Ok(())
    }
}

/// A vision sensor that plays back scripted snapshots.
///
/// Each read consumes the next scripted frame. Once the script runs out, the last frame is
/// repeated.
#[derive(Default)]
pub struct SimVision {
    frames:    VecDeque<Snapshot>,
    last:      Snapshot,
    connected: bool,
    reads:     usize,
}

impl SimVision {
    /// A connected sensor that sees nothing.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// A sensor that always sees `snapshot`.
    pub fn repeating(snapshot: Snapshot) -> Self {
        Self {
            last: snapshot,
            ..Self::new()
        }
    }

    /// A sensor that plays `frames` in order.
    pub fn scripted<I: IntoIterator<Item = Snapshot>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn set_connected(&mut self, connected: bool) { self.connected = connected; }

    /// Number of successful reads so far.
    pub const fn reads(&self) -> usize { self.reads }
}

impl VisionSensor for SimVision {
    fn objects(&mut self) -> Result<Snapshot, DeviceError> {
        if !self.connected {
            return DisconnectedSnafu {
                device: "AI Vision Sensor",
            }
            .fail();
        }
        if let Some(frame) = self.frames.pop_front() {
            self.last = frame;
        }
        self.reads += 1;
        Ok(self.last.clone())
    }
}

/// An inertial sensor whose calibration takes a fixed amount of time.
pub struct SimImu {
    calibration_time:  Duration,
    calibrating_until: Option<Instant>,
    connected:         bool,
}

impl SimImu {
    pub fn new(calibration_time: Duration) -> Self {
        Self {
            calibration_time,
            calibrating_until: None,
            connected: true,
        }
    }

    pub fn set_connected(&mut self, connected: bool) { self.connected = connected; }
}

impl Imu for SimImu {
    fn begin_calibration(&mut self) -> Result<(), DeviceError> {
        if !self.connected {
            return DisconnectedSnafu {
                device: "Inertial Sensor",
            }
            .fail();
        }
        self.calibrating_until = Some(Instant::now() + self.calibration_time);
        Ok(())
    }

    fn is_calibrating(&self) -> Result<bool, DeviceError> {
        if !self.connected {
            return DisconnectedSnafu {
                device: "Inertial Sensor",
            }
            .fail();
        }
        Ok(self
            .calibrating_until
            .is_some_and(|until| Instant::now() < until))
    }
}

/// A controller that plays back scripted stick positions.
///
/// Each read consumes the next sample. Once the script runs out, the last sample is held.
#[derive(Default)]
pub struct SimJoystick {
    samples:   VecDeque<Sides<f64>>,
    last:      Sides<f64>,
    connected: bool,
}

impl SimJoystick {
    /// A connected controller with both sticks at rest.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn scripted<I: IntoIterator<Item = Sides<f64>>>(samples: I) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn set_connected(&mut self, connected: bool) { self.connected = connected; }
}

impl Joystick for SimJoystick {
    fn axes(&mut self) -> Result<Sides<f64>, DeviceError> {
        if !self.connected {
            return DisconnectedSnafu {
                device: "Controller",
            }
            .fail();
        }
        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }
        Ok(self.last)
    }
}

/// A Brain screen that remembers what was shown on it.
#[derive(Debug, Default)]
pub struct SimDisplay {
    pub lines:     Vec<String>,
    pub indicator: Option<u32>,
    pub clears:    usize,
    /// Target of every rendered snapshot, in order.
    pub renders:   Vec<Option<DetectedObject>>,
}

impl StatusDisplay for SimDisplay {
    fn clear(&mut self) {
        self.clears += 1;
        self.lines.clear();
    }

    fn set_indicator(&mut self, argb: u32) { self.indicator = Some(argb); }

    fn print(&mut self, text: &str) { self.lines.push(text.to_owned()); }

    fn render(&mut self, _snapshot: &Snapshot, target: Option<&DetectedObject>) {
        self.renders.push(target.copied());
    }
}
