//! The joystick loop.
//!
//! Runs on its own cadence, independent of the autonomous loop, and only drives while the
//! robot is in driver control. Each cycle:
//!
//! 1. If the inertial sensor is calibrating, stop both sides and wait for it to finish.
//! 2. Read both stick axes.
//! 3. Feed each axis through its side's deadzone latch and apply the result.
//!
//! Every command goes through a [`Gated`] handle owned by [`Mode::DriverControl`]. A cycle
//! that was already running when field control switched to autonomous is rejected at
//! the actuator lock.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};

use super::deadzone::{AxisCommand, AxisLatch};
use crate::{
    competition::{Mode, ModeHandle},
    config::RobotConfig,
    error::CommandError,
    peripherals::{
        Actuators, Imu, Joystick, Side, Sides, SpinDirection, drivetrain::Gated,
        imu::{is_calibrating, wait_for_calibration},
    },
    rt::{Instant, Mutex, sleep},
};

/// The teleop control loop.
pub struct TeleopLoop<J, I, A> {
    joystick:         J,
    imu:              Arc<Mutex<I>>,
    drive:            Gated<A>,
    latches:          Sides<AxisLatch>,
    deadzone:         f64,
    period:           Duration,
    calibration_poll: Duration,
}

impl<J: Joystick, I: Imu, A: Actuators> TeleopLoop<J, I, A> {
    /// Creates the loop. It only drives while `mode` is [`Mode::DriverControl`].
    pub fn new(
        config: &RobotConfig,
        joystick: J,
        imu: Arc<Mutex<I>>,
        actuators: Arc<Mutex<A>>,
        mode: ModeHandle,
    ) -> Self {
        Self {
            joystick,
            imu,
            drive: Gated::new(actuators, mode, Mode::DriverControl),
            latches: Sides::default(),
            deadzone: config.deadzone,
            period: config.teleop_period,
            calibration_poll: config.calibration_poll,
        }
    }

    /// The latch state of both sides.
    pub const fn latches(&self) -> Sides<AxisLatch> { self.latches }

    async fn apply(&self, side: Side, command: AxisCommand) -> Result<(), CommandError> {
        match command {
            AxisCommand::Stop => self.drive.stop_side(side).await,
            AxisCommand::Hold => Ok(()),
            AxisCommand::Drive(percent) => {
                self.drive.set_side_velocity(side, percent).await?;
                self.drive.spin_side(side, SpinDirection::Forward).await
            }
        }
    }

    /// Runs one joystick cycle and returns the command applied to each side.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotAuthorized`] when the robot is not in driver control.
    pub async fn cycle(&mut self) -> Result<Sides<AxisCommand>, CommandError> {
        if is_calibrating(&self.imu).await {
            for side in Side::BOTH {
                self.drive.stop_side(side).await?;
            }
            debug!("Drivetrain held while the inertial sensor calibrates");
            wait_for_calibration(&self.imu, self.calibration_poll).await;
        }

        let axes = self.joystick.axes().unwrap_or_else(|e| {
            warn!("Controller State Error: {}", e);
            Sides::splat(0.0)
        });

        let left = self.latches.left.update(axes.left, self.deadzone);
        let right = self.latches.right.update(axes.right, self.deadzone);
        self.apply(Side::Left, left).await?;
        self.apply(Side::Right, right).await?;
        Ok(Sides::new(left, right))
    }

    /// Runs one cycle if the robot is in driver control.
    ///
    /// Outside of driver control the latches are reset, so the first resting cycle after
    /// driver control starts again sends a stop.
    pub async fn tick(&mut self) -> Option<Sides<AxisCommand>> {
        if !self.drive.is_authoritative() {
            self.latches = Sides::default();
            return None;
        }
        match self.cycle().await {
            Ok(commands) => Some(commands),
            Err(e) => {
                debug!("Teleop cycle rejected: {}", e);
                self.latches = Sides::default();
                None
            }
        }
    }

    /// Runs the loop for `duration`. Returns the number of completed cycles.
    pub async fn run_for(&mut self, duration: Duration) -> usize {
        let started = Instant::now();
        let mut cycles = 0;
        while started.elapsed() < duration {
            if self.tick().await.is_some() {
                cycles += 1;
            }
            sleep(self.period).await;
        }
        cycles
    }

    /// Runs the loop until power-down.
    pub async fn run(mut self) {
        info!("Teleop Loop Started");
        loop {
            self.tick().await;
            sleep(self.period).await;
        }
    }
}
