//! Authority-gated drivetrain and intake commands.
//!
//! Both control loops share one set of actuators. Each loop gets its own [`Gated`] handle
//! bound to the [`Mode`] in which it is allowed to drive. Every command takes the actuator
//! lock, checks the current mode and only then reaches the hardware, and the competition
//! hooks publish a new mode under that same lock. Once a mode transition has finished, no
//! command from the previous owner can be applied.
//!
//! # Example
//!
//! ```ignore
//! use seeker::peripherals::{drivetrain::Gated, TurnDirection};
//!
//! let auton = Gated::new(actuators.clone(), mode.clone(), Mode::Autonomous);
//! auton.turn(TurnDirection::Right, 8.0).await?;
//! auton.drive_forward().await?;
//! ```

use std::{sync::Arc, time::Duration};

use log::{debug, warn};

use super::{Actuators, IntakeCommand, Side, SpinDirection, TurnDirection};
use crate::{
    competition::{Mode, ModeHandle},
    error::{CommandError, DeviceError, NotAuthorizedSnafu},
    rt::{Instant, Mutex, sleep},
};

/// Default interval between turn completion checks.
pub const TURN_POLL: Duration = Duration::from_millis(10);
/// Default upper bound on a single turn.
pub const TURN_TIMEOUT: Duration = Duration::from_secs(2);

/// How a [`Gated::turn`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The drivetrain reported the turn complete.
    Completed,
    /// The turn ran past the maximum duration and the drive was stopped.
    TimedOut,
    /// The mode changed while turning. The transition already stopped the drive.
    Preempted,
    /// The drivetrain stopped reporting progress and the drive was stopped.
    Failed,
}

/// A handle to the shared actuators that only acts while its owner mode is current.
pub struct Gated<A> {
    actuators:    Arc<Mutex<A>>,
    mode:         ModeHandle,
    owner:        Mode,
    turn_poll:    Duration,
    turn_timeout: Duration,
}

impl<A> Clone for Gated<A> {
    fn clone(&self) -> Self {
        Self {
            actuators:    self.actuators.clone(),
            mode:         self.mode.clone(),
            owner:        self.owner,
            turn_poll:    self.turn_poll,
            turn_timeout: self.turn_timeout,
        }
    }
}

impl<A: Actuators> Gated<A> {
    pub fn new(actuators: Arc<Mutex<A>>, mode: ModeHandle, owner: Mode) -> Self {
        Self {
            actuators,
            mode,
            owner,
            turn_poll: TURN_POLL,
            turn_timeout: TURN_TIMEOUT,
        }
    }

    /// Overrides how often a turn is polled and how long it may take.
    pub fn with_turn_limits(mut self, poll: Duration, timeout: Duration) -> Self {
        self.turn_poll = poll;
        self.turn_timeout = timeout;
        self
    }

    /// Returns `true` while the current mode is this handle's owner.
    ///
    /// This is only a hint for skipping work: the authoritative check happens under the
    /// actuator lock in every command.
    pub fn is_authoritative(&self) -> bool { self.mode.current() == self.owner }

    /// Runs `f` on the actuators if this handle holds authority.
    ///
    /// Device failures are logged and swallowed; only a missing authority is reported.
    async fn command<F>(&self, name: &str, f: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut A) -> Result<(), DeviceError>,
    {
        let mut actuators = self.actuators.lock().await;
        let current = self.mode.current();
        if current != self.owner {
            debug!("Rejected {} from {} loop during {}", name, self.owner, current);
            return NotAuthorizedSnafu {
                owner: self.owner,
                current,
            }
            .fail();
        }

        if let Err(e) = f(&mut actuators) {
            warn!("Actuator Error ({}): {}", name, e);
        }
        Ok(())
    }

    pub async fn drive_forward(&self) -> Result<(), CommandError> {
        self.command("drive_forward", |a| a.drive_forward()).await
    }

    pub async fn stop_drive(&self) -> Result<(), CommandError> {
        self.command("stop_drive", |a| a.stop_drive()).await
    }

    pub async fn set_side_velocity(&self, side: Side, percent: f64) -> Result<(), CommandError> {
        self.command("set_side_velocity", |a| a.set_side_velocity(side, percent))
            .await
    }

    pub async fn spin_side(&self, side: Side, direction: SpinDirection) -> Result<(), CommandError> {
        self.command("spin_side", |a| a.spin_side(side, direction))
            .await
    }

    pub async fn stop_side(&self, side: Side) -> Result<(), CommandError> {
        self.command("stop_side", |a| a.stop_side(side)).await
    }

    pub async fn intake(&self, command: IntakeCommand) -> Result<(), CommandError> {
        self.command("intake", |a| a.intake(command)).await
    }

    /// Turns in place and waits for the turn to finish.
    ///
    /// The turn is polled every `turn_poll`. The lock is released between polls so that a
    /// mode transition can get in. The wait ends early when the owner loses authority
    /// ([`TurnOutcome::Preempted`]) or when `turn_timeout` passes
    /// ([`TurnOutcome::TimedOut`]).
    pub async fn turn(
        &self,
        direction: TurnDirection,
        degrees: f64,
    ) -> Result<TurnOutcome, CommandError> {
        self.command("turn", |a| a.start_turn(direction, degrees))
            .await?;
        let started = Instant::now();

        loop {
            sleep(self.turn_poll).await;

            let mut actuators = self.actuators.lock().await;
            if self.mode.current() != self.owner {
                debug!("Turn preempted by mode change");
                return Ok(TurnOutcome::Preempted);
            }

            match actuators.turn_finished() {
                Ok(true) => return Ok(TurnOutcome::Completed),
                Ok(false) => {}
                Err(e) => {
                    warn!("Turn Progress Error: {}", e);
                    halt(&mut *actuators);
                    return Ok(TurnOutcome::Failed);
                }
            }

            if started.elapsed() >= self.turn_timeout {
                warn!(
                    "Turn of {:.1} degrees did not finish within {:?}",
                    degrees, self.turn_timeout
                );
                halt(&mut *actuators);
                return Ok(TurnOutcome::TimedOut);
            }
        }
    }
}

/// Stops the drive after an abandoned turn.
fn halt<A: Actuators>(actuators: &mut A) {
    if let Err(e) = actuators.stop_drive() {
        warn!("Failed to stop drive after turn: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        peripherals::sim::{ActuatorEvent, SimDrivetrain},
        to_mutex,
    };

    fn setup(mode: Mode) -> (Arc<Mutex<SimDrivetrain>>, ModeHandle) {
        let handle = ModeHandle::new();
        handle.publish(mode);
        (to_mutex(SimDrivetrain::new()), handle)
    }

    #[tokio::test(start_paused = true)]
    async fn owner_commands_reach_hardware() {
        let (actuators, mode) = setup(Mode::DriverControl);
        let driver = Gated::new(actuators.clone(), mode, Mode::DriverControl);

        driver.set_side_velocity(Side::Left, 40.0).await.unwrap();
        driver.spin_side(Side::Left, SpinDirection::Forward).await.unwrap();

        let events = actuators.lock().await.events().to_vec();
        assert_eq!(events, [
            ActuatorEvent::SideVelocity {
                side:    Side::Left,
                percent: 40.0,
            },
            ActuatorEvent::Spin {
                side:      Side::Left,
                direction: SpinDirection::Forward,
            },
        ]);
    }

    #[tokio::test(start_paused = true)]
    async fn other_mode_is_rejected() {
        let (actuators, mode) = setup(Mode::Autonomous);
        let driver = Gated::new(actuators.clone(), mode, Mode::DriverControl);

        let err = driver.stop_side(Side::Right).await.unwrap_err();
        assert_eq!(err, CommandError::NotAuthorized {
            owner:   Mode::DriverControl,
            current: Mode::Autonomous,
        });
        assert!(actuators.lock().await.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn turn_waits_for_completion() {
        let (actuators, mode) = setup(Mode::Autonomous);
        actuators.lock().await.set_turn_rate(90.0);
        let auton = Gated::new(actuators.clone(), mode, Mode::Autonomous);

        let started = Instant::now();
        let outcome = auton.turn(TurnDirection::Right, 45.0).await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(!actuators.lock().await.is_turning());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_turn_times_out() {
        let (actuators, mode) = setup(Mode::Autonomous);
        actuators.lock().await.set_turn_rate(0.0);
        let auton = Gated::new(actuators.clone(), mode, Mode::Autonomous)
            .with_turn_limits(Duration::from_millis(10), Duration::from_millis(200));

        let outcome = auton.turn(TurnDirection::Left, 30.0).await.unwrap();

        assert_eq!(outcome, TurnOutcome::TimedOut);
        assert_eq!(
            actuators.lock().await.events().last(),
            Some(&ActuatorEvent::StopDrive)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mode_change_preempts_turn() {
        let (actuators, mode) = setup(Mode::Autonomous);
        actuators.lock().await.set_turn_rate(10.0);
        let auton = Gated::new(actuators.clone(), mode.clone(), Mode::Autonomous);

        let flip = async {
            sleep(Duration::from_millis(100)).await;
            mode.publish(Mode::DriverControl);
        };
        let (outcome, ()) = tokio::join!(auton.turn(TurnDirection::Right, 90.0), flip);

        assert_eq!(outcome.unwrap(), TurnOutcome::Preempted);
    }

    #[tokio::test(start_paused = true)]
    async fn unplugged_drivetrain_fails_turn() {
        let (actuators, mode) = setup(Mode::Autonomous);
        actuators.lock().await.set_turn_rate(10.0);
        let auton = Gated::new(actuators.clone(), mode, Mode::Autonomous);

        let unplug = async {
            sleep(Duration::from_millis(55)).await;
            actuators.lock().await.set_connected(false);
        };
        let (outcome, ()) = tokio::join!(auton.turn(TurnDirection::Left, 90.0), unplug);

        // The stop after the failure cannot reach the motors either.
        assert_eq!(outcome.unwrap(), TurnOutcome::Failed);
        assert_eq!(actuators.lock().await.events(), [ActuatorEvent::Turn {
            direction: TurnDirection::Left,
            degrees:   90.0,
        }]);
    }
}
