//! Vision-driven autonomous control.
//!
//! Every cycle starts from a fresh snapshot and recomputes every decision from it:
//!
//! 1. Capture a [`Snapshot`].
//! 2. Keep the objects of the controlling team.
//! 3. Turn towards the first of them, or make a small search turn if there is none.
//! 4. Pull a grabbable own-team block in, push any other grabbable object out, or stop the
//!    intake.
//! 5. Drive forward.
//! 6. Render the snapshot on the screen.
//!
//! The turn in step 3 is awaited, so the intake and drive commands of a cycle always
//! follow the end of its turn. Missing objects are the normal case and never end a cycle
//! early. Only a mode change does.
//!
//! # Example
//!
//! ```ignore
//! use seeker::auton::AutonomousLoop;
//!
//! let auton = AutonomousLoop::new(&config, vision, actuators.clone(), mode.clone(), display.clone());
//! vexide::task::spawn(auton.run()).detach();
//! ```

use std::{sync::Arc, time::Duration};

use log::{debug, info};

use crate::{
    competition::{Mode, ModeHandle},
    config::{IdleTurn, RobotConfig},
    display::StatusDisplay,
    error::CommandError,
    motion::{
        grab::GrabEnvelope,
        targeting::{Bearing, bearing_correction, select_target},
    },
    peripherals::{
        Actuators, IntakeCommand, TurnDirection, VisionSensor,
        drivetrain::{Gated, TurnOutcome},
        vision::{self, DetectedObject, Snapshot, TeamColor},
    },
    rt::{Instant, Mutex, sleep},
};

/// What one autonomous cycle decided.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Number of objects in the snapshot.
    pub objects: usize,
    pub target:  Option<DetectedObject>,
    /// The turn that was issued, if any.
    pub turn:    Option<(TurnDirection, f64)>,
    pub outcome: Option<TurnOutcome>,
    pub intake:  IntakeCommand,
}

/// Chooses the intake command for a snapshot.
///
/// An own-team block inside the envelope is pulled in. Otherwise any object inside the
/// envelope (the other team's, or one the model could not classify) is pushed out.
pub fn intake_decision(
    own: &Snapshot,
    all: &Snapshot,
    envelope: &GrabEnvelope,
) -> IntakeCommand {
    if envelope.is_grabbable(own) {
        IntakeCommand::Forward
    } else if envelope.is_grabbable(all) {
        IntakeCommand::Reverse
    } else {
        IntakeCommand::Stop
    }
}

/// The autonomous control loop.
pub struct AutonomousLoop<V, A, D> {
    vision:    V,
    drive:     Gated<A>,
    display:   Arc<Mutex<D>>,
    team:      TeamColor,
    idle_turn: IdleTurn,
    grab:      GrabEnvelope,
    period:    Duration,
}

impl<V: VisionSensor, A: Actuators, D: StatusDisplay> AutonomousLoop<V, A, D> {
    /// Creates the loop. It only drives while `mode` is [`Mode::Autonomous`].
    pub fn new(
        config: &RobotConfig,
        vision: V,
        actuators: Arc<Mutex<A>>,
        mode: ModeHandle,
        display: Arc<Mutex<D>>,
    ) -> Self {
        Self {
            vision,
            drive: Gated::new(actuators, mode, Mode::Autonomous)
                .with_turn_limits(config.turn_poll, config.turn_timeout),
            display,
            team: config.team,
            idle_turn: config.idle_turn,
            grab: config.grab,
            period: config.auton_period,
        }
    }

    /// Runs one decision cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotAuthorized`] when the mode left Autonomous during the
    /// cycle. The remaining steps are skipped.
    pub async fn cycle(&mut self) -> Result<CycleReport, CommandError> {
        let snapshot = vision::snapshot(&mut self.vision);
        let own = snapshot.of_team(self.team);
        let target = select_target(&own, self.team).copied();

        let turn = match target.as_ref().map(bearing_correction) {
            Some(Bearing::Turn { direction, degrees }) => Some((direction, degrees)),
            Some(Bearing::Centered) => None,
            None => Some((self.idle_turn.direction, self.idle_turn.degrees)),
        };
        let outcome = match turn {
            Some((direction, degrees)) => Some(self.drive.turn(direction, degrees).await?),
            None => None,
        };

        let intake = intake_decision(&own, &snapshot, &self.grab);
        self.drive.intake(intake).await?;
        self.drive.drive_forward().await?;

        self.display.lock().await.render(&snapshot, target.as_ref());

        debug!(
            "Auton cycle: {} objects, target {:?}, turn {:?}, intake {:?}",
            snapshot.len(),
            target.map(|t| (t.center_x, t.center_y)),
            turn,
            intake
        );
        Ok(CycleReport {
            objects: snapshot.len(),
            target,
            turn,
            outcome,
            intake,
        })
    }

    /// Runs one cycle if the robot is in autonomous mode.
    pub async fn tick(&mut self) -> Option<CycleReport> {
        if !self.drive.is_authoritative() {
            return None;
        }
        match self.cycle().await {
            Ok(report) => Some(report),
            Err(e) => {
                debug!("Autonomous cycle cut short: {}", e);
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
        info!("Autonomous Loop Started");
        loop {
            self.tick().await;
            sleep(self.period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        peripherals::sim::{ActuatorEvent, SimDisplay, SimDrivetrain, SimVision},
        to_mutex,
    };

    type Sim = AutonomousLoop<SimVision, SimDrivetrain, SimDisplay>;

    fn setup(
        vision: SimVision,
        mode: Mode,
    ) -> (Sim, Arc<Mutex<SimDrivetrain>>, ModeHandle) {
        let actuators = to_mutex(SimDrivetrain::new());
        let handle = ModeHandle::new();
        handle.publish(mode);
        let auton = AutonomousLoop::new(
            &RobotConfig::default(),
            vision,
            actuators.clone(),
            handle.clone(),
            to_mutex(SimDisplay::default()),
        );
        (auton, actuators, handle)
    }

    fn frame(objects: &[DetectedObject]) -> SimVision {
        SimVision::repeating(Snapshot::from_objects(objects.iter().copied()))
    }

    #[tokio::test(start_paused = true)]
    async fn approaches_and_grabs_own_block() {
        let block = DetectedObject::from_box(1, (150, 130), (40, 40), 90);
        let (mut auton, actuators, _mode) = setup(frame(&[block]), Mode::Autonomous);

        let report = auton.cycle().await.unwrap();

        assert_eq!(report.target, Some(block));
        assert_eq!(report.intake, IntakeCommand::Forward);
        assert_eq!(report.outcome, Some(TurnOutcome::Completed));

        let events = actuators.lock().await.take_events();
        let [
            ActuatorEvent::Turn { direction, degrees },
            ActuatorEvent::Intake(IntakeCommand::Forward),
            ActuatorEvent::DriveForward,
        ] = events[..]
        else {
            panic!("unexpected events: {:?}", events);
        };
        assert_eq!(direction, TurnDirection::Right);
        assert_relative_eq!(degrees, 1.0f64.atan2(10.0).to_degrees());

        assert_eq!(auton.display.lock().await.renders, [Some(block)]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_snapshot_searches() {
        let (mut auton, actuators, _mode) = setup(SimVision::new(), Mode::Autonomous);

        let report = auton.cycle().await.unwrap();

        assert_eq!(report.objects, 0);
        assert_eq!(actuators.lock().await.take_events(), [
            ActuatorEvent::Turn {
                direction: TurnDirection::Right,
                degrees:   8.0,
            },
            ActuatorEvent::Intake(IntakeCommand::Stop),
            ActuatorEvent::DriveForward,
        ]);
    }

    #[tokio::test(start_paused = true)]
    async fn opposing_block_is_rejected() {
        let blue = DetectedObject::from_box(0, (140, 160), (40, 40), 80);
        let (mut auton, actuators, _mode) = setup(frame(&[blue]), Mode::Autonomous);

        let report = auton.cycle().await.unwrap();

        assert_eq!(report.target, None);
        assert_eq!(report.intake, IntakeCommand::Reverse);
        assert!(
            actuators
                .lock()
                .await
                .events()
                .contains(&ActuatorEvent::Intake(IntakeCommand::Reverse))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn centered_target_skips_turn() {
        let block = DetectedObject::from_box(1, (140, 40), (40, 40), 70);
        let (mut auton, actuators, _mode) = setup(frame(&[block]), Mode::Autonomous);

        let report = auton.cycle().await.unwrap();

        assert_eq!(report.turn, None);
        assert_eq!(actuators.lock().await.take_events(), [
            ActuatorEvent::Intake(IntakeCommand::Stop),
            ActuatorEvent::DriveForward,
        ]);
    }

    #[tokio::test(start_paused = true)]
    async fn unplugged_vision_still_completes_cycle() {
        let mut vision = SimVision::new();
        vision.set_connected(false);
        let (mut auton, actuators, _mode) = setup(vision, Mode::Autonomous);

        assert!(auton.tick().await.is_some());
        assert_eq!(
            actuators.lock().await.events().last(),
            Some(&ActuatorEvent::DriveForward)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn idle_outside_autonomous() {
        let (mut auton, actuators, _mode) = setup(SimVision::new(), Mode::DriverControl);

        assert_eq!(auton.tick().await, None);
        assert_eq!(auton.run_for(Duration::from_millis(200)).await, 0);
        assert_eq!(auton.vision.reads(), 0);
        assert!(actuators.lock().await.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn mode_change_mid_turn_ends_cycle() {
        let (mut auton, actuators, mode) = setup(SimVision::new(), Mode::Autonomous);
        actuators.lock().await.set_turn_rate(10.0);

        let flip = async {
            sleep(Duration::from_millis(100)).await;
            mode.publish(Mode::Disabled);
        };
        let (result, ()) = tokio::join!(auton.cycle(), flip);

        assert!(matches!(result, Err(CommandError::NotAuthorized { .. })));
        let events = actuators.lock().await.take_events();
        assert!(!events.contains(&ActuatorEvent::DriveForward));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_at_cycle_period() {
        let (mut auton, _actuators, _mode) = setup(SimVision::new(), Mode::Autonomous);

        let cycles = auton.run_for(Duration::from_millis(500)).await;

        // an 8 degree search turn takes three 10 ms polls, plus the 50 ms period
        assert!((5..=7).contains(&cycles), "ran {} cycles", cycles);
    }
}
