//! Competition mode state machine.
//!
//! Field control decides the mode. The robot only reacts to it: every transition runs an
//! entry hook that takes the actuator lock, publishes the new mode, stops the drivetrain
//! and intake, then clears the screen and shows the mode banner.
//!
//! Both control loops read the mode through a [`ModeHandle`]. Neither loop can change it.
//!
//! # Example
//!
//! ```ignore
//! use seeker::competition::{Competition, Mode};
//!
//! let competition = Competition::new(actuators.clone(), display.clone());
//! let mode = competition.mode();
//!
//! competition.on_autonomous_entered().await;
//! assert_eq!(mode.current(), Mode::Autonomous);
//! ```

use core::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use log::{info, warn};

use crate::{
    display::{AUTONOMOUS_COLOR, DRIVER_CONTROL_COLOR, StatusDisplay},
    peripherals::{Actuators, IntakeCommand},
    rt::Mutex,
};

/// The competition-controlled operating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// No loop may drive. The initial state, and the state between periods.
    #[default]
    Disabled = 0,
    Autonomous = 1,
    DriverControl = 2,
}

impl Mode {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::Autonomous,
            2 => Mode::DriverControl,
            _ => Mode::Disabled,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Mode::Disabled => "Disabled",
            Mode::Autonomous => "Autonomous",
            Mode::DriverControl => "Driver Control",
        }
    }

    /// The color of the mode indicator. Disabled has none.
    pub const fn indicator(self) -> Option<u32> {
        match self {
            Mode::Disabled => None,
            Mode::Autonomous => Some(AUTONOMOUS_COLOR),
            Mode::DriverControl => Some(DRIVER_CONTROL_COLOR),
        }
    }

    /// The banner printed when the mode is entered.
    pub const fn banner(self) -> Option<&'static str> {
        match self {
            Mode::Disabled => None,
            Mode::Autonomous => Some("Autonomous Mode Started"),
            Mode::DriverControl => Some("Driver Control"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// A shared, read-only view of the current mode.
///
/// Cloning a handle gives another view of the same cell. Only [`Competition`] publishes
/// to it.
#[derive(Debug, Clone, Default)]
pub struct ModeHandle(Arc<AtomicU8>);

impl ModeHandle {
    /// A fresh cell in [`Mode::Disabled`].
    pub fn new() -> Self { Self::default() }

    pub fn current(&self) -> Mode { Mode::from_u8(self.0.load(Ordering::Acquire)) }

    pub(crate) fn publish(&self, mode: Mode) { self.0.store(mode as u8, Ordering::Release); }
}

/// The mode entry hooks.
pub struct Competition<A, D> {
    mode:      ModeHandle,
    actuators: Arc<Mutex<A>>,
    display:   Arc<Mutex<D>>,
}

impl<A: Actuators, D: StatusDisplay> Competition<A, D> {
    pub fn new(actuators: Arc<Mutex<A>>, display: Arc<Mutex<D>>) -> Self {
        Self {
            mode: ModeHandle::new(),
            actuators,
            display,
        }
    }

    /// A handle the control loops use to read the mode.
    pub fn mode(&self) -> ModeHandle { self.mode.clone() }

    pub async fn on_autonomous_entered(&self) { self.enter(Mode::Autonomous).await; }

    pub async fn on_driver_control_entered(&self) { self.enter(Mode::DriverControl).await; }

    pub async fn on_disabled(&self) { self.enter(Mode::Disabled).await; }

    /// Runs the entry action of `mode`.
    ///
    /// The new mode is published while the actuator lock is held, and the drivetrain and
    /// intake are stopped before the lock is released. A command from the previous owner
    /// either landed before the transition or is rejected after it.
    pub async fn enter(&self, mode: Mode) {
        {
            let mut actuators = self.actuators.lock().await;
            let previous = self.mode.current();
            self.mode.publish(mode);

            if let Err(e) = actuators.stop_drive() {
                warn!("Drivetrain Error: {}", e);
            }
            if let Err(e) = actuators.intake(IntakeCommand::Stop) {
                warn!("Intake Error: {}", e);
            }
            info!("Mode {} -> {}", previous, mode);
        }

        let mut display = self.display.lock().await;
        display.clear();
        if let Some(color) = mode.indicator() {
            display.set_indicator(color);
        }
        if let Some(banner) = mode.banner() {
            display.print(banner);
        }
    }
}

#[cfg(target_os = "vexos")]
impl<A: Actuators, D: StatusDisplay> vexide::prelude::Compete for Competition<A, D> {
    async fn autonomous(&mut self) { self.on_autonomous_entered().await; }

    async fn driver(&mut self) { self.on_driver_control_entered().await; }

    async fn disabled(&mut self) { self.on_disabled().await; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        peripherals::sim::{ActuatorEvent, SimDisplay, SimDrivetrain},
        to_mutex,
    };

    fn competition() -> Competition<SimDrivetrain, SimDisplay> {
        Competition::new(to_mutex(SimDrivetrain::new()), to_mutex(SimDisplay::default()))
    }

    #[test]
    fn starts_disabled() {
        assert_eq!(ModeHandle::new().current(), Mode::Disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn autonomous_entry_shows_banner() {
        let competition = competition();
        let mode = competition.mode();

        competition.on_autonomous_entered().await;

        assert_eq!(mode.current(), Mode::Autonomous);
        let display = competition.display.lock().await;
        assert_eq!(display.indicator, Some(0x0000_00FF));
        assert_eq!(display.lines, ["Autonomous Mode Started"]);
        assert_eq!(display.clears, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_transition_stops_actuators() {
        let competition = competition();

        competition.on_driver_control_entered().await;
        competition.on_disabled().await;

        assert_eq!(competition.mode().current(), Mode::Disabled);
        assert_eq!(competition.actuators.lock().await.take_events(), [
            ActuatorEvent::StopDrive,
            ActuatorEvent::Intake(IntakeCommand::Stop),
            ActuatorEvent::StopDrive,
            ActuatorEvent::Intake(IntakeCommand::Stop),
        ]);

        let display = competition.display.lock().await;
        assert!(display.lines.is_empty());
        assert_eq!(display.indicator, Some(0x00FF_0000));
        assert_eq!(display.clears, 2);
    }
}
