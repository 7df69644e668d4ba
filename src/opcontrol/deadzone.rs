//! The per-side deadzone latch.
//!
//! A stick resting near zero reads a few percent of noise. Inside the deadzone the side is
//! stopped, but only on the first cycle of each rest period: repeated stop commands are
//! suppressed until the stick leaves the deadzone again.
//!
//! ```text
//! Active     |m| <  deadzone   Stop       -> Deadzoned
//! Deadzoned  |m| <  deadzone   Hold       -> Deadzoned
//! either     |m| >= deadzone   Drive(m)   -> Active
//! ```

/// The state of one stick axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisLatch {
    /// The side follows the stick. The initial state.
    #[default]
    Active,
    /// The side was stopped for the current rest period.
    Deadzoned,
}

/// What to do with one drivetrain side this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisCommand {
    /// Stop the side.
    Stop,
    /// Leave the side alone. It is already stopped.
    Hold,
    /// Set the side velocity to this percentage and spin forward.
    Drive(f64),
}

impl AxisLatch {
    /// Returns `true` if `magnitude` is inside the deadzone.
    pub fn in_deadzone(magnitude: f64, deadzone: f64) -> bool { magnitude.abs() < deadzone }

    /// Feeds one stick reading through the latch.
    pub fn update(&mut self, magnitude: f64, deadzone: f64) -> AxisCommand {
        if !Self::in_deadzone(magnitude, deadzone) {
            *self = AxisLatch::Active;
            return AxisCommand::Drive(magnitude);
        }

        match self {
            AxisLatch::Active => {
                *self = AxisLatch::Deadzoned;
                AxisCommand::Stop
            }
            AxisLatch::Deadzoned => AxisCommand::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(readings: &[f64]) -> Vec<AxisCommand> {
        let mut latch = AxisLatch::default();
        readings.iter().map(|&m| latch.update(m, 5.0)).collect()
    }

    #[test]
    fn one_stop_per_rest_period() {
        assert_eq!(feed(&[3.0, 3.0, 50.0, 3.0]), [
            AxisCommand::Stop,
            AxisCommand::Hold,
            AxisCommand::Drive(50.0),
            AxisCommand::Stop,
        ]);
    }

    #[test]
    fn drive_every_cycle_while_active() {
        assert_eq!(feed(&[20.0, -40.0, 5.0]), [
            AxisCommand::Drive(20.0),
            AxisCommand::Drive(-40.0),
            AxisCommand::Drive(5.0),
        ]);
    }

    #[test]
    fn negative_noise_is_deadzoned() {
        assert_eq!(feed(&[-4.9, 0.0, 4.9]), [
            AxisCommand::Stop,
            AxisCommand::Hold,
            AxisCommand::Hold,
        ]);
    }

    #[test]
    fn zero_deadzone_never_stops() {
        let mut latch = AxisLatch::default();
        assert_eq!(latch.update(0.0, 0.0), AxisCommand::Drive(0.0));
        assert_eq!(latch, AxisLatch::Active);
    }
}
