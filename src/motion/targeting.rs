//! Target selection and bearing correction.
//!
//! The bearing is a coarse single-frame heuristic: the horizontal pixel offset of the
//! target from the optical center is fed to `atan2(1, dx)`, as if the target were one
//! pixel in front of the camera. It is not a calibrated camera model.
//!
//! `atan2(1, dx)` is positive for every finite `dx`, so every correction is a right turn.
//! The magnitude runs from almost 180° far on the left, through 90° at the center, to
//! almost 0° far on the right. A target exactly on the center line is reported as
//! [`Bearing::Centered`] instead of a 90° turn.

use crate::peripherals::{
    TurnDirection,
    vision::{DetectedObject, FRAME_CENTER_X, Snapshot, TeamColor},
};

/// The point turn that faces a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bearing {
    /// The target is on the center line. No turn is needed.
    Centered,
    Turn {
        direction: TurnDirection,
        /// Always positive.
        degrees:   f64,
    },
}

/// Returns the first object of `team` in snapshot order.
pub fn select_target(snapshot: &Snapshot, team: TeamColor) -> Option<&DetectedObject> {
    snapshot.iter().find(|object| object.is_team(team))
}

/// The raw heuristic angle, in degrees, for an object centered at `center_x`.
pub fn bearing_angle(center_x: i32) -> f64 {
    let dx = f64::from(center_x - FRAME_CENTER_X);
    1.0f64.atan2(dx).to_degrees()
}

/// Computes the turn towards `target`.
pub fn bearing_correction(target: &DetectedObject) -> Bearing {
    if target.center_x == FRAME_CENTER_X {
        return Bearing::Centered;
    }

    let angle = bearing_angle(target.center_x);
    let direction = if angle > 0.0 {
        TurnDirection::Right
    } else {
        TurnDirection::Left
    };
    Bearing::Turn {
        direction,
        degrees: angle.abs(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn at(team_id: u8, center_x: i32) -> DetectedObject {
        DetectedObject::from_box(team_id, (center_x - 20, 130), (40, 40), 90)
    }

    #[test]
    fn selects_first_match_in_order() {
        let snapshot = Snapshot::from_objects([at(0, 10), at(1, 20), at(1, 30)]);
        let target = select_target(&snapshot, TeamColor::Red);
        assert_eq!(target.map(|t| t.center_x), Some(20));
    }

    #[test]
    fn no_match_selects_nothing() {
        let snapshot = Snapshot::from_objects([at(0, 10), at(7, 20)]);
        assert!(select_target(&snapshot, TeamColor::Red).is_none());
        assert!(select_target(&Snapshot::new(), TeamColor::Blue).is_none());
    }

    #[test]
    fn bearing_right_of_center() {
        let Bearing::Turn { direction, degrees } = bearing_correction(&at(1, 170)) else {
            panic!("expected a turn");
        };
        assert_eq!(direction, TurnDirection::Right);
        assert_relative_eq!(degrees, 1.0f64.atan2(10.0).to_degrees());
        assert_relative_eq!(degrees, 5.710_593_137_499_643, epsilon = 1e-9);
    }

    #[test]
    fn bearing_left_of_center_is_obtuse() {
        let Bearing::Turn { direction, degrees } = bearing_correction(&at(1, 150)) else {
            panic!("expected a turn");
        };
        assert_eq!(direction, TurnDirection::Right);
        assert_relative_eq!(degrees, 180.0 - 5.710_593_137_499_643, epsilon = 1e-9);
    }

    #[test]
    fn centered_target_needs_no_turn() {
        assert_relative_eq!(bearing_angle(FRAME_CENTER_X), 90.0);
        assert_eq!(bearing_correction(&at(1, FRAME_CENTER_X)), Bearing::Centered);
    }

    #[test]
    fn bearing_is_never_nan() {
        for x in -40..=360 {
            let angle = bearing_angle(x);
            assert!(angle.is_finite());
            assert!(angle > 0.0 && angle < 180.0);
        }
    }
}
