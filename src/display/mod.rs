//! Brain screen status output.
//!
//! The screen is a write-only sink. It shows calibration messages, a mode banner with a
//! mode indicator color, and the per-object telemetry of the autonomous loop. Nothing in
//! the control loops ever reads it back.
//!
//! # Telemetry Layout
//!
//! For every object in a snapshot the autonomous loop renders four lines:
//!
//! ```text
//! 170, 150      center
//! 150, 130      origin
//! RED           color
//! 90            score
//! ```
//!
//! and a bounding box whose alpha channel fades with the detection score. The target gets
//! an extra white box.

use log::debug;

use crate::peripherals::vision::{DetectedObject, Snapshot, TeamColor};

/// Color of the autonomous mode indicator.
pub const AUTONOMOUS_COLOR: u32 = TeamColor::Blue.argb();
/// Color of the driver control mode indicator.
pub const DRIVER_CONTROL_COLOR: u32 = TeamColor::Red.argb();
/// Color of the box drawn around the target.
pub const TARGET_HIGHLIGHT: u32 = 0x00FF_FFFF;

/// A screen the robot can print status to.
pub trait StatusDisplay {
    fn clear(&mut self);

    /// Fills the mode indicator with a 32-bit ARGB color.
    fn set_indicator(&mut self, argb: u32);

    /// Prints one line of text below the previous one.
    fn print(&mut self, text: &str);

    /// Draws the telemetry of one autonomous cycle.
    fn render(&mut self, snapshot: &Snapshot, target: Option<&DetectedObject>) {
        let _ = (snapshot, target);
    }
}

/// The name shown for an object's color.
///
/// Class ids other than blue are shown as red, matching what the drivers see on the field.
pub fn color_name(object: &DetectedObject) -> &'static str {
    match object.team() {
        Some(TeamColor::Blue) => TeamColor::Blue.name(),
        _ => TeamColor::Red.name(),
    }
}

/// The bounding box color for an object: its team color, with an alpha channel that
/// grows as the detection score drops.
pub fn overlay_color(object: &DetectedObject) -> u32 {
    let base = match object.team() {
        Some(TeamColor::Blue) => TeamColor::Blue.argb(),
        _ => TeamColor::Red.argb(),
    };
    let alpha = ((1.0 - f64::from(object.score) / 100.0) * 255.0)
        .ceil()
        .clamp(0.0, 255.0) as u32;
    base | alpha << 24
}

/// The four telemetry lines of an object: center, origin, color and score.
pub fn object_lines(object: &DetectedObject) -> [String; 4] {
    [
        format!("{}, {}", object.center_x, object.center_y),
        format!("{}, {}", object.origin_x, object.origin_y),
        color_name(object).to_owned(),
        object.score.to_string(),
    ]
}

/// A display that writes everything to the log instead of a screen.
///
/// Used by the simulator, and handy on the robot when the screen is showing something
/// else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    fn clear(&mut self) {}

    fn set_indicator(&mut self, argb: u32) { debug!("Mode indicator: {:#010X}", argb); }

    fn print(&mut self, text: &str) { debug!("{}", text); }

    fn render(&mut self, snapshot: &Snapshot, target: Option<&DetectedObject>) {
        for object in snapshot {
            let marker = if Some(object) == target { "*" } else { " " };
            let [center, origin, color, score] = object_lines(object);
            debug!(
                "{}[{}] [{}] {} score {} box {:#010X}",
                marker,
                center,
                origin,
                color,
                score,
                overlay_color(object)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_alpha_tracks_score() {
        let confident = DetectedObject::from_box(0, (0, 0), (10, 10), 100);
        let unsure = DetectedObject::from_box(1, (0, 0), (10, 10), 0);
        let middling = DetectedObject::from_box(1, (0, 0), (10, 10), 90);

        assert_eq!(overlay_color(&confident), 0x0000_00FF);
        assert_eq!(overlay_color(&unsure), 0xFFFF_0000);
        // ceil((1 - 0.9) * 255) = 26
        assert_eq!(overlay_color(&middling) >> 24, 26);
    }

    #[test]
    fn unknown_class_is_drawn_red() {
        let object = DetectedObject::from_box(5, (150, 130), (40, 40), 90);
        assert_eq!(object_lines(&object), [
            "170, 150".to_owned(),
            "150, 130".to_owned(),
            "RED".to_owned(),
            "90".to_owned(),
        ]);
    }
}
