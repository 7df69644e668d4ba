//! Vision snapshots.
//!
//! The AI Vision sensor reports every object it recognizes in a 320×240 frame with the
//! origin in the top-left corner. One read of the sensor becomes one [`Snapshot`], which
//! lives for exactly one autonomous cycle.

use core::fmt;

use log::warn;

use super::VisionSensor;

/// Width of the vision frame in pixels.
pub const FRAME_WIDTH: i32 = 320;
/// Height of the vision frame in pixels.
pub const FRAME_HEIGHT: i32 = 240;
/// Horizontal optical center of the frame.
pub const FRAME_CENTER_X: i32 = FRAME_WIDTH / 2;

/// Maximum number of objects kept from a single read.
pub const MAX_OBJECTS: usize = 24;

/// The two block colors the vision model is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TeamColor {
    Blue = 0,
    Red = 1,
}

impl TeamColor {
    /// The vision model's class id for this color.
    pub const fn class_id(self) -> u8 { self as u8 }

    pub const fn from_class_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TeamColor::Blue),
            1 => Some(TeamColor::Red),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TeamColor::Blue => "BLUE",
            TeamColor::Red => "RED",
        }
    }

    /// The color as a 32-bit ARGB value for the Brain screen.
    pub const fn argb(self) -> u32 {
        match self {
            TeamColor::Blue => 0x0000_00FF,
            TeamColor::Red => 0x00FF_0000,
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// A single object observed by the vision sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedObject {
    /// Class id reported by the vision model (see [`TeamColor::class_id`]).
    pub team_id:  u8,
    pub center_x: i32,
    pub center_y: i32,
    /// Top-left corner of the bounding box.
    pub origin_x: i32,
    pub origin_y: i32,
    pub width:    i32,
    pub height:   i32,
    /// Detection confidence, 0 to 100.
    pub score:    u8,
}

impl DetectedObject {
    /// Builds an object from its bounding box. The center is derived from the box.
    pub fn from_box(team_id: u8, origin: (i32, i32), size: (i32, i32), score: u8) -> Self {
        Self {
            team_id,
            center_x: origin.0 + size.0 / 2,
            center_y: origin.1 + size.1 / 2,
            origin_x: origin.0,
            origin_y: origin.1,
            width: size.0,
            height: size.1,
            score,
        }
    }

    /// The team color of this object, if the class id is one of the two known colors.
    pub const fn team(&self) -> Option<TeamColor> { TeamColor::from_class_id(self.team_id) }

    pub const fn is_team(&self, team: TeamColor) -> bool { self.team_id == team.class_id() }
}

/// Object type tag the AI Vision sensor reports for model detections.
pub const MODEL_OBJECT_TYPE: u8 = 1 << 2;

/// One object record as the AI Vision sensor reports it, before any interpretation.
///
/// The sensor tags each record with an object type (color blob, color code, model
/// detection or AprilTag) and, separately, the id of the class that matched. Only model
/// detections carry a bounding box and confidence score in these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawModelObject {
    pub object_type: u8,
    pub class_id:    u8,
    pub x:           u16,
    pub y:           u16,
    pub width:       u16,
    pub height:      u16,
    pub score:       u16,
}

impl RawModelObject {
    /// Converts a model detection into a [`DetectedObject`] keyed by its class id.
    ///
    /// Records of any other object type yield `None`.
    pub fn detected(&self) -> Option<DetectedObject> {
        if self.object_type != MODEL_OBJECT_TYPE {
            return None;
        }
        Some(DetectedObject::from_box(
            self.class_id,
            (i32::from(self.x), i32::from(self.y)),
            (i32::from(self.width), i32::from(self.height)),
            self.score.min(100) as u8,
        ))
    }
}

/// All objects seen by one read of the vision sensor, in sensor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    objects: heapless::Vec<DetectedObject, MAX_OBJECTS>,
}

impl Snapshot {
    pub const fn new() -> Self {
        Self {
            objects: heapless::Vec::new(),
        }
    }

    /// Builds a snapshot from sensor output, keeping the first [`MAX_OBJECTS`] objects.
    pub fn from_objects<I: IntoIterator<Item = DetectedObject>>(objects: I) -> Self {
        let mut snapshot = Self::new();
        let mut dropped = 0usize;
        for object in objects {
            if snapshot.objects.push(object).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("Vision snapshot full, dropped {} objects", dropped);
        }
        snapshot
    }

    /// The objects of one team, in sensor order.
    pub fn of_team(&self, team: TeamColor) -> Snapshot {
        Snapshot {
            objects: self.objects.iter().copied().filter(|o| o.is_team(team)).collect(),
        }
    }

    pub fn as_slice(&self) -> &[DetectedObject] { &self.objects }

    pub fn iter(&self) -> core::slice::Iter<'_, DetectedObject> { self.objects.iter() }

    pub fn len(&self) -> usize { self.objects.len() }

    pub fn is_empty(&self) -> bool { self.objects.is_empty() }
}

impl<'a> IntoIterator for &'a Snapshot {
    type IntoIter = core::slice::Iter<'a, DetectedObject>;
    type Item = &'a DetectedObject;

    fn into_iter(self) -> Self::IntoIter { self.objects.iter() }
}

impl FromIterator<DetectedObject> for Snapshot {
    fn from_iter<I: IntoIterator<Item = DetectedObject>>(iter: I) -> Self {
        Snapshot::from_objects(iter)
    }
}

/// Captures a snapshot, treating an unavailable sensor as an empty frame.
///
/// Missing objects are the normal case for the autonomous loop, so a read failure is only
/// logged and never fails the cycle.
pub fn snapshot<V: VisionSensor>(vision: &mut V) -> Snapshot {
    vision.objects().unwrap_or_else(|e| {
        warn!("Vision Sensor Error: {}", e);
        Snapshot::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DeviceError, peripherals::sim::SimVision};

    fn block(team_id: u8, center_x: i32) -> DetectedObject {
        DetectedObject::from_box(team_id, (center_x - 10, 100), (20, 20), 80)
    }

    #[test]
    fn from_box_derives_center() {
        let object = DetectedObject::from_box(1, (150, 130), (40, 40), 90);
        assert_eq!((object.center_x, object.center_y), (170, 150));
        assert_eq!(object.team(), Some(TeamColor::Red));
    }

    fn raw(object_type: u8, class_id: u8) -> RawModelObject {
        RawModelObject {
            object_type,
            class_id,
            x: 140,
            y: 180,
            width: 40,
            height: 40,
            score: 87,
        }
    }

    #[test]
    fn model_detection_is_keyed_by_class() {
        let object = raw(MODEL_OBJECT_TYPE, TeamColor::Red.class_id()).detected().unwrap();
        assert_eq!(object.team(), Some(TeamColor::Red));
        assert_eq!(object.team_id, 1);
        assert_eq!((object.center_x, object.center_y), (160, 200));
        assert_eq!(object.score, 87);

        let blue = raw(MODEL_OBJECT_TYPE, TeamColor::Blue.class_id()).detected().unwrap();
        assert!(blue.is_team(TeamColor::Blue));
    }

    #[test]
    fn non_model_records_are_skipped() {
        // Color blob and AprilTag records.
        assert_eq!(raw(1, 1).detected(), None);
        assert_eq!(raw(1 << 3, 0).detected(), None);
    }

    #[test]
    fn model_score_is_capped() {
        let object = RawModelObject {
            score: 250,
            ..raw(MODEL_OBJECT_TYPE, 0)
        };
        assert_eq!(object.detected().map(|o| o.score), Some(100));
    }

    #[test]
    fn unknown_class_has_no_team() {
        assert_eq!(block(7, 160).team(), None);
    }

    #[test]
    fn overfull_read_is_truncated() {
        let snapshot = Snapshot::from_objects((0..30).map(|i| block(0, i)));
        assert_eq!(snapshot.len(), MAX_OBJECTS);
        assert_eq!(snapshot.as_slice()[0].center_x, 0);
    }

    #[test]
    fn of_team_keeps_sensor_order() {
        let snapshot: Snapshot = [block(1, 10), block(0, 20), block(1, 30)].into_iter().collect();
        let red = snapshot.of_team(TeamColor::Red);
        let xs: Vec<i32> = red.iter().map(|o| o.center_x).collect();
        assert_eq!(xs, [10, 30]);
    }

    #[test]
    fn unplugged_sensor_gives_empty_snapshot() {
        let mut vision = SimVision::repeating(Snapshot::from_objects([block(1, 50)]));
        vision.set_connected(false);
        assert!(vision.objects().is_err_and(|e| matches!(e, DeviceError::Disconnected { .. })));
        assert!(snapshot(&mut vision).is_empty());
    }
}
