//! The grab envelope.
//!
//! A block is close enough to grab when it looks big, sits near the horizontal center of
//! the frame and is low in the frame (close to the intake).

use crate::{
    error::{ConfigError, InvalidEnvelopeSnafu},
    peripherals::vision::{DetectedObject, FRAME_CENTER_X, FRAME_HEIGHT, FRAME_WIDTH},
};

/// Size and position limits of a grabbable object, in vision pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabEnvelope {
    /// Minimum width and height.
    pub size:    i32,
    /// Maximum horizontal distance of the center from the frame center, inclusive.
    pub x_range: i32,
    /// The center must be strictly below this row.
    pub min_y:   i32,
}

impl Default for GrabEnvelope {
    fn default() -> Self {
        Self {
            size:    35,
            x_range: 35,
            min_y:   145,
        }
    }
}

impl GrabEnvelope {
    pub const fn new(size: i32, x_range: i32, min_y: i32) -> Self {
        Self {
            size,
            x_range,
            min_y,
        }
    }

    /// Returns `true` if `object` satisfies all four limits.
    pub fn contains(&self, object: &DetectedObject) -> bool {
        object.width >= self.size
            && object.height >= self.size
            && (object.center_x - FRAME_CENTER_X).abs() <= self.x_range
            && object.center_y > self.min_y
    }

    /// Returns `true` if any of `objects` is grabbable.
    pub fn is_grabbable<'a, I>(&self, objects: I) -> bool
    where
        I: IntoIterator<Item = &'a DetectedObject>,
    {
        objects.into_iter().any(|object| self.contains(object))
    }

    /// Checks that the envelope can match something inside the vision frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < 0 || self.x_range < 0 {
            return InvalidEnvelopeSnafu {
                reason: "size and x range must be non-negative",
            }
            .fail();
        }
        if self.size > FRAME_WIDTH.min(FRAME_HEIGHT) {
            return InvalidEnvelopeSnafu {
                reason: "size is larger than the vision frame",
            }
            .fail();
        }
        if self.min_y >= FRAME_HEIGHT - 1 {
            return InvalidEnvelopeSnafu {
                reason: "minimum y is below the vision frame",
            }
            .fail();
        }
        Ok(())
    }
}

/// Returns `true` if any of `objects` lies inside `envelope`.
pub fn is_grabbable<'a, I>(objects: I, envelope: &GrabEnvelope) -> bool
where
    I: IntoIterator<Item = &'a DetectedObject>,
{
    envelope.is_grabbable(objects)
}
