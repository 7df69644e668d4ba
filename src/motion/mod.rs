//! Geometry and classification for the autonomous loop.
//!
//! Everything here is a pure function of one [`Snapshot`](crate::peripherals::vision::Snapshot).
//! Nothing is carried from one cycle to the next.
//!
//! # Example
//!
//! ```ignore
//! use seeker::motion::{grab::GrabEnvelope, targeting};
//!
//! let own = snapshot.of_team(TeamColor::Red);
//! if let Some(target) = targeting::select_target(&own, TeamColor::Red) {
//!     let bearing = targeting::bearing_correction(target);
//! }
//! let pull_in = GrabEnvelope::default().is_grabbable(&own);
//! ```

/// Target selection and bearing correction.
///
/// Picks the first object of a team from a snapshot and converts its horizontal offset
/// into a point turn.
pub mod targeting;

/// The grab envelope predicate.
pub mod grab;
