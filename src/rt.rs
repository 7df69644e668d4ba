//! Async runtime primitives.
//!
//! On the V5 Brain everything runs on the vexide executor. Host builds (the simulator
//! and the test suite) run on a tokio current-thread runtime instead, where time can be
//! paused. The control loops only ever use the names re-exported here.

#[cfg(target_os = "vexos")]
pub use std::time::Instant;

#[cfg(not(target_os = "vexos"))]
pub use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};
#[cfg(target_os = "vexos")]
pub use vexide::{sync::Mutex, time::sleep};
