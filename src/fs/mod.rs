//! Filesystem utilities.
//!
//! On the V5 Brain the working directory is the root of the SD card, so `log.txt` ends up
//! there. Host builds write it to the current directory.
//!
//! # Example
//!
//! ```ignore
//! use seeker::fs::logger;
//! use log::{info, LevelFilter};
//!
//! logger::init(LevelFilter::Debug).expect("Failed to initialize logger");
//! info!("Robot initialized");
//! ```

/// Logging to the console and `log.txt`.
///
/// Provides [`SeekerLogger`](logger::SeekerLogger), installed with
/// [`init`](logger::init).
pub mod logger;
