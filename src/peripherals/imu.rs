//! Inertial sensor helpers.
//!
//! The IMU is only used for its calibration status: the drivetrain must not move while it
//! calibrates. It is shared between the startup routine and the joystick loop.

use std::time::Duration;

use log::{info, warn};

use super::Imu;
use crate::rt::{Mutex, sleep};

/// Interval between calibration status polls.
pub const CALIBRATION_POLL: Duration = Duration::from_millis(25);

/// Returns whether the IMU is calibrating.
///
/// A sensor that cannot be read is reported as not calibrating, so an unplugged IMU never
/// locks the driver out of the drivetrain.
pub async fn is_calibrating<I: Imu>(imu: &Mutex<I>) -> bool {
    imu.lock().await.is_calibrating().unwrap_or_else(|e| {
        warn!("Inertial Sensor Error: {}", e);
        false
    })
}

/// Waits until the IMU has finished calibrating, polling every `poll`.
pub async fn wait_for_calibration<I: Imu>(imu: &Mutex<I>, poll: Duration) {
    while is_calibrating(imu).await {
        sleep(poll).await;
    }
}

/// Calibrates the IMU and blocks until the calibration is complete.
///
/// Called once at program start, before the competition hooks run.
pub async fn calibrate_inertial<I: Imu>(imu: &Mutex<I>, poll: Duration) {
    info!("Calibrating Inertial Sensor");
    if let Err(e) = imu.lock().await.begin_calibration() {
        warn!("Inertial Calibration Error: {}", e);
        return;
    }
    wait_for_calibration(imu, poll).await;
    info!("Inertial Sensor Calibrated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{peripherals::sim::SimImu, rt::Instant, to_mutex};

    #[tokio::test(start_paused = true)]
    async fn calibration_blocks_until_done() {
        let imu = to_mutex(SimImu::new(Duration::from_millis(300)));
        let started = Instant::now();

        calibrate_inertial(&imu, CALIBRATION_POLL).await;

        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(!is_calibrating(&imu).await);
    }

    #[tokio::test(start_paused = true)]
    async fn unplugged_imu_reads_as_idle() {
        let imu = to_mutex(SimImu::new(Duration::from_secs(3)));
        imu.lock().await.set_connected(false);

        calibrate_inertial(&imu, CALIBRATION_POLL).await;

        assert!(!is_calibrating(&imu).await);
    }
}
