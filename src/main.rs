//! The Seeker competition program.
//!
//! On the V5 Brain this wires the devices on ports 1 to 5, calibrates the inertial sensor
//! and hands control to the competition runtime. Built for any other target it runs a
//! short simulated practice match against the simulated devices instead.

#[cfg(target_os = "vexos")]
#[vexide::main]
async fn main(peripherals: vexide::prelude::Peripherals) {
    use log::{LevelFilter, error};
    use seeker::{
        config::RobotConfig,
        fs::logger,
        peripherals::v5::{V5Controller, V5Display, V5Drivetrain, V5Imu, V5Vision},
        robot::{Devices, Robot},
    };
    use vexide::{prelude::*, smart::ai_vision::AiVisionSensor, task::spawn};

    if let Err(e) = logger::init(LevelFilter::Info) {
        println!("Logger Error: {}", e);
    }

    let config = RobotConfig::default();
    let devices = Devices {
        actuators: V5Drivetrain::new(
            Motor::new(peripherals.port_1, Gearset::Green, Direction::Forward),
            Motor::new(peripherals.port_2, Gearset::Green, Direction::Reverse),
            Motor::new(peripherals.port_5, Gearset::Green, Direction::Forward),
        )
        .with_velocities(config.drive_velocity, config.intake_velocity),
        imu:       V5Imu::new(InertialSensor::new(peripherals.port_3)),
        vision:    V5Vision::new(AiVisionSensor::new(peripherals.port_4, 50.0, 50.0)),
        joystick:  V5Controller::new(peripherals.primary_controller),
        display:   V5Display::new(peripherals.display),
    };

    let robot = match Robot::new(config, devices) {
        Ok(robot) => robot,
        Err(e) => {
            error!("Configuration Error: {}", e);
            return;
        }
    };
    robot.calibrate().await;

    let Robot {
        competition,
        autonomous,
        teleop,
        ..
    } = robot;
    spawn(autonomous.run()).detach();
    spawn(teleop.run()).detach();
    competition.compete().await;
}

#[cfg(not(target_os = "vexos"))]
mod practice {
    use std::{f64::consts::PI, time::Duration};

    use seeker::peripherals::{
        Sides,
        vision::{DetectedObject, Snapshot, TeamColor},
    };

    pub const AUTONOMOUS: Duration = Duration::from_secs(3);
    pub const DRIVER_CONTROL: Duration = Duration::from_secs(2);
    pub const CALIBRATION: Duration = Duration::from_millis(500);

    /// A red block drifting towards the intake, with a blue block parked off to the side.
    pub fn approach() -> Vec<Snapshot> {
        (0..60)
            .map(|i| {
                let size = 20 + i;
                let center = (100 + i, 90 + 2 * i);
                let red = DetectedObject::from_box(
                    TeamColor::Red.class_id(),
                    (center.0 - size / 2, center.1 - size / 2),
                    (size, size),
                    (60 + i / 2) as u8,
                );
                let blue =
                    DetectedObject::from_box(TeamColor::Blue.class_id(), (260, 40), (24, 24), 75);
                Snapshot::from_objects([blue, red])
            })
            .collect()
    }

    /// Two seconds of stick input at 20 ms: a slow sweep with short rests.
    pub fn sweep() -> Vec<Sides<f64>> {
        (0..100)
            .map(|i| {
                if i % 25 < 5 {
                    return Sides::new(2.0, -3.0);
                }
                let phase = f64::from(i) / 100.0 * 2.0 * PI;
                Sides::new(phase.sin() * 80.0, phase.cos() * 60.0)
            })
            .collect()
    }
}

#[cfg(not(target_os = "vexos"))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    use log::{LevelFilter, error, info};
    use seeker::{
        config::RobotConfig,
        display::LogDisplay,
        fs::logger,
        peripherals::sim::{SimDrivetrain, SimImu, SimJoystick, SimVision},
        robot::{Devices, Robot},
        rt::sleep,
    };

    if let Err(e) = logger::init(LevelFilter::Debug) {
        eprintln!("Logger Error: {}", e);
    }

    let config = RobotConfig::default();
    let devices = Devices {
        vision:    SimVision::scripted(practice::approach()),
        imu:       SimImu::new(practice::CALIBRATION),
        joystick:  SimJoystick::scripted(practice::sweep()),
        actuators: SimDrivetrain::new().with_drive_velocity(config.drive_velocity),
        display:   LogDisplay,
    };
    let robot = match Robot::new(config, devices) {
        Ok(robot) => robot,
        Err(e) => {
            error!("Configuration Error: {}", e);
            return;
        }
    };
    robot.calibrate().await;

    let Robot {
        competition,
        mut autonomous,
        mut teleop,
        ..
    } = robot;
    let length = practice::AUTONOMOUS + practice::DRIVER_CONTROL;

    let field_control = async {
        competition.on_autonomous_entered().await;
        sleep(practice::AUTONOMOUS).await;
        competition.on_driver_control_entered().await;
        sleep(practice::DRIVER_CONTROL).await;
        competition.on_disabled().await;
    };
    let ((), auton_cycles, teleop_cycles) = tokio::join!(
        field_control,
        autonomous.run_for(length),
        teleop.run_for(length),
    );

    info!(
        "Practice match over: {} autonomous cycles, {} teleop cycles",
        auton_cycles, teleop_cycles
    );
    log::logger().flush();
}
