//! vexide-backed devices.
//!
//! Wiring used by the competition robot:
//!
//! | Port | Device                       |
//! |------|------------------------------|
//! | 1    | Left drive motor             |
//! | 2    | Right drive motor (reversed) |
//! | 3    | Inertial sensor              |
//! | 4    | AI Vision sensor             |
//! | 5    | Intake motor                 |

use std::{
    cell::{Cell, RefCell},
    f64::consts::PI,
    fmt, mem,
    rc::Rc,
};

use log::{info, warn};
use vex_sdk::{
    V5_DeviceAiVisionObject, V5_DeviceT, vexDeviceAiVisionObjectGet, vexDeviceGetByIndex,
};
use vexide::{
    color::Rgb,
    display::{Display, Rect, Text, TextSize},
    prelude::{Controller, InertialSensor, Motor},
    smart::{
        SmartDevice,
        ai_vision::{AiVisionDetectionMode, AiVisionSensor},
    },
    task::spawn,
};

use super::{
    Actuators, Imu, IntakeCommand, Joystick, Side, Sides, SpinDirection, TurnDirection,
    VisionSensor,
    vision::{DetectedObject, RawModelObject, Snapshot},
};
use crate::{
    display::{StatusDisplay, TARGET_HIGHLIGHT, object_lines, overlay_color},
    error::{BusySnafu, DeviceError},
};

/// Full motor voltage.
const MAX_VOLTAGE: f64 = 12.0;
/// Distance travelled by one wheel revolution, in millimeters.
pub const WHEEL_TRAVEL_MM: f64 = 319.19;
/// Distance between the left and right wheels, in millimeters.
pub const TRACK_WIDTH_MM: f64 = 320.0;

fn hardware<E: fmt::Display>(device: &'static str) -> impl FnOnce(E) -> DeviceError {
    move |e| DeviceError::Hardware {
        device,
        message: e.to_string(),
    }
}

fn voltage(percent: f64) -> f64 { percent.clamp(-100.0, 100.0) / 100.0 * MAX_VOLTAGE }

/// Motor rotation, in radians, needed for a point turn of `degrees`.
fn turn_rotation(degrees: f64) -> f64 {
    let arc = TRACK_WIDTH_MM / 2.0 * degrees.to_radians();
    arc / WHEEL_TRAVEL_MM * 2.0 * PI
}

struct V5Turn {
    start:  Sides<f64>,
    target: f64,
}

/// One motor per drivetrain side, plus the intake.
pub struct V5Drivetrain {
    motors:          Sides<Motor>,
    intake:          Motor,
    velocity:        Sides<f64>,
    drive_velocity:  f64,
    intake_velocity: f64,
    turn:            Option<V5Turn>,
}

impl V5Drivetrain {
    pub fn new(left: Motor, right: Motor, intake: Motor) -> Self {
        Self {
            motors: Sides::new(left, right),
            intake,
            velocity: Sides::splat(0.0),
            drive_velocity: 50.0,
            intake_velocity: 50.0,
            turn: None,
        }
    }

    /// Sets the velocities used for driving, turning and the intake, in percent.
    pub fn with_velocities(mut self, drive: f64, intake: f64) -> Self {
        self.drive_velocity = drive;
        self.intake_velocity = intake;
        self
    }

    fn set_side(&mut self, side: Side, percent: f64) -> Result<(), DeviceError> {
        self.motors[side]
            .set_voltage(voltage(percent))
            .map_err(hardware("Drive Motor"))
    }

    fn position(&self, side: Side) -> Result<f64, DeviceError> {
        self.motors[side]
            .position()
            .map(|angle| angle.as_radians())
            .map_err(hardware("Drive Motor"))
    }
}

impl Actuators for V5Drivetrain {
    fn drive_forward(&mut self) -> Result<(), DeviceError> {
        self.turn = None;
        self.set_side(Side::Left, self.drive_velocity)?;
        self.set_side(Side::Right, self.drive_velocity)
    }

    fn stop_drive(&mut self) -> Result<(), DeviceError> {
        self.turn = None;
        self.set_side(Side::Left, 0.0)?;
        self.set_side(Side::Right, 0.0)
    }

    fn start_turn(&mut self, direction: TurnDirection, degrees: f64) -> Result<(), DeviceError> {
        let start = Sides::new(self.position(Side::Left)?, self.position(Side::Right)?);
        self.turn = Some(V5Turn {
            start,
            target: turn_rotation(degrees.abs()),
        });

        let v = self.drive_velocity;
        let (left, right) = match direction {
            TurnDirection::Right => (v, -v),
            TurnDirection::Left => (-v, v),
        };
        self.set_side(Side::Left, left)?;
        self.set_side(Side::Right, right)
    }

    fn turn_finished(&mut self) -> Result<bool, DeviceError> {
        let Some(turn) = &self.turn else {
            return Ok(true);
        };
        let (start, target) = (turn.start, turn.target);
        let travelled = Side::BOTH
            .iter()
            .map(|&side| self.position(side).map(|p| (p - start[side]).abs()))
            .collect::<Result<Vec<_>, _>>()?;
        let average = travelled.iter().sum::<f64>() / travelled.len() as f64;

        if average < target {
            return Ok(false);
        }
        self.stop_drive()?;
        Ok(true)
    }

    fn set_side_velocity(&mut self, side: Side, percent: f64) -> Result<(), DeviceError> {
        self.velocity[side] = percent;
        Ok(())
    }

    fn spin_side(&mut self, side: Side, direction: SpinDirection) -> Result<(), DeviceError> {
        self.turn = None;
        self.set_side(side, self.velocity[side] * direction.sign())
    }

    fn stop_side(&mut self, side: Side) -> Result<(), DeviceError> { self.set_side(side, 0.0) }

    fn intake(&mut self, command: IntakeCommand) -> Result<(), DeviceError> {
        let percent = match command {
            IntakeCommand::Forward => self.intake_velocity,
            IntakeCommand::Reverse => -self.intake_velocity,
            IntakeCommand::Stop => 0.0,
        };
        self.intake
            .set_voltage(voltage(percent))
            .map_err(hardware("Intake Motor"))
    }
}

/// The AI Vision sensor, running the block color model.
///
/// Objects are read as raw SDK records: the converted vexide objects keep only the object
/// type tag, while the targeting needs the class id of each model detection.
pub struct V5Vision {
    sensor: AiVisionSensor,
    device: V5_DeviceT,
}

impl V5Vision {
    /// Wraps the sensor and switches it to model detection.
    pub fn new(mut sensor: AiVisionSensor) -> Self {
        if let Err(e) = sensor.set_detection_mode(AiVisionDetectionMode::MODEL) {
            warn!("AI Vision Mode Error: {}", e);
        }
        let device = unsafe { vexDeviceGetByIndex(u32::from(sensor.port_number() - 1)) };
        Self { sensor, device }
    }

    fn record(&self, index: u32) -> RawModelObject {
        let mut object: V5_DeviceAiVisionObject = unsafe { mem::zeroed() };
        unsafe { vexDeviceAiVisionObjectGet(self.device, index, &mut object) };

        let model = unsafe { object.object.model };
        RawModelObject {
            object_type: object.r#type,
            class_id:    object.id,
            x:           model.xoffset,
            y:           model.yoffset,
            width:       model.width,
            height:      model.height,
            score:       model.score,
        }
    }
}

impl VisionSensor for V5Vision {
    fn objects(&mut self) -> Result<Snapshot, DeviceError> {
        let count = self
            .sensor
            .num_objects()
            .map_err(hardware("AI Vision Sensor"))?;

        Ok((0..count)
            .filter_map(|i| self.record(i).detected())
            .collect())
    }
}

/// The inertial sensor.
///
/// vexide calibrates through a future that holds the sensor mutably, so the calibration
/// runs in its own task and the sensor reads as calibrating while that task holds it.
pub struct V5Imu {
    sensor:      Rc<RefCell<InertialSensor>>,
    calibrating: Rc<Cell<bool>>,
}

impl V5Imu {
    pub fn new(sensor: InertialSensor) -> Self {
        Self {
            sensor:      Rc::new(RefCell::new(sensor)),
            calibrating: Rc::new(Cell::new(false)),
        }
    }
}

impl Imu for V5Imu {
    fn begin_calibration(&mut self) -> Result<(), DeviceError> {
        if self.calibrating.get() {
            return BusySnafu {
                device: "Inertial Sensor",
            }
            .fail();
        }
        self.calibrating.set(true);

        let sensor = self.sensor.clone();
        let calibrating = self.calibrating.clone();
        spawn(async move {
            let mut sensor = sensor.borrow_mut();
            if let Err(e) = sensor.calibrate().await {
                warn!("Inertial Calibration Error: {}", e);
            } else {
                info!("Inertial Sensor Calibrated");
            }
            calibrating.set(false);
        })
        .detach();
        Ok(())
    }

    fn is_calibrating(&self) -> Result<bool, DeviceError> {
        if self.calibrating.get() {
            return Ok(true);
        }
        match self.sensor.try_borrow() {
            Ok(sensor) => sensor
                .is_calibrating()
                .map_err(hardware("Inertial Sensor")),
            Err(_) => Ok(true),
        }
    }
}

/// The primary controller, read as a tank drive.
pub struct V5Controller {
    controller: Controller,
}

impl V5Controller {
    pub fn new(controller: Controller) -> Self { Self { controller } }
}

impl Joystick for V5Controller {
    fn axes(&mut self) -> Result<Sides<f64>, DeviceError> {
        let state = self
            .controller
            .state()
            .map_err(hardware("Controller"))?;
        Ok(Sides::new(
            state.left_stick.y() * 100.0,
            state.right_stick.y() * 100.0,
        ))
    }
}

const LINE_HEIGHT: i16 = 20;

/// The mode indicator square in the top-right corner.
fn indicator() -> Rect { Rect::from_dimensions((440, 0), 40, 40) }

fn rgb(argb: u32) -> Rgb<u8> { Rgb::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8) }

/// The Brain screen.
pub struct V5Display {
    display: Display,
    row:     i16,
}

impl V5Display {
    pub fn new(display: Display) -> Self { Self { display, row: 0 } }

    fn text(&mut self, text: &str, position: (i16, i16), argb: u32) {
        self.display
            .fill(&Text::new(text, TextSize::Small, position), rgb(argb));
    }
}

impl StatusDisplay for V5Display {
    fn clear(&mut self) {
        self.display.erase(Rgb::new(0, 0, 0));
        self.row = 0;
    }

    fn set_indicator(&mut self, argb: u32) { self.display.fill(&indicator(), rgb(argb)); }

    fn print(&mut self, text: &str) {
        let y = self.row * LINE_HEIGHT;
        self.text(text, (4, y), 0x00FF_FFFF);
        self.row += 1;
    }

    fn render(&mut self, snapshot: &Snapshot, target: Option<&DetectedObject>) {
        self.clear();
        for (i, object) in snapshot.iter().enumerate() {
            let column = 4 + (i as i16 % 4) * 80;
            let row = (i as i16 / 4) * 4 * LINE_HEIGHT;
            for (line, text) in object_lines(object).iter().enumerate() {
                self.text(text, (column, row + line as i16 * LINE_HEIGHT), 0x00FF_FFFF);
            }

            let bounds = Rect::from_dimensions(
                (object.origin_x as i16, object.origin_y as i16),
                object.width.max(0) as u16,
                object.height.max(0) as u16,
            );
            self.display.stroke(&bounds, rgb(overlay_color(object)));
            if Some(object) == target {
                self.display.stroke(&bounds, rgb(TARGET_HIGHLIGHT));
            }
        }
    }
}
