use std::{sync::{Arc, Mutex, MutexGuard}, time::Duration};

use log::{info, trace};
use robot_rs::{actuators::{IdleMode, MotorController}, sensors::{AnalogInput, Color, ColorSensor}, telemetry::{Table, TelemetrySink}};
use strum::Display;

use self::constants::*;

pub mod constants {
  pub const INTAKE_HOLD_SPEED: f64 = 0.1;
  pub const INTAKE_IN_SPEED: f64 = 0.2;
  pub const INTAKE_OUT_SPEED: f64 = -0.3;

  pub const INTAKE_COLOR_THRESHOLD: u8 = 10;

  /// Anything closer than this (cm) is inside the intake.
  pub const HAS_OBJECT_DISTANCE: f64 = 24.0;

  // Voltage -> cm curve for the distance sensor, fit against both game pieces.
  pub const DISTANCE_COEFFICIENT: f64 = 27.726;
  pub const DISTANCE_EXPONENT: f64 = -1.2045;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePieceType {
  Cube,
  Cone,
  #[default]
  None
}

impl GamePieceType {
  /// The colour the sensor reports with this piece in the intake (a desaturated green for both).
  pub const fn color(&self) -> Color {
    match self {
      Self::Cube => Color::new(64, 108, 81),
      Self::Cone => Color::new(84, 127, 42),
      Self::None => Color::BLACK,
    }
  }

  /// The colour of the piece as a person sees it, for LEDs and the dashboard.
  pub const fn led_color(&self) -> Color {
    match self {
      Self::Cube => Color::new(58, 44, 86),
      Self::Cone => Color::new(245, 224, 91),
      Self::None => Color::BLACK,
    }
  }

  /// Distance (cm) from the sensor to the piece once it is pulled all the way in.
  pub const fn distance_from_sensor(&self) -> f64 {
    match self {
      Self::Cube => 9.0,
      Self::Cone => 7.05,
      Self::None => 8.55,
    }
  }

  /// Classify a colour sample. Cubes are checked before cones.
  pub fn classify(sensed: Color) -> Self {
    first_match(sensed, &[Self::Cube, Self::Cone].map(|t| (t, t.color())))
  }
}

fn first_match(sensed: Color, candidates: &[(GamePieceType, Color)]) -> GamePieceType {
  candidates.iter()
    .find(|(_, reference)| color_matches(sensed, *reference))
    .map(|(t, _)| *t)
    .unwrap_or_default()
}

pub fn color_matches(sensed: Color, reference: Color) -> bool {
  sensed.red.abs_diff(reference.red) <= INTAKE_COLOR_THRESHOLD
    && sensed.green.abs_diff(reference.green) <= INTAKE_COLOR_THRESHOLD
    && sensed.blue.abs_diff(reference.blue) <= INTAKE_COLOR_THRESHOLD
}

/// Convert the distance sensor voltage to centimeters. A dead (zero, negative or garbage)
/// reading is treated as nothing in range.
pub fn voltage_to_distance(voltage: f64) -> f64 {
  if voltage > 0.0 && voltage.is_finite() {
    voltage.powf(DISTANCE_EXPONENT) * DISTANCE_COEFFICIENT
  } else {
    f64::INFINITY
  }
}

pub fn distance_to_voltage(distance: f64) -> f64 {
  (distance / DISTANCE_COEFFICIENT).powf(1.0 / DISTANCE_EXPONENT)
}

pub fn has_object_at(distance: f64) -> bool {
  distance < HAS_OBJECT_DISTANCE
}

pub fn is_secured_at(distance: f64) -> bool {
  // TODO: per-piece check (cone inside 7.05cm, or a detected cube inside 9cm) once cube
  // distances are re-measured; cubes never get inside 8.55cm at the moment.
  distance <= GamePieceType::None.distance_from_sensor()
}

/// Everything the intake knows about itself this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntakeState {
  pub speed: f64,
  pub game_piece: GamePieceType,
  pub color: Color,
  pub distance: f64,
  pub has_object: bool,
  pub secured: bool,
}

pub struct IntakeSubsystem {
  motors: (Box<dyn MotorController + Send + Sync>, Box<dyn MotorController + Send + Sync>),
  color_sensor: Box<dyn ColorSensor + Send + Sync>,
  distance_sensor: Box<dyn AnalogInput + Send + Sync>,
  table: Table,
}

impl IntakeSubsystem {
  pub fn new(
    mut motors: (Box<dyn MotorController + Send + Sync>, Box<dyn MotorController + Send + Sync>),
    color_sensor: Box<dyn ColorSensor + Send + Sync>,
    distance_sensor: Box<dyn AnalogInput + Send + Sync>,
    table: Table
  ) -> Self {
    motors.0.set_idle_mode(IdleMode::Brake);
    motors.1.set_idle_mode(IdleMode::Brake);

    // Both are mounted the other way around to how a positive speed should spin them.
    motors.0.set_inverted(true);
    motors.1.set_inverted(true);

    table.publish_string("game_piece", &GamePieceType::None.to_string());
    table.publish_string("color", "no color");
    table.publish_number("distance", 0.0);

    info!("Intake ready, publishing to {}", table.path());

    Self { motors, color_sensor, distance_sensor, table }
  }

  /// Run the intake at a percent output. The second motor faces the first, so it is
  /// driven with the opposite sign.
  pub fn set_speed(&mut self, speed: f64) {
    self.motors.0.set_speed(speed);
    self.motors.1.set_speed(-speed);
  }

  pub fn get_speed(&self) -> f64 {
    self.motors.0.get_speed()
  }

  /// Speed to idle at: enough to keep a held piece pinched, zero when empty.
  pub fn get_hold_speed(&self) -> f64 {
    if self.has_object() { INTAKE_HOLD_SPEED } else { 0.0 }
  }

  pub fn intake_in(&mut self) {
    self.set_speed(INTAKE_IN_SPEED);
  }

  pub fn intake_out(&mut self) {
    self.set_speed(INTAKE_OUT_SPEED);
  }

  pub fn intake_stop(&mut self) {
    self.set_speed(0.0);
  }

  pub fn detect_type(&self) -> GamePieceType {
    GamePieceType::classify(self.color_sensor.get_color())
  }

  pub fn color_matches(&self, reference: Color) -> bool {
    color_matches(self.color_sensor.get_color(), reference)
  }

  /// Distance in centimeters to whatever is in front of the distance sensor.
  pub fn get_distance(&self) -> f64 {
    voltage_to_distance(self.distance_sensor.get_average_voltage())
  }

  pub fn has_object(&self) -> bool {
    has_object_at(self.get_distance())
  }

  pub fn is_secured(&self) -> bool {
    is_secured_at(self.get_distance())
  }

  pub fn state(&self) -> IntakeState {
    let color = self.color_sensor.get_color();
    let distance = self.get_distance();
    IntakeState {
      speed: self.get_speed(),
      game_piece: GamePieceType::classify(color),
      color,
      distance,
      has_object: has_object_at(distance),
      secured: is_secured_at(distance),
    }
  }

  pub fn periodic(&self) {
    let state = self.state();
    self.table.publish_string("game_piece", &state.game_piece.to_string());
    self.table.publish_string("color", &state.color.to_string());
    self.table.publish_number("distance", state.distance);
    self.table.publish_number("speed", state.speed);
    trace!("[INTAKE] {:?}", state);
  }
}

const POLL_PERIOD: Duration = Duration::from_millis(5);

/// A handle to the intake that can be shared between the periodic loop and commands. Locks are
/// only ever held for a single call, never across an await.
#[derive(Clone)]
pub struct SharedIntake(Arc<Mutex<IntakeSubsystem>>);

impl SharedIntake {
  pub fn new(intake: IntakeSubsystem) -> Self {
    Self(Arc::new(Mutex::new(intake)))
  }

  pub fn lock(&self) -> MutexGuard<'_, IntakeSubsystem> {
    self.0.lock().unwrap()
  }

  /// Default behaviour when nothing else is commanding the intake.
  pub fn hold(&self) {
    let mut intake = self.lock();
    let speed = intake.get_hold_speed();
    intake.set_speed(speed);
  }

  pub async fn run_async(self, period: Duration) {
    loop {
      self.lock().periodic();
      tokio::time::sleep(period).await;
    }
  }
}

#[async_trait::async_trait]
pub trait AwaitableIntake {
  /// Run the intake in until a piece is secured, then hold it.
  async fn intake_until_secured(&self);
  /// Run the intake out until it is empty, then stop.
  async fn outtake_until_clear(&self);
}

#[async_trait::async_trait]
impl AwaitableIntake for SharedIntake {
  async fn intake_until_secured(&self) {
    self.lock().intake_in();
    loop {
      let secured = self.lock().is_secured();
      if secured {
        break;
      }
      tokio::time::sleep(POLL_PERIOD).await;
    }
    self.hold();
    info!("[INTAKE] Secured {}", self.lock().detect_type());
  }

  async fn outtake_until_clear(&self) {
    self.lock().intake_out();
    loop {
      let has_object = self.lock().has_object();
      if !has_object {
        break;
      }
      tokio::time::sleep(POLL_PERIOD).await;
    }
    self.lock().intake_stop();
    info!("[INTAKE] Clear");
  }
}

#[cfg(feature = "simulation")]
pub mod sim {
  use std::time::{Duration, Instant};

  use log::debug;
  use robot_rs::{actuators::sim::SimMotor, sensors::{sim::{SimAnalogInput, SimColorSensor}, Color}};

  use super::{distance_to_voltage, has_object_at, GamePieceType};

  #[derive(Debug, Clone, Copy)]
  pub struct IntakeSimParams {
    /// How fast a piece moves through the intake at full output, cm/s.
    pub pull_rate: f64,
    /// Where a piece stops when pulled all the way in.
    pub seated_distance: f64,
    /// Pushed past this, the piece falls out.
    pub eject_distance: f64,
    /// What the distance sensor sees with an empty intake.
    pub empty_distance: f64,
  }

  impl Default for IntakeSimParams {
    fn default() -> Self {
      Self { pull_rate: 100.0, seated_distance: 6.0, eject_distance: 30.0, empty_distance: 80.0 }
    }
  }

  pub struct IntakeSim {
    params: IntakeSimParams,
    motors: (SimMotor, SimMotor),
    color_sensor: SimColorSensor,
    distance_sensor: SimAnalogInput,

    piece: Option<(GamePieceType, f64)>,
    last_tick: Option<Instant>,
  }

  impl IntakeSim {
    pub fn new(
      params: IntakeSimParams,
      motors: (SimMotor, SimMotor),
      color_sensor: SimColorSensor,
      distance_sensor: SimAnalogInput
    ) -> Self {
      let sim = Self { params, motors, color_sensor, distance_sensor, piece: None, last_tick: None };
      sim.update_sensors();
      sim
    }

    /// Place a piece in front of the sensor, `distance` cm away.
    pub fn insert_piece(&mut self, piece: GamePieceType, distance: f64) {
      self.piece = Some((piece, distance));
      self.update_sensors();
    }

    pub fn piece(&self) -> Option<GamePieceType> {
      self.piece.map(|(t, _)| t)
    }

    pub fn piece_distance(&self) -> Option<f64> {
      self.piece.map(|(_, d)| d)
    }

    pub fn step(&mut self, dt: Duration) {
      // Inverted motors spinning against each other, positive is towards the sensor.
      let inward = (self.motors.1.applied_output() - self.motors.0.applied_output()) / 2.0;

      if let Some((piece, distance)) = self.piece {
        let next = (distance - inward * self.params.pull_rate * dt.as_secs_f64()).max(self.params.seated_distance);
        if next > self.params.eject_distance {
          debug!("[INTAKE SIM] {} ejected", piece);
          self.piece = None;
        } else {
          self.piece = Some((piece, next));
        }
      }

      self.update_sensors();
    }

    pub fn tick(&mut self) {
      let now = Instant::now();
      if let Some(last) = self.last_tick {
        self.step(now - last);
      }
      self.last_tick = Some(now);
    }

    pub async fn run(&mut self, period: Duration) {
      loop {
        self.tick();
        tokio::time::sleep(period).await;
      }
    }

    fn update_sensors(&self) {
      let (distance, color) = match self.piece {
        Some((piece, distance)) if has_object_at(distance) => (distance, piece.color()),
        Some((_, distance)) => (distance, Color::BLACK),
        None => (self.params.empty_distance, Color::BLACK),
      };
      self.distance_sensor.set_voltage(distance_to_voltage(distance));
      self.color_sensor.set_color(color);
    }
  }
}
