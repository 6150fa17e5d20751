#![cfg(feature = "simulation")]

use std::{sync::Arc, time::Duration};

use charged_up::{
  auto::{score_preload, AutoMode, AutonomousChooser},
  subsystems::intake::{sim::{IntakeSim, IntakeSimParams}, GamePieceType, IntakeSubsystem, SharedIntake},
};
use robot_rs::{
  actuators::{sim::SimMotor, MotorController},
  chooser::{OptionSelector, SendableChooser},
  sensors::sim::{SimAnalogInput, SimColorSensor},
  telemetry::{sim::MemorySink, Table},
};

#[tokio::test]
async fn selected_routine_scores_preload() {
  let sink = MemorySink::new();
  let motors = (SimMotor::new(), SimMotor::new());
  let color = SimColorSensor::default();
  let distance = SimAnalogInput::default();

  let mut sim = IntakeSim::new(IntakeSimParams::default(), motors.clone(), color.clone(), distance.clone());
  sim.insert_piece(GamePieceType::Cube, 6.0);

  let intake = SharedIntake::new(IntakeSubsystem::new(
    (Box::new(motors.0.clone()), Box::new(motors.1.clone())),
    Box::new(color),
    Box::new(distance),
    Table::new(Arc::new(sink.clone()), "/Devices"),
  ));

  let dashboard = SendableChooser::published(Table::new(Arc::new(sink.clone()), "/Autonomous/Choose Auto Mode"));
  let routine_intake = intake.clone();
  let chooser = AutonomousChooser::new(
    Box::new(dashboard.clone()),
    move |mode| score_preload(mode, routine_intake.clone())
  );

  assert_eq!(dashboard.get_selected(), Some("BottomCommunity".to_owned()));
  dashboard.select("ChargeStation").unwrap();
  assert_eq!(chooser.selected_mode(), AutoMode::ChargeStation);
  assert_eq!(sink.get_string("/Autonomous/Choose Auto Mode/active"), Some("ChargeStation".to_owned()));

  let auto = chooser.get_auto();
  let finished = tokio::time::timeout(Duration::from_secs(10), async {
    tokio::select! {
      _ = auto => true,
      _ = intake.clone().run_async(Duration::from_millis(20)) => false,
      _ = sim.run(Duration::from_millis(2)) => false,
    }
  }).await;

  assert!(matches!(finished, Ok(true)), "routine did not finish");
  assert!(!intake.lock().has_object());
  assert_eq!(motors.0.get_speed(), 0.0);
  assert!(sink.get_number("/Devices/distance").is_some());
  assert!(sink.get_number("/Devices/speed").is_some());
}
