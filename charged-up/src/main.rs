use std::{sync::Arc, time::Duration};

use charged_up::{
  auto::{score_preload, AutonomousChooser},
  subsystems::intake::{sim::{IntakeSim, IntakeSimParams}, GamePieceType, IntakeSubsystem, SharedIntake},
};
use log::{info, Level};
use robot_rs::{
  actuators::sim::SimMotor,
  chooser::SendableChooser,
  robot_main,
  sensors::sim::{SimAnalogInput, SimColorSensor},
  start::{RobotResult, RobotState},
  telemetry::{LogSink, Table},
};

async fn my_robot(state: RobotState) -> RobotResult {
  let sink = Arc::new(LogSink::new(Level::Debug));

  let motors = (SimMotor::new(), SimMotor::new());
  let color_sensor = SimColorSensor::default();
  let distance_sensor = SimAnalogInput::default();

  let mut intake_sim = IntakeSim::new(
    IntakeSimParams::default(),
    motors.clone(),
    color_sensor.clone(),
    distance_sensor.clone()
  );
  // Preloaded cone, sitting against the back of the intake
  intake_sim.insert_piece(GamePieceType::Cone, GamePieceType::Cone.distance_from_sensor());

  let intake = SharedIntake::new(IntakeSubsystem::new(
    (Box::new(motors.0), Box::new(motors.1)),
    Box::new(color_sensor),
    Box::new(distance_sensor),
    Table::new(sink.clone(), "/Devices"),
  ));

  let dashboard = SendableChooser::published(Table::new(sink.clone(), "/Autonomous/Choose Auto Mode"));
  let routine_intake = intake.clone();
  let chooser = AutonomousChooser::new(
    Box::new(dashboard.clone()),
    move |mode| score_preload(mode, routine_intake.clone())
  );

  // Stands in for the operator picking a routine on the dashboard
  if let Ok(label) = std::env::var("AUTO_MODE") {
    dashboard.select(&label)?;
  }

  let auto = chooser.get_auto();

  tokio::select! {
    _ = async {
      auto.await;
      tokio::time::sleep(Duration::from_millis(500)).await;
    } => info!("Autonomous complete"),
    _ = intake.clone().run_async(Duration::from_millis(20)) => (),
    _ = intake_sim.run(Duration::from_millis(5)) => (),
  }

  info!("Intake state at end of auto: {:?}", intake.lock().state());
  state.stop();
  Ok(())
}

robot_main!(async my_robot);
