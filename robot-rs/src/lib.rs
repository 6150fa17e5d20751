pub mod actuators;
pub mod chooser;
pub mod sensors;
pub mod telemetry;

pub mod start;
