#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleMode {
  Brake,
  #[default]
  Coast
}

/// A percent-output motor controller, e.g. a CAN Spark MAX.
///
/// Speeds are in the conventional [-1.0, 1.0] range. Implementations are not required to clamp,
/// that is left to the controller firmware.
pub trait MotorController {
  fn set_speed(&mut self, speed: f64);
  /// The last commanded speed, before inversion is applied.
  fn get_speed(&self) -> f64;

  fn set_idle_mode(&mut self, mode: IdleMode);
  fn set_inverted(&mut self, inverted: bool);
  fn is_inverted(&self) -> bool;
}

impl<'a, T: MotorController + ?Sized> MotorController for &'a mut T {
  fn set_speed(&mut self, speed: f64) { (**self).set_speed(speed) }
  fn get_speed(&self) -> f64 { (**self).get_speed() }
  fn set_idle_mode(&mut self, mode: IdleMode) { (**self).set_idle_mode(mode) }
  fn set_inverted(&mut self, inverted: bool) { (**self).set_inverted(inverted) }
  fn is_inverted(&self) -> bool { (**self).is_inverted() }
}

impl<T: MotorController + ?Sized> MotorController for Box<T> {
  fn set_speed(&mut self, speed: f64) { (**self).set_speed(speed) }
  fn get_speed(&self) -> f64 { (**self).get_speed() }
  fn set_idle_mode(&mut self, mode: IdleMode) { (**self).set_idle_mode(mode) }
  fn set_inverted(&mut self, inverted: bool) { (**self).set_inverted(inverted) }
  fn is_inverted(&self) -> bool { (**self).is_inverted() }
}

#[cfg(feature = "simulation")]
pub mod sim {
  use std::sync::{RwLock, Arc};

  use super::{IdleMode, MotorController};

  #[derive(Debug, Clone, Default)]
  struct SimMotorState {
    speed: f64,
    idle_mode: IdleMode,
    inverted: bool
  }

  /// A simulated motor controller. Clones share the same state, so the simulation can observe
  /// what the robot code commands.
  #[derive(Debug, Clone, Default)]
  pub struct SimMotor {
    state: Arc<RwLock<SimMotorState>>,
  }

  impl SimMotor {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn idle_mode(&self) -> IdleMode {
      self.state.read().unwrap().idle_mode
    }

    /// The output the motor shaft actually sees, with inversion applied.
    pub fn applied_output(&self) -> f64 {
      let state = self.state.read().unwrap();
      if state.inverted { -state.speed } else { state.speed }
    }
  }

  impl MotorController for SimMotor {
    fn set_speed(&mut self, speed: f64) {
      self.state.write().unwrap().speed = speed;
    }

    fn get_speed(&self) -> f64 {
      self.state.read().unwrap().speed
    }

    fn set_idle_mode(&mut self, mode: IdleMode) {
      self.state.write().unwrap().idle_mode = mode;
    }

    fn set_inverted(&mut self, inverted: bool) {
      self.state.write().unwrap().inverted = inverted;
    }

    fn is_inverted(&self) -> bool {
      self.state.read().unwrap().inverted
    }
  }
}

#[cfg(all(test, feature = "simulation"))]
mod tests {
  use approx::assert_relative_eq;

  use super::{sim::SimMotor, IdleMode, MotorController};

  #[test]
  fn test_sim_motor_shared_state() {
    let observer = SimMotor::new();
    let mut motor = observer.clone();

    assert_eq!(observer.idle_mode(), IdleMode::Coast);
    motor.set_idle_mode(IdleMode::Brake);
    motor.set_speed(0.4);

    assert_eq!(observer.idle_mode(), IdleMode::Brake);
    assert_relative_eq!(observer.get_speed(), 0.4);
    assert_relative_eq!(observer.applied_output(), 0.4);
  }

  #[test]
  fn test_inverted_sim_motor() {
    let mut motor = SimMotor::new();
    motor.set_inverted(true);
    motor.set_speed(0.25);

    assert!(motor.is_inverted());
    assert_relative_eq!(motor.get_speed(), 0.25);
    assert_relative_eq!(motor.applied_output(), -0.25);
  }

  #[test]
  fn test_boxed_motor() {
    let observer = SimMotor::new();
    let mut boxed: Box<dyn MotorController> = Box::new(observer.clone());
    boxed.set_speed(-1.5);
    assert_relative_eq!(observer.get_speed(), -1.5);
  }
}
