use std::{error::Error, sync::{atomic::{AtomicBool, Ordering}, Arc}};

use log::{error, warn, info};

#[derive(Clone)]
pub struct RobotState {
  pub(crate) inner: Arc<AtomicBool>
}

impl RobotState {
  pub fn new() -> Self {
    Self { inner: Arc::new(AtomicBool::new(true)) }
  }

  pub fn running(&self) -> bool {
    self.inner.load(Ordering::Relaxed)
  }

  /// Ask the robot program to exit at its next opportunity.
  pub fn stop(&self) {
    self.inner.store(false, Ordering::Relaxed)
  }
}

impl Default for RobotState {
  fn default() -> Self {
    Self::new()
  }
}

#[macro_export]
macro_rules! robot_main {
  ($func:ident) => {
    pub fn main() {
      $crate::start::init_all($func);
    }
  };
  (async $func:ident) => {
    pub fn main() {
      $crate::start::init_all(async_main);
    }

    #[tokio::main]
    pub async fn async_main(running: $crate::start::RobotState) -> $crate::start::RobotResult {
      let fut = $func(running.clone());

      tokio::select! {
        result = fut => result,
        _ = async {
          loop {
            if !running.running() {
              return;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
          }
        } => Ok(())
      }
    }
  }
}

pub type RobotResult = Result<(), Box<dyn Error>>;

pub fn init_all<F: FnOnce(RobotState) -> RobotResult + Send + 'static>(f: F) {
  log_init();

  info!("**** Running Robot ****");

  match f(RobotState::new()) {
    Ok(()) => {
      warn!("Robot Exited Gracefully")
    },
    Err(e) => {
      error!("Robot Error: {}", e)
    }
  }
}

/// Logs to stdout at `info` unless overridden with `RUST_LOG`.
pub fn log_init() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .target(env_logger::Target::Stdout)
    .try_init()
    .ok();
}
