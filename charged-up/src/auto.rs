use std::collections::HashMap;
use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use log::{info, warn};
use robot_rs::chooser::OptionSelector;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::subsystems::intake::{AwaitableIntake, SharedIntake};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr, EnumString, EnumIter)]
pub enum AutoMode {
  #[default]
  BottomCommunity,
  ChargeStation,
  TopCommunity,
  TopScore,
  BotScore,
}

type RoutineFactory<R> = Box<dyn Fn() -> R + Send + Sync>;

/// Binds every [AutoMode] to an operator-facing selector. Routines are only built when
/// [AutonomousChooser::get_auto] is called, and only for the selected mode.
pub struct AutonomousChooser<R> {
  selector: Box<dyn OptionSelector + Send + Sync>,
  routines: HashMap<AutoMode, RoutineFactory<R>>,
}

impl<R: 'static> AutonomousChooser<R> {
  pub fn new<F>(mut selector: Box<dyn OptionSelector + Send + Sync>, factory: F) -> Self
  where
    F: Fn(AutoMode) -> R + Send + Sync + 'static
  {
    let factory = Arc::new(factory);
    let mut routines = HashMap::new();

    for mode in AutoMode::iter() {
      selector.register_option(mode.as_ref(), mode == AutoMode::default());

      let factory = factory.clone();
      routines.insert(mode, Box::new(move || factory(mode)) as RoutineFactory<R>);
    }

    Self { selector, routines }
  }

  /// The mode the operator has chosen, or the default if the selector has nothing we recognise.
  pub fn selected_mode(&self) -> AutoMode {
    match self.selector.get_selected() {
      Some(label) => label.parse().unwrap_or_else(|_| {
        warn!("Unknown autonomous mode '{}', falling back to {}", label, AutoMode::default());
        AutoMode::default()
      }),
      None => {
        warn!("No autonomous mode selected, falling back to {}", AutoMode::default());
        AutoMode::default()
      }
    }
  }

  pub fn get_auto(&self) -> R {
    let mode = self.selected_mode();
    info!("Autonomous mode: {}", mode);
    (self.routines[&mode])()
  }
}

pub type AutoRoutine = BoxFuture<'static, ()>;

/// Score the preloaded piece, then follow the path for `mode`.
pub fn score_preload(mode: AutoMode, intake: SharedIntake) -> AutoRoutine {
  async move {
    info!("[AUTO] {} begin", mode);
    intake.outtake_until_clear().await;
    info!("[AUTO] Preload scored");
    // Path following lives with the drivetrain, which isn't part of this crate.
    info!("[AUTO] {} end", mode);
  }.boxed()
}

#[cfg(test)]
mod tests {
  use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

  use robot_rs::chooser::{OptionSelector, SendableChooser};

  use super::{AutoMode, AutonomousChooser};

  #[derive(Clone, Default)]
  struct FixedSelector(Option<String>);

  impl OptionSelector for FixedSelector {
    fn register_option(&mut self, _label: &str, _default: bool) { }
    fn get_selected(&self) -> Option<String> { self.0.clone() }
  }

  #[test]
  fn test_registers_all_modes() {
    let dashboard = SendableChooser::new();
    let _chooser = AutonomousChooser::new(Box::new(dashboard.clone()), |mode| mode);

    assert_eq!(
      dashboard.options(),
      vec!["BottomCommunity", "ChargeStation", "TopCommunity", "TopScore", "BotScore"]
    );
    assert_eq!(dashboard.get_selected(), Some("BottomCommunity".to_owned()));
  }

  #[test]
  fn test_default_is_bottom_community() {
    let chooser = AutonomousChooser::new(Box::new(SendableChooser::new()), |mode| mode);
    assert_eq!(chooser.get_auto(), AutoMode::BottomCommunity);
  }

  #[test]
  fn test_selection() {
    let dashboard = SendableChooser::new();
    let chooser = AutonomousChooser::new(Box::new(dashboard.clone()), |mode| mode.to_string());

    dashboard.select("TopScore").unwrap();
    assert_eq!(chooser.selected_mode(), AutoMode::TopScore);
    assert_eq!(chooser.get_auto(), "TopScore");
  }

  #[test]
  fn test_unknown_or_missing_selection_falls_back() {
    let chooser = AutonomousChooser::new(Box::new(FixedSelector(Some("Wander".to_owned()))), |mode| mode);
    assert_eq!(chooser.get_auto(), AutoMode::BottomCommunity);

    let chooser = AutonomousChooser::new(Box::new(FixedSelector(None)), |mode| mode);
    assert_eq!(chooser.get_auto(), AutoMode::BottomCommunity);
  }

  #[test]
  fn test_routines_are_lazy() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let dashboard = SendableChooser::new();
    let chooser = AutonomousChooser::new(Box::new(dashboard.clone()), move |mode| {
      counter.fetch_add(1, Ordering::SeqCst);
      mode
    });
    assert_eq!(built.load(Ordering::SeqCst), 0);

    dashboard.select("ChargeStation").unwrap();
    assert_eq!(chooser.get_auto(), AutoMode::ChargeStation);
    assert_eq!(built.load(Ordering::SeqCst), 1);

    // Each call builds a fresh routine
    chooser.get_auto();
    assert_eq!(built.load(Ordering::SeqCst), 2);
  }
}
