use std::{error::Error, fmt::Display, sync::{Arc, RwLock}};

use log::info;

use crate::telemetry::{Table, TelemetrySink};

/// An operator-facing selection widget, e.g. a dashboard dropdown.
pub trait OptionSelector {
  fn register_option(&mut self, label: &str, default: bool);
  /// The label currently selected, falling back to the default option. `None` only if nothing
  /// has been registered as default and nothing has been selected.
  fn get_selected(&self) -> Option<String>;
}

impl<T: OptionSelector + ?Sized> OptionSelector for Box<T> {
  fn register_option(&mut self, label: &str, default: bool) { (**self).register_option(label, default) }
  fn get_selected(&self) -> Option<String> { (**self).get_selected() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChooserError {
  UnknownOption(String)
}

impl Display for ChooserError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ChooserError::UnknownOption(label) => write!(f, "Unknown Option: {}", label),
    }
  }
}
impl Error for ChooserError {}

#[derive(Debug, Clone, Default)]
struct ChooserState {
  options: Vec<String>,
  default: Option<String>,
  selected: Option<String>,
}

/// A dashboard-backed chooser. Clones share state: the robot holds one end, the dashboard
/// (or a test) holds the other and calls [SendableChooser::select].
#[derive(Clone, Default)]
pub struct SendableChooser {
  state: Arc<RwLock<ChooserState>>,
  table: Option<Table>
}

impl SendableChooser {
  pub fn new() -> Self {
    Self::default()
  }

  /// Publish the options and the active selection to the given table.
  pub fn published(table: Table) -> Self {
    Self { state: Default::default(), table: Some(table) }
  }

  pub fn options(&self) -> Vec<String> {
    self.state.read().unwrap().options.clone()
  }

  pub fn select(&self, label: &str) -> Result<(), ChooserError> {
    {
      let mut state = self.state.write().unwrap();
      if !state.options.iter().any(|o| o == label) {
        return Err(ChooserError::UnknownOption(label.to_owned()));
      }
      state.selected = Some(label.to_owned());
    }
    info!("Chooser selection changed: {}", label);
    self.publish();
    Ok(())
  }

  fn publish(&self) {
    if let Some(table) = &self.table {
      let state = self.state.read().unwrap();
      table.publish_string("options", &state.options.join(","));
      table.publish_string("default", state.default.as_deref().unwrap_or(""));
      let active = state.selected.as_ref().or(state.default.as_ref());
      table.publish_string("active", active.map(|s| s.as_str()).unwrap_or(""));
    }
  }
}

impl OptionSelector for SendableChooser {
  fn register_option(&mut self, label: &str, default: bool) {
    {
      let mut state = self.state.write().unwrap();
      if !state.options.iter().any(|o| o == label) {
        state.options.push(label.to_owned());
      }
      if default {
        state.default = Some(label.to_owned());
      }
    }
    self.publish();
  }

  fn get_selected(&self) -> Option<String> {
    let state = self.state.read().unwrap();
    state.selected.clone().or_else(|| state.default.clone())
  }
}
