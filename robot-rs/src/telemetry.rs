use std::sync::Arc;

use log::{log, Level};

/// Somewhere to send telemetry, e.g. NetworkTables or the log. Publishing is fire-and-forget.
pub trait TelemetrySink {
  fn publish_string(&self, key: &str, value: &str);
  fn publish_number(&self, key: &str, value: f64);
}

impl<'a, T: TelemetrySink + ?Sized> TelemetrySink for &'a T {
  fn publish_string(&self, key: &str, value: &str) { (**self).publish_string(key, value) }
  fn publish_number(&self, key: &str, value: f64) { (**self).publish_number(key, value) }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
  fn publish_string(&self, key: &str, value: &str) { (**self).publish_string(key, value) }
  fn publish_number(&self, key: &str, value: f64) { (**self).publish_number(key, value) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryValue {
  String(String),
  Number(f64)
}

/// A named path into a shared sink. Keys published through a table are prefixed with its path,
/// e.g. `/Devices/intake/distance`.
#[derive(Clone)]
pub struct Table {
  sink: Arc<dyn TelemetrySink + Send + Sync>,
  path: String
}

impl Table {
  pub fn new(sink: Arc<dyn TelemetrySink + Send + Sync>, path: &str) -> Self {
    Self { sink, path: path.trim_end_matches('/').to_owned() }
  }

  /// A table with no prefix, keys are published as-is.
  pub fn root(sink: Arc<dyn TelemetrySink + Send + Sync>) -> Self {
    Self { sink, path: String::new() }
  }

  pub fn child(&self, name: &str) -> Self {
    Self { sink: self.sink.clone(), path: self.key(name) }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  fn key(&self, name: &str) -> String {
    if self.path.is_empty() {
      name.to_owned()
    } else {
      self.path.clone() + "/" + name
    }
  }
}

impl TelemetrySink for Table {
  fn publish_string(&self, key: &str, value: &str) {
    self.sink.publish_string(&self.key(key), value)
  }

  fn publish_number(&self, key: &str, value: f64) {
    self.sink.publish_number(&self.key(key), value)
  }
}

/// Writes telemetry to the log under the `telemetry` target.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
  level: Level
}

impl LogSink {
  pub fn new(level: Level) -> Self {
    Self { level }
  }
}

impl Default for LogSink {
  fn default() -> Self {
    Self::new(Level::Debug)
  }
}

impl TelemetrySink for LogSink {
  fn publish_string(&self, key: &str, value: &str) {
    log!(target: "telemetry", self.level, "{} = {:?}", key, value);
  }

  fn publish_number(&self, key: &str, value: f64) {
    log!(target: "telemetry", self.level, "{} = {}", key, value);
  }
}

#[cfg(feature = "simulation")]
pub mod sim {
  use std::{collections::HashMap, sync::{Arc, RwLock}};

  use super::{TelemetrySink, TelemetryValue};

  /// Keeps the latest value of every key in memory.
  #[derive(Debug, Clone, Default)]
  pub struct MemorySink {
    values: Arc<RwLock<HashMap<String, TelemetryValue>>>
  }

  impl MemorySink {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
      self.values.read().unwrap().get(key).cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
      match self.get(key) {
        Some(TelemetryValue::String(s)) => Some(s),
        _ => None
      }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
      match self.get(key) {
        Some(TelemetryValue::Number(n)) => Some(n),
        _ => None
      }
    }

    pub fn keys(&self) -> Vec<String> {
      let mut keys: Vec<String> = self.values.read().unwrap().keys().cloned().collect();
      keys.sort();
      keys
    }
  }

  impl TelemetrySink for MemorySink {
    fn publish_string(&self, key: &str, value: &str) {
      self.values.write().unwrap().insert(key.to_owned(), TelemetryValue::String(value.to_owned()));
    }

    fn publish_number(&self, key: &str, value: f64) {
      self.values.write().unwrap().insert(key.to_owned(), TelemetryValue::Number(value));
    }
  }
}
