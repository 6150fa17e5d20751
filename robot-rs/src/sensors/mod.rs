use std::fmt::Display;

/// A raw RGB sample, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
  pub red: u8,
  pub green: u8,
  pub blue: u8
}

impl Color {
  pub const BLACK: Color = Color::new(0, 0, 0);

  pub const fn new(red: u8, green: u8, blue: u8) -> Self {
    Self { red, green, blue }
  }
}

impl Display for Color {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Color({}, {}, {})", self.red, self.green, self.blue)
  }
}

pub trait ColorSensor {
  fn get_color(&self) -> Color;
}

impl<'a, T: ColorSensor + ?Sized> ColorSensor for &'a T {
  fn get_color(&self) -> Color {
    (**self).get_color()
  }
}

impl<T: ColorSensor + ?Sized> ColorSensor for Box<T> {
  fn get_color(&self) -> Color {
    (**self).get_color()
  }
}

pub trait AnalogInput {
  /// Oversampled and averaged voltage on the input, in volts.
  fn get_average_voltage(&self) -> f64;
}

impl<'a, T: AnalogInput + ?Sized> AnalogInput for &'a T {
  fn get_average_voltage(&self) -> f64 {
    (**self).get_average_voltage()
  }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
  fn get_average_voltage(&self) -> f64 {
    (**self).get_average_voltage()
  }
}

#[cfg(feature = "simulation")]
pub mod sim {
  use std::sync::{Arc, RwLock};

  use super::{AnalogInput, Color, ColorSensor};

  #[derive(Debug, Clone, Default)]
  pub struct SimColorSensor {
    color: Arc<RwLock<Color>>
  }

  impl SimColorSensor {
    pub fn new(initial: Color) -> Self {
      Self { color: Arc::new(RwLock::new(initial)) }
    }

    pub fn set_color(&self, color: Color) {
      *self.color.write().unwrap() = color;
    }
  }

  impl ColorSensor for SimColorSensor {
    fn get_color(&self) -> Color {
      *self.color.read().unwrap()
    }
  }

  #[derive(Debug, Clone, Default)]
  pub struct SimAnalogInput {
    voltage: Arc<RwLock<f64>>
  }

  impl SimAnalogInput {
    pub fn new(initial: f64) -> Self {
      Self { voltage: Arc::new(RwLock::new(initial)) }
    }

    pub fn set_voltage(&self, voltage: f64) {
      *self.voltage.write().unwrap() = voltage;
    }
  }

  impl AnalogInput for SimAnalogInput {
    fn get_average_voltage(&self) -> f64 {
      *self.voltage.read().unwrap()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Color;

  #[test]
  fn test_color_display() {
    assert_eq!(Color::new(64, 108, 81).to_string(), "Color(64, 108, 81)");
    assert_eq!(Color::BLACK, Color::default());
  }

  #[cfg(feature = "simulation")]
  #[test]
  fn test_sim_sensors_share_state() {
    use approx::assert_relative_eq;
    use super::{sim::{SimAnalogInput, SimColorSensor}, AnalogInput, ColorSensor};

    let color = SimColorSensor::new(Color::BLACK);
    let reader = color.clone();
    color.set_color(Color::new(84, 127, 42));
    assert_eq!(reader.get_color(), Color::new(84, 127, 42));

    let analog = SimAnalogInput::new(0.0);
    let reader: Box<dyn AnalogInput> = Box::new(analog.clone());
    analog.set_voltage(1.25);
    assert_relative_eq!(reader.get_average_voltage(), 1.25);
  }
}
