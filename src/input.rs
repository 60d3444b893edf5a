use serde::{ Serialize, Deserialize };


/// One of the five values fed to the network.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
  Temperature,
  CloudCover,
  WindSpeed,
  Humidity,
  TimeOfDay,
}

impl InputField {
  /// All fields in network feature order.
  pub const ALL: [Self; 5] = [
    Self::Temperature,
    Self::CloudCover,
    Self::WindSpeed,
    Self::Humidity,
    Self::TimeOfDay,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::Temperature => "Temperature",
      Self::CloudCover => "Cloud cover",
      Self::WindSpeed => "Wind speed",
      Self::Humidity => "Humidity",
      Self::TimeOfDay => "Time of day",
    }
  }

  /// Parse a field name as typed on the command line, ignoring case,
  /// dashes and underscores.

  pub fn parse(name: &str) -> Option<Self> {
    let name: String = name.chars()
      .filter(|c| *c != '-' && *c != '_' )
      .flat_map(char::to_lowercase)
      .collect();
    match name.as_str() {
      "temperature" | "temp" => Some(Self::Temperature),
      "cloudcover" | "cloud" | "clouds" => Some(Self::CloudCover),
      "windspeed" | "wind" => Some(Self::WindSpeed),
      "humidity" => Some(Self::Humidity),
      "timeofday" | "time" => Some(Self::TimeOfDay),
      _ => None,
    }
  }
}

impl std::fmt::Display for InputField {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}


/// Current environmental readings.
///
/// Values are taken as given. Range limits are a concern of the controls
/// that produce them, see [Slider](crate::ui::Slider).
/// Time of day has no control and is never read from a file.

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct InputVector {
  pub temperature: f32,
  pub cloud_cover: f32,
  pub wind_speed: f32,
  pub humidity: f32,
  #[serde(skip)]
  pub time_of_day: f32,
}

impl Default for InputVector {
  fn default() -> Self {
    Self {
      temperature: 25.0,
      cloud_cover: 30.0,
      wind_speed: 10.0,
      humidity: 60.0,
      time_of_day: 12.0,
    }
  }
}

impl InputVector {
  pub fn get(&self, field: InputField) -> f32 {
    match field {
      InputField::Temperature => self.temperature,
      InputField::CloudCover => self.cloud_cover,
      InputField::WindSpeed => self.wind_speed,
      InputField::Humidity => self.humidity,
      InputField::TimeOfDay => self.time_of_day,
    }
  }

  /// Copy with one field replaced.

  pub fn with(mut self, field: InputField, value: f32) -> Self {
    match field {
      InputField::Temperature => self.temperature = value,
      InputField::CloudCover => self.cloud_cover = value,
      InputField::WindSpeed => self.wind_speed = value,
      InputField::Humidity => self.humidity = value,
      InputField::TimeOfDay => self.time_of_day = value,
    }
    self
  }

  pub fn to_features(&self) -> [f32; 5] {
    InputField::ALL.map(|field| self.get(field) )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let input = InputVector::default();
    assert_eq!(input.to_features(), [25.0, 30.0, 10.0, 60.0, 12.0]);
  }

  #[test]
  fn last_write_wins() {
    let input = InputVector::default()
      .with(InputField::Temperature, 30.0)
      .with(InputField::Temperature, -4.5)
      .with(InputField::Humidity, 70.0);
    assert_eq!(input.get(InputField::Temperature), -4.5);
    assert_eq!(input.get(InputField::Humidity), 70.0);
    assert_eq!(input.get(InputField::CloudCover), 30.0);
  }

  #[test]
  fn no_validation() {
    let input = InputVector::default().with(InputField::WindSpeed, 1000.0);
    assert_eq!(input.wind_speed, 1000.0);
  }

  #[test]
  fn feature_order() {
    let input = InputVector {
      temperature: 1.0,
      cloud_cover: 2.0,
      wind_speed: 3.0,
      humidity: 4.0,
      time_of_day: 5.0,
    };
    assert_eq!(input.to_features(), [1.0, 2.0, 3.0, 4.0, 5.0]);
  }

  #[test]
  fn parse_field() {
    assert_eq!(InputField::parse("cloudCover"), Some(InputField::CloudCover));
    assert_eq!(InputField::parse("wind-speed"), Some(InputField::WindSpeed));
    assert_eq!(InputField::parse("TEMP"), Some(InputField::Temperature));
    assert_eq!(InputField::parse("pressure"), None);
  }

  #[test]
  fn time_of_day_is_not_deserialized() {
    assert!(serde_yaml::from_str::<InputVector>("time_of_day: 3").is_err());
    let text = serde_yaml::to_string(&InputVector::default()).unwrap();
    assert!(!text.contains("time_of_day"));
  }

  #[test]
  fn partial_yaml() {
    let input: InputVector = serde_yaml::from_str("temperature: 30\nhumidity: 70").unwrap();
    assert_eq!(input.to_features(), [30.0, 30.0, 10.0, 70.0, 12.0]);
  }
}
