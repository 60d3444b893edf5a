use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::{
  error::{ Error, Result },
  input::InputVector,
  optimize::OptimizerKind,
  ui::SLIDERS,
};


/// How the network is built and fitted at startup.
/// Any field may be omitted from a configuration file.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
  /// Number of synthetic training pairs
  pub samples: usize,
  /// Width of the hidden layer
  pub hidden_units: usize,
  /// Passes over the training data
  pub epochs: usize,
  pub batch_size: usize,
  pub learning_rate: f32,
  pub optimizer: OptimizerKind,
  /// Reshuffle the samples before every epoch
  pub shuffle: bool,
  /// Fixes weight initialization, data and shuffling if set
  pub seed: Option<u64>,
}

impl Default for TrainingConfig {
  fn default() -> Self {
    Self {
      samples: 100,
      hidden_units: 10,
      epochs: 10,
      batch_size: 32,
      learning_rate: 0.001,
      optimizer: OptimizerKind::default(),
      shuffle: true,
      seed: None,
    }
  }
}

impl TrainingConfig {
  pub fn validate(&self) -> Result<()> {
    if self.samples == 0 {
      return Err(Error::Config("samples must be positive".into()))
    }
    if self.hidden_units == 0 {
      return Err(Error::Config("hidden_units must be positive".into()))
    }
    if self.batch_size == 0 {
      return Err(Error::Config("batch_size must be positive".into()))
    }
    if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
      return Err(Error::Config(format!("learning_rate must be positive, got {}", self.learning_rate)))
    }
    Ok(())
  }
}


/// Values given on the command line, taking precedence over the file.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
  pub seed: Option<u64>,
  pub epochs: Option<usize>,
}


/// Complete application configuration as read from YAML.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
  pub training: TrainingConfig,
  /// Initial slider positions
  pub inputs: InputVector,
}

impl AppConfig {
  pub fn from_yaml(text: &str) -> Result<Self> {
    let config: Self = serde_yaml::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  /// Check training parameters and that every initial reading
  /// is a position its slider can take.

  pub fn validate(&self) -> Result<()> {
    self.training.validate()?;
    for slider in &SLIDERS {
      let value = self.inputs.get(slider.field);
      if !slider.contains(value) {
        return Err(Error::Config(format!(
          "{} must be within {} .. {} {}, got {value}", slider.field, slider.min, slider.max, slider.unit)))
      }
    }
    Ok(())
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)
      .map_err(|source| Error::Io { path: path.to_path_buf(), source } )?;
    Self::from_yaml(&text)
  }

  /// Read `path` if given, fall back to defaults otherwise.

  pub fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::from_file(path),
      None => Ok(Self::default()),
    }
  }

  /// Apply command line values on top of whatever was loaded.

  pub fn merge(mut self, overrides: &Overrides) -> Result<Self> {
    self.training.seed = overrides.seed.or(self.training.seed);
    self.training.epochs = overrides.epochs.unwrap_or(self.training.epochs);
    self.validate()?;
    Ok(self)
  }
}
