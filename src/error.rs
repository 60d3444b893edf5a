//! Error type shared by the library and the binary.

use std::path::PathBuf;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum Error {
  /// A configuration value is out of its accepted range.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// A file could not be read.
  #[error("could not read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A configuration file is not valid YAML for [AppConfig](crate::config::AppConfig).
  #[error("could not parse configuration: {0}")]
  Yaml(#[from] serde_yaml::Error),

  /// Training data doesn't fit the network it is fed to.
  #[error("shape mismatch: {0}")]
  Shape(String),

  /// A prediction was requested before the network finished fitting.
  #[error("network is not ready yet")]
  NotReady,

  /// Fitting the network failed.
  #[error("network training failed: {0}")]
  Training(String),

  /// Reading commands or writing output failed.
  #[error("terminal i/o failed: {0}")]
  Terminal(#[from] std::io::Error),

  /// A line of user input could not be understood.
  #[error("{0}")]
  Command(String),
}

pub type Result<T> = std::result::Result<T, Error>;
