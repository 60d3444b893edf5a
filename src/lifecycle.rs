use std::{ sync::Arc, thread };

use crossbeam::channel::{ self, Receiver, TryRecvError };
use rand::{ SeedableRng, rngs::StdRng };
use tracing::{ debug, info, warn };

use crate::{
  error::Result,
  config::TrainingConfig,
  data::SyntheticData,
  input::InputVector,
  network::{ FitOptions, FitReport, Loss, Regressor, Sequential },
  optimize::Optimizer,
  tensor::Tensor,
};

/// Width of the network input, one per [InputField](crate::input::InputField).
pub const FEATURES: usize = 5;


/// A fitted regressor. Never trained again once constructed.

#[derive(Debug)]
pub struct TrainedNetwork {
  model: Sequential<f32>,
  report: FitReport<f32>,
}

impl TrainedNetwork {
  /// Single forward pass on a `1 x 5` batch, without clamping.

  pub fn predict_raw(&self, input: &InputVector) -> f32 {
    let x = Tensor::new(&[1, FEATURES], input.to_features().to_vec());
    self.model.predict(&x).item()
  }

  pub fn model(&self) -> &Sequential<f32> {
    &self.model
  }

  pub fn report(&self) -> &FitReport<f32> {
    &self.report
  }
}


/// Build, compile and fit a regressor on freshly generated synthetic data.
/// Runs to completion on the calling thread.

pub fn train_network(config: &TrainingConfig) -> Result<TrainedNetwork> {
  config.validate()?;

  let mut rng = match config.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  let model = Sequential::regressor(FEATURES, config.hidden_units, 1, &mut rng);
  let optimizer = Optimizer::new(config.learning_rate, config.optimizer.strategy());
  let mut regressor = Regressor::compile(model, optimizer, Loss::MeanSquaredError);
  debug!(parameters = regressor.model().parameter_count(), optimizer = %config.optimizer, "Compiled regressor");

  let data = SyntheticData::generate(config.samples, FEATURES, &mut rng);
  let options = FitOptions {
    epochs: config.epochs,
    batch_size: config.batch_size,
    shuffle: config.shuffle,
  };
  let report = regressor.fit(&data.features, &data.targets, &options, &mut rng)?;
  info!(epochs = report.epochs(), loss = ?report.final_loss(), "Fitted network");

  Ok(TrainedNetwork { model: regressor.into_model(), report })
}


/// Readiness of the background fit.

#[derive(Debug, Clone)]
pub enum NetworkStatus {
  Unready,
  Ready(Arc<TrainedNetwork>),
  Failed(String),
}

impl NetworkStatus {
  pub fn is_ready(&self) -> bool {
    matches!(self, Self::Ready(_))
  }

  pub fn is_terminal(&self) -> bool {
    !matches!(self, Self::Unready)
  }
}

impl std::fmt::Display for NetworkStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Self::Unready => write!(f, "training"),
      Self::Ready(_) => write!(f, "ready"),
      Self::Failed(reason) => write!(f, "failed ({reason})"),
    }
  }
}


/// Owns the fit running on a background thread and tracks its outcome.
///
/// Dropping the lifecycle detaches the thread; its result is discarded.

#[derive(Debug)]
pub struct NetworkLifecycle {
  status: NetworkStatus,
  receiver: Option<Receiver<Result<TrainedNetwork>>>,
}

impl NetworkLifecycle {
  pub fn start(config: TrainingConfig) -> Self {
    let (sender, receiver) = channel::bounded(1);
    let spawned = thread::Builder::new()
      .name("network-fit".into())
      .spawn(move || {
        // Receiver may be gone already
        let _ = sender.send(train_network(&config));
      });

    match spawned {
      Ok(_) => {
        info!("Started background fit");
        Self { status: NetworkStatus::Unready, receiver: Some(receiver) }
      },
      Err(err) => {
        warn!(%err, "Could not spawn fitting thread");
        Self { status: NetworkStatus::Failed(err.to_string()), receiver: None }
      },
    }
  }

  pub fn status(&self) -> &NetworkStatus {
    &self.status
  }

  /// Check for a finished fit without blocking.

  pub fn poll(&mut self) -> &NetworkStatus {
    if let Some(receiver) = &self.receiver {
      match receiver.try_recv() {
        Ok(result) => self.finish(result),
        Err(TryRecvError::Empty) => {},
        Err(TryRecvError::Disconnected) => self.abort(),
      }
    }
    &self.status
  }

  /// Block until the fit either succeeded or failed.

  pub fn wait(&mut self) -> &NetworkStatus {
    if let Some(receiver) = &self.receiver {
      match receiver.recv() {
        Ok(result) => self.finish(result),
        Err(_) => self.abort(),
      }
    }
    &self.status
  }

  fn finish(&mut self, result: Result<TrainedNetwork>) {
    self.receiver = None;
    self.status = match result {
      Ok(network) => {
        info!("Network ready");
        NetworkStatus::Ready(Arc::new(network))
      },
      Err(err) => {
        warn!(%err, "Network fit failed");
        NetworkStatus::Failed(err.to_string())
      },
    };
  }

  fn abort(&mut self) {
    warn!("Fitting thread exited without a result");
    self.receiver = None;
    self.status = NetworkStatus::Failed("fitting thread exited without a result".into());
  }

  #[cfg(test)]
  pub(crate) fn manual() -> (Self, channel::Sender<Result<TrainedNetwork>>) {
    let (sender, receiver) = channel::bounded(1);
    (Self { status: NetworkStatus::Unready, receiver: Some(receiver) }, sender)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  fn seeded(seed: u64) -> TrainingConfig {
    TrainingConfig { seed: Some(seed), ..Default::default() }
  }

  #[test]
  fn trains_with_defaults() {
    let network = train_network(&seeded(0)).unwrap();
    assert_eq!(network.model().input_size(), 5);
    assert_eq!(network.model().output_size(), 1);
    assert_eq!(network.model().layers()[0].units(), 10);
    assert_eq!(network.report().epochs(), 10);
    assert!(network.predict_raw(&InputVector::default()).is_finite());
  }

  #[test]
  fn seeded_training_is_reproducible() {
    let a = train_network(&seeded(42)).unwrap();
    let b = train_network(&seeded(42)).unwrap();
    let input = InputVector::default();
    assert_eq!(a.predict_raw(&input), b.predict_raw(&input));
    assert_eq!(a.report(), b.report());
  }

  #[test]
  fn invalid_config_fails() {
    let config = TrainingConfig { hidden_units: 0, ..Default::default() };
    assert!(matches!(train_network(&config), Err(Error::Config(_))));
  }

  #[test]
  fn background_fit_becomes_ready() {
    let mut lifecycle = NetworkLifecycle::start(seeded(1));
    assert!(lifecycle.wait().is_ready());
    assert!(lifecycle.poll().is_ready());
  }

  #[test]
  fn background_fit_reports_failure() {
    let config = TrainingConfig { batch_size: 0, ..Default::default() };
    let mut lifecycle = NetworkLifecycle::start(config);
    assert!(matches!(lifecycle.wait(), NetworkStatus::Failed(_)));
  }

  #[test]
  fn unready_until_delivered() {
    let (mut lifecycle, sender) = NetworkLifecycle::manual();
    assert!(matches!(lifecycle.poll(), NetworkStatus::Unready));
    sender.send(train_network(&seeded(2))).unwrap();
    assert!(lifecycle.poll().is_ready());
  }

  #[test]
  fn lost_thread_fails() {
    let (mut lifecycle, sender) = NetworkLifecycle::manual();
    drop(sender);
    assert!(matches!(lifecycle.poll(), NetworkStatus::Failed(_)));
    assert!(lifecycle.status().is_terminal());
  }
}
