use tracing::debug;

use crate::{
  error::{ Error, Result },
  input::{ InputField, InputVector },
  lifecycle::{ NetworkLifecycle, NetworkStatus },
  prediction::{ self, PredictionResult },
};


/// Everything a session knows: the readings, the network being fitted
/// and the last prediction shown.

#[derive(Debug)]
pub struct AppState {
  input: InputVector,
  lifecycle: NetworkLifecycle,
  prediction: Option<PredictionResult>,
}

impl AppState {
  pub fn new(input: InputVector, lifecycle: NetworkLifecycle) -> Self {
    Self { input, lifecycle, prediction: None }
  }

  pub fn input(&self) -> &InputVector {
    &self.input
  }

  pub fn set_input(&mut self, field: InputField, value: f32) {
    debug!(%field, value, "Input changed");
    self.input = self.input.with(field, value);
  }

  pub fn status(&self) -> &NetworkStatus {
    self.lifecycle.status()
  }

  pub fn poll(&mut self) -> &NetworkStatus {
    self.lifecycle.poll()
  }

  pub fn wait(&mut self) -> &NetworkStatus {
    self.lifecycle.wait()
  }

  /// Predict from the current readings and store the result.
  /// The stored prediction is left alone if the network is not usable.

  pub fn request_prediction(&mut self) -> Result<PredictionResult> {
    let result = match self.lifecycle.poll() {
      NetworkStatus::Ready(network) => prediction::invoke(network, &self.input),
      NetworkStatus::Unready => return Err(Error::NotReady),
      NetworkStatus::Failed(reason) => return Err(Error::Training(reason.clone())),
    };
    self.prediction = Some(result);
    Ok(result)
  }

  pub fn prediction(&self) -> Option<PredictionResult> {
    self.prediction
  }

  /// Last prediction, zero before the first one.

  pub fn displayed_prediction(&self) -> PredictionResult {
    self.prediction.unwrap_or_default()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use crate::{ config::TrainingConfig, lifecycle::train_network };

  fn ready_state() -> AppState {
    let config = TrainingConfig { seed: Some(3), ..Default::default() };
    let mut lifecycle = NetworkLifecycle::start(config);
    lifecycle.wait();
    AppState::new(InputVector::default(), lifecycle)
  }

  #[test]
  fn starts_at_zero() {
    let (lifecycle, _sender) = NetworkLifecycle::manual();
    let state = AppState::new(InputVector::default(), lifecycle);
    assert_eq!(state.prediction(), None);
    assert_eq!(state.displayed_prediction().to_string(), "0.00 kW");
  }

  #[test]
  fn not_ready_leaves_prediction_unchanged() {
    let (lifecycle, sender) = NetworkLifecycle::manual();
    let mut state = AppState::new(InputVector::default(), lifecycle);
    assert!(matches!(state.request_prediction(), Err(Error::NotReady)));
    assert_eq!(state.prediction(), None);

    sender.send(train_network(&TrainingConfig { seed: Some(4), ..Default::default() })).unwrap();
    let result = state.request_prediction().unwrap();
    assert_eq!(state.prediction(), Some(result));
  }

  #[test]
  fn failed_fit_is_reported() {
    let (lifecycle, sender) = NetworkLifecycle::manual();
    let mut state = AppState::new(InputVector::default(), lifecycle);
    sender.send(Err(Error::Training("diverged".into()))).unwrap();
    match state.request_prediction() {
      Err(Error::Training(reason)) => assert!(reason.contains("diverged")),
      other => panic!("unexpected {other:?}"),
    }
    assert_eq!(state.prediction(), None);
  }

  #[test]
  fn example_scenario() {
    let mut state = ready_state();
    state.set_input(InputField::Temperature, 30.0);
    state.set_input(InputField::CloudCover, 50.0);
    state.set_input(InputField::WindSpeed, 5.0);
    state.set_input(InputField::Humidity, 70.0);
    assert_eq!(state.input().to_features(), [30.0, 50.0, 5.0, 70.0, 12.0]);

    let result = state.request_prediction().unwrap();
    assert!(result.value() >= 0.0);
    let text = state.displayed_prediction().to_string();
    let number = text.strip_suffix(" kW").unwrap();
    assert_eq!(number.split('.').nth(1).map(str::len), Some(2));
    assert!(number.parse::<f32>().unwrap() >= 0.0);
  }

  #[test]
  fn repeated_predictions_agree() {
    let mut state = ready_state();
    let first = state.request_prediction().unwrap();
    let second = state.request_prediction().unwrap();
    assert_eq!(first, second);
  }

  proptest! {
    #[test]
    fn input_reflects_last_write(values in proptest::collection::vec((0usize..5, -100.0f32..100.0), 1..20)) {
      let (lifecycle, _sender) = NetworkLifecycle::manual();
      let mut state = AppState::new(InputVector::default(), lifecycle);
      for &(index, value) in &values {
        state.set_input(InputField::ALL[index], value);
      }
      for (index, field) in InputField::ALL.iter().enumerate() {
        let expected = values.iter().rev().find(|(i, _)| *i == index ).map(|(_, v)| *v )
          .unwrap_or_else(|| InputVector::default().get(*field) );
        prop_assert_eq!(state.input().get(*field), expected);
      }
    }
  }
}
