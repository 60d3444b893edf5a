use tracing::debug;

use crate::{ input::InputVector, lifecycle::TrainedNetwork };


/// Predicted solar production in kW. Never negative.

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct PredictionResult(f32);

impl PredictionResult {
  /// Clamp raw network output at zero. NaN maps to zero as well.

  pub fn clamped(raw: f32) -> Self {
    Self(if raw > 0.0 { raw } else { 0.0 })
  }

  pub fn value(self) -> f32 {
    self.0
  }
}

impl std::fmt::Display for PredictionResult {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{:.2} kW", self.0)
  }
}


/// Run one forward pass for the given readings.

pub fn invoke(network: &TrainedNetwork, input: &InputVector) -> PredictionResult {
  let raw = network.predict_raw(input);
  let result = PredictionResult::clamped(raw);
  debug!(raw, %result, "Predicted");
  result
}
