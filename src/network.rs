use rand::{ Rng, seq::SliceRandom };
use tracing::debug;

use crate::{
  error::{ Error, Result },
  scalar::Real,
  tensor::Tensor,
  variable::Variable,
  optimize::{ Optimizer, Strategy },
  ops::{ Hops, RealOps },
};


/// Elementwise function applied to a layer's output.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
  Relu,
  Linear,
}

impl Activation {
  fn differentiate<R: Real>(self, x: Variable<R>) -> Variable<R> {
    match self {
      Self::Relu => x.relu(),
      Self::Linear => x,
    }
  }

  fn evaluate<R: Real>(self, x: Tensor<R>) -> Tensor<R> {
    match self {
      Self::Relu => x.relu(),
      Self::Linear => x,
    }
  }
}


/// Fully connected layer with Glorot-initialized weights and zero bias.

#[derive(Debug, Clone)]
pub struct Dense<R: Real> {
  weights: Variable<R>,
  bias: Variable<R>,
  activation: Activation,
}

impl<R: Real> Dense<R> {
  pub fn new<G: Rng + ?Sized>(inputs: usize, units: usize, activation: Activation, rng: &mut G) -> Self {
    Self {
      weights: Tensor::glorot_uniform_with(&[inputs, units], rng).trained(),
      bias: Tensor::zeros(&[units]).trained(),
      activation,
    }
  }

  pub fn inputs(&self) -> usize {
    self.weights.dim(0)
  }

  pub fn units(&self) -> usize {
    self.weights.dim(1)
  }

  pub fn activation(&self) -> Activation {
    self.activation
  }

  /// Differentiable pass, recording the computation graph.

  pub fn forward(&self, input: &Variable<R>) -> Variable<R> {
    self.activation.differentiate(input.mm(&self.weights) + &self.bias)
  }

  /// Plain evaluation without any graph bookkeeping.

  pub fn infer(&self, input: &Tensor<R>) -> Tensor<R> {
    self.activation.evaluate(input.mm(self.weights.tensor()) + self.bias.tensor())
  }

  pub fn parameters(&self) -> [Variable<R>; 2] {
    [self.weights.clone(), self.bias.clone()]
  }
}


/// Stack of [Dense] layers evaluated in order.

#[derive(Debug, Clone)]
pub struct Sequential<R: Real> {
  layers: Vec<Dense<R>>,
}

impl<R: Real> Default for Sequential<R> {
  fn default() -> Self {
    Self { layers: vec![] }
  }
}

impl<R: Real> Sequential<R> {
  /// Two layer regressor: `inputs -> hidden (ReLU) -> outputs (linear)`.

  pub fn regressor<G: Rng + ?Sized>(inputs: usize, hidden: usize, outputs: usize, rng: &mut G) -> Self {
    Self {
      layers: vec![
        Dense::new(inputs, hidden, Activation::Relu, rng),
        Dense::new(hidden, outputs, Activation::Linear, rng),
      ],
    }
  }

  pub fn push(&mut self, layer: Dense<R>) -> Result<()> {
    if let Some(last) = self.layers.last() {
      if last.units() != layer.inputs() {
        return Err(Error::Shape(format!(
          "layer expects {} inputs but previous layer has {} units", layer.inputs(), last.units())))
      }
    }
    self.layers.push(layer);
    Ok(())
  }

  pub fn layers(&self) -> &[Dense<R>] {
    &self.layers
  }

  pub fn input_size(&self) -> usize {
    self.layers.first().map_or(0, |layer| layer.inputs() )
  }

  pub fn output_size(&self) -> usize {
    self.layers.last().map_or(0, |layer| layer.units() )
  }

  pub fn forward(&self, input: &Variable<R>) -> Variable<R> {
    self.layers.iter().fold(input.clone(), |x, layer| layer.forward(&x) )
  }

  /// Evaluate a `[batch, inputs]` tensor, producing `[batch, outputs]`.

  pub fn predict(&self, input: &Tensor<R>) -> Tensor<R> {
    self.layers.iter().fold(input.clone(), |x, layer| layer.infer(&x) )
  }

  pub fn parameters(&self) -> Vec<Variable<R>> {
    self.layers.iter().flat_map(|layer| layer.parameters() ).collect()
  }

  pub fn parameter_count(&self) -> usize {
    self.parameters().iter().map(|param| param.size() ).sum()
  }
}


/// Objective minimized during fitting.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
  #[default]
  MeanSquaredError,
}

impl Loss {
  pub fn compute<R: Real>(self, prediction: &Variable<R>, target: &Variable<R>) -> Variable<R> {
    match self {
      Self::MeanSquaredError => prediction.mse(target),
    }
  }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitOptions {
  pub epochs: usize,
  pub batch_size: usize,
  pub shuffle: bool,
}

impl Default for FitOptions {
  fn default() -> Self {
    Self { epochs: 1, batch_size: 32, shuffle: true }
  }
}


/// Mean training loss of every completed epoch.

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport<R: Real> {
  pub epoch_losses: Vec<R>,
}

impl<R: Real> FitReport<R> {
  pub fn epochs(&self) -> usize {
    self.epoch_losses.len()
  }

  pub fn final_loss(&self) -> Option<R> {
    self.epoch_losses.last().copied()
  }
}


/// A [Sequential] model compiled together with an optimizer and a loss.

#[derive(Debug)]
pub struct Regressor<R: Real, S: Strategy<R>> {
  model: Sequential<R>,
  optimizer: Optimizer<R, S>,
  loss: Loss,
}

impl<R: Real, S: Strategy<R>> Regressor<R, S> {
  pub fn compile(model: Sequential<R>, optimizer: Optimizer<R, S>, loss: Loss) -> Self {
    Self { model, optimizer, loss }
  }

  pub fn model(&self) -> &Sequential<R> {
    &self.model
  }

  pub fn into_model(self) -> Sequential<R> {
    self.model
  }

  /// Train on `features` `[samples, inputs]` against `targets` `[samples, outputs]`
  /// in shuffled mini-batches.

  pub fn fit<G: Rng + ?Sized>(&mut self, features: &Tensor<R>, targets: &Tensor<R>, options: &FitOptions, rng: &mut G) -> Result<FitReport<R>> {
    self.check_data(features, targets)?;
    if options.batch_size == 0 {
      return Err(Error::Config("batch size must be positive".into()))
    }

    let samples = features.dim(0);
    let mut order: Vec<usize> = (0..samples).collect();
    let params = self.model.parameters();
    let mut epoch_losses = Vec::with_capacity(options.epochs);

    for epoch in 1..=options.epochs {
      if options.shuffle {
        order.shuffle(rng);
      }
      let mut total = R::zero();
      for batch in order.chunks(options.batch_size) {
        let inputs = features.select_rows(batch).tracked();
        let expected = targets.select_rows(batch).tracked();
        let loss = self.loss.compute(&self.model.forward(&inputs), &expected);
        total += loss.item() * R::from(batch.len()).unwrap();
        self.optimizer.minimize(&loss, &params);
      }
      let epoch_loss = total / R::from(samples).unwrap();
      if !epoch_loss.is_finite() {
        return Err(Error::Training(format!("loss diverged in epoch {epoch}")))
      }
      debug!(epoch, loss = ?epoch_loss, "Finished epoch");
      epoch_losses.push(epoch_loss);
    }

    Ok(FitReport { epoch_losses })
  }

  fn check_data(&self, features: &Tensor<R>, targets: &Tensor<R>) -> Result<()> {
    if features.rank() != 2 || targets.rank() != 2 {
      return Err(Error::Shape("features and targets must be matrices".into()))
    }
    if features.dim(0) == 0 {
      return Err(Error::Shape("no training samples".into()))
    }
    if features.dim(0) != targets.dim(0) {
      return Err(Error::Shape(format!(
        "{} feature rows but {} target rows", features.dim(0), targets.dim(0))))
    }
    if features.dim(1) != self.model.input_size() {
      return Err(Error::Shape(format!(
        "model takes {} features, got {}", self.model.input_size(), features.dim(1))))
    }
    if targets.dim(1) != self.model.output_size() {
      return Err(Error::Shape(format!(
        "model produces {} outputs, got {} targets", self.model.output_size(), targets.dim(1))))
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use rand::{ SeedableRng, rngs::StdRng };
  use crate::optimize::Adam;
  use crate::ops::{ BaseOps, NumericOps };

  fn regressor(seed: u64) -> Regressor<f32, Adam<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let model = Sequential::regressor(5, 10, 1, &mut rng);
    Regressor::compile(model, Optimizer::new(0.001, Adam::default()), Loss::MeanSquaredError)
  }

  #[test]
  fn architecture() {
    let model = regressor(0).into_model();
    assert_eq!(model.layers().len(), 2);
    assert_eq!(model.layers()[0].activation(), Activation::Relu);
    assert_eq!(model.layers()[1].activation(), Activation::Linear);
    assert_eq!(model.input_size(), 5);
    assert_eq!(model.output_size(), 1);
    assert_eq!(model.parameter_count(), 5 * 10 + 10 + 10 + 1);
  }

  #[test]
  fn predict_matches_forward() {
    let model = regressor(1).into_model();
    let x = Tensor::randn_with(&[3, 5], &mut StdRng::seed_from_u64(1));
    let inferred = model.predict(&x);
    let traced = model.forward(&x.tracked());
    assert_eq!(inferred.shape().dims, vec![3, 1]);
    for (a, b) in inferred.param_iter().zip(traced.param_iter()) {
      assert!((a - b).abs() < 1e-6);
    }
  }

  #[test]
  fn push_rejects_mismatched_layer() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = Sequential::<f32>::default();
    model.push(Dense::new(5, 4, Activation::Relu, &mut rng)).unwrap();
    assert!(matches!(model.push(Dense::new(3, 1, Activation::Linear, &mut rng)), Err(Error::Shape(_))));
  }

  #[test]
  fn fit_reports_every_epoch() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut regressor = regressor(3);
    let x = Tensor::randn_with(&[100, 5], &mut rng);
    let y = Tensor::randn_with(&[100, 1], &mut rng);
    let report = regressor.fit(&x, &y, &FitOptions { epochs: 10, ..Default::default() }, &mut rng).unwrap();
    assert_eq!(report.epochs(), 10);
    assert!(report.epoch_losses.iter().all(|loss| loss.is_finite() && *loss >= 0.0 ));
  }

  #[test]
  fn fit_learns_linear_function() {
    let mut rng = StdRng::seed_from_u64(4);
    let model = Sequential::<f64>::regressor(2, 8, 1, &mut rng);
    let mut regressor = Regressor::compile(model, Optimizer::new(0.01, Adam::default()), Loss::MeanSquaredError);
    let x = Tensor::uniform_with(&[64, 2], 0.0, 1.0, &mut rng);
    let y = (&x.sum(-1) * 0.5).reshape(&[64, 1]);
    let options = FitOptions { epochs: 100, batch_size: 16, shuffle: true };
    let report = regressor.fit(&x, &y, &options, &mut rng).unwrap();
    let first = report.epoch_losses[0];
    let last = report.final_loss().unwrap();
    assert!(last < first / 4.0, "loss went from {first} to {last}");
  }

  #[test]
  fn fit_rejects_bad_data() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut regressor = regressor(5);
    let x = Tensor::zeros(&[10, 4]);
    let y = Tensor::zeros(&[10, 1]);
    assert!(matches!(regressor.fit(&x, &y, &FitOptions::default(), &mut rng), Err(Error::Shape(_))));
    let x = Tensor::zeros(&[10, 5]);
    let y = Tensor::zeros(&[9, 1]);
    assert!(matches!(regressor.fit(&x, &y, &FitOptions::default(), &mut rng), Err(Error::Shape(_))));
    let y = Tensor::zeros(&[10, 1]);
    let options = FitOptions { batch_size: 0, ..Default::default() };
    assert!(matches!(regressor.fit(&x, &y, &options, &mut rng), Err(Error::Config(_))));
  }

}
