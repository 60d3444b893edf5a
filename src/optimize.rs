use std::collections::HashMap;

use serde::{ Serialize, Deserialize };

use crate::{
  scalar::Real,
  tensor::Tensor,
  variable::Variable,
  ops::{ BaseOps, RealOps },
};


/// An optimization strategy to be used with [Optimizer].

pub trait Strategy<R: Real> {
  fn update(&mut self, param: &Variable<R>, grad: &Tensor<R>, rate: R, step: usize) -> Tensor<R>;
}


/// Generic optimizer that allows for several optimization [strategies](Strategy) to be used.

#[derive(Debug)]
pub struct Optimizer<R: Real, S: Strategy<R>> {
  strategy: S,
  pub learning_rate: R,
  step: usize,
}

impl<R: Real, S: Strategy<R>> Optimizer<R, S> {
  pub fn new(learning_rate: R, strategy: S) -> Self {
    Self { strategy, learning_rate, step: 1 }
  }

  pub fn step(&self) -> usize {
    self.step
  }

  pub fn minimize(&mut self, loss: &Variable<R>, params: &[Variable<R>]) {
    // Compute gradients
    loss.backward();

    // Optimize individual parameters
    for param in params {
      let Some(grad) = param.grad() else { continue };

      // Execute strategy
      let change = self.strategy.update(param, grad, self.learning_rate, self.step);

      // Apply change
      let weights = param.tensor();
      weights.assign(&(weights + change));
    }

    // Reset gradients
    loss.reset();

    self.step += 1;
  }
}


/// Stochastic Gradient Descent strategy

#[derive(Debug, Clone, Default)]
pub struct SGD;

impl<R: Real> Strategy<R> for SGD {
  fn update(&mut self, _param: &Variable<R>, grad: &Tensor<R>, rate: R, _step: usize) -> Tensor<R> {
    grad * -rate
  }
}


/// Adaptive Movement Estimation strategy (ADAM)

#[derive(Debug, Clone)]
pub struct Adam<R: Real> {
  pub beta1: R,
  pub beta2: R,
  pub epsilon: R,
  m: HashMap<usize, Tensor<R>>,
  v: HashMap<usize, Tensor<R>>,
}

impl<R: Real> Adam<R> {
  pub fn new(beta1: R, beta2: R) -> Self {
    Self {
      beta1,
      beta2,
      epsilon: R::from(1e-8).unwrap(),
      m: HashMap::new(),
      v: HashMap::new(),
    }
  }
}

impl<R: Real> Default for Adam<R> {
  fn default() -> Self {
    Self::new(R::from(0.9).unwrap(), R::from(0.999).unwrap())
  }
}

impl<R: Real> Strategy<R> for Adam<R> {
  fn update(&mut self, param: &Variable<R>, grad: &Tensor<R>, rate: R, step: usize) -> Tensor<R> {
    let id = param.id();
    let dims = &param.tensor().shape().dims;
    let m = self.m.entry(id).or_insert_with(|| Tensor::zeros(dims) );
    m.assign(&(&*m * self.beta1 + grad * (R::one() - self.beta1)));
    let v = self.v.entry(id).or_insert_with(|| Tensor::zeros(dims) );
    v.assign(&(&*v * self.beta2 + grad.sqr() * (R::one() - self.beta2)));
    let step = R::from(step).unwrap();
    let mt = &self.m[&id] / (R::one() - self.beta1.powf(step));
    let vt = &self.v[&id] / (R::one() - self.beta2.powf(step));
    mt * -rate / (vt.sqrt() + self.epsilon)
  }
}


/// Optimization strategies selectable at runtime.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
  #[default]
  Adam,
  Sgd,
}

impl OptimizerKind {
  pub fn strategy<R: Real>(self) -> Strategies<R> {
    match self {
      Self::Adam => Strategies::Adam(Adam::default()),
      Self::Sgd => Strategies::Sgd(SGD),
    }
  }
}

impl std::fmt::Display for OptimizerKind {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Self::Adam => write!(f, "adam"),
      Self::Sgd => write!(f, "sgd"),
    }
  }
}


#[derive(Debug, Clone)]
pub enum Strategies<R: Real> {
  Adam(Adam<R>),
  Sgd(SGD),
}

impl<R: Real> Strategy<R> for Strategies<R> {
  fn update(&mut self, param: &Variable<R>, grad: &Tensor<R>, rate: R, step: usize) -> Tensor<R> {
    match self {
      Self::Adam(adam) => adam.update(param, grad, rate, step),
      Self::Sgd(sgd) => sgd.update(param, grad, rate, step),
    }
  }
}
