use crate::{
  shape::Shape,
  tensor::Tensor,
  variable::{ Variable, BinaryOp, UnaryOp },
  scalar::Real,
  ops::{ BaseOps, NumericOps, RealOps },
};


impl<T: Real> NumericOps<T> for Variable<T> {
  fn sum(&self, dim: isize) -> Variable<T> {
    self.unary_op(Sum { dim })
  }
}

impl<T: Real> RealOps<T> for Variable<T> {
  fn mm(&self, rhs: &Self) -> Self {
    self.binary_op(MatMul, rhs)
  }

  fn relu(&self) -> Variable<T> {
    self.unary_op(ReLU)
  }

  fn sqr(&self) -> Variable<T> {
    self.unary_op(Sqr)
  }
}

macro_rules! add_operator {
  ($op:ident, $meth:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op for &Variable<T> { // &tensor * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        let (lhs, rhs) = if self.shape().dims != rhs.shape().dims {
          (self.broadcast(rhs.shape()), rhs.broadcast(self.shape()))
        } else {
          (self.clone(), rhs.clone())
        };
        lhs.binary_op($op, &rhs)
      }
    }

    impl<T: Real> std::ops::$op for Variable<T> { // tensor * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Self) -> Variable<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<Variable<T>> for &Variable<T> { // &tensor * other
      type Output = Variable<T>;

      fn $meth(self, rhs: Variable<T>) -> Variable<T> {
        self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<&Variable<T>> for Variable<T> { // tensor * &other
      type Output = Variable<T>;

      fn $meth(self, rhs: &Variable<T>) -> Variable<T> {
        &self $symbol rhs
      }
    }

    impl<T: Real> std::ops::$op<T> for &Variable<T> { // &tensor * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        self $symbol &Tensor::scalar(rhs).tracked()
      }
    }

    impl<T: Real> std::ops::$op<T> for Variable<T> { // tensor * T
      type Output = Variable<T>;

      fn $meth(self, rhs: T) -> Variable<T> {
        &self $symbol &Tensor::scalar(rhs).tracked()
      }
    }
  };
}

add_operator!(Add, add, +);
add_operator!(Sub, sub, -);
add_operator!(Mul, mul, *);
add_operator!(Div, div, /);


#[derive(Debug, Clone)]
pub enum UnaryMops {
  Broadcast(Broadcast),
  Sum(Sum),
  ReLU(ReLU),
  Sqr(Sqr),
}

impl UnaryMops {
  pub fn as_unary_op<T: Real>(&self) -> &dyn UnaryOp<T> {
    match self {
      Self::Broadcast(op) => op,
      Self::Sum(op) => op,
      Self::ReLU(op) => op,
      Self::Sqr(op) => op,
    }
  }
}


#[derive(Debug, Clone)]
pub enum BinaryMops {
  Add(Add),
  Sub(Sub),
  Mul(Mul),
  Div(Div),
  MatMul(MatMul),
}

impl BinaryMops {
  pub fn as_binary_op<T: Real>(&self) -> &dyn BinaryOp<T> {
    match self {
      Self::Add(op) => op,
      Self::Sub(op) => op,
      Self::Mul(op) => op,
      Self::Div(op) => op,
      Self::MatMul(op) => op,
    }
  }
}


#[derive(Debug, Clone)]
pub struct Add;

impl<T: Real> BinaryOp<T> for Add {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs + rhs
  }

  fn derive(&self, _lhs: &Tensor<T>, _rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad.clone(),
    grad.clone(),
  )}

  fn as_enum(self) -> BinaryMops {
    BinaryMops::Add(self)
  }
}


#[derive(Debug, Clone)]
pub struct Sub;

impl<T: Real> BinaryOp<T> for Sub {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs - rhs
  }

  fn derive(&self, _lhs: &Tensor<T>, _rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad.clone(),
    -grad,
  )}

  fn as_enum(self) -> BinaryMops {
    BinaryMops::Sub(self)
  }
}


#[derive(Debug, Clone)]
pub struct Mul;

impl<T: Real> BinaryOp<T> for Mul {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs * rhs
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad * rhs,
    grad * lhs,
  )}

  fn as_enum(self) -> BinaryMops {
    BinaryMops::Mul(self)
  }
}


#[derive(Debug, Clone)]
pub struct Div;

impl<T: Real> BinaryOp<T> for Div {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs / rhs
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad / rhs,
    -(grad * lhs / rhs / rhs),
  )}

  fn as_enum(self) -> BinaryMops {
    BinaryMops::Div(self)
  }
}


#[derive(Debug, Clone)]
pub struct MatMul;

impl<T: Real> BinaryOp<T> for MatMul {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Tensor<T> {
    lhs.mm(rhs)
  }

  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>) -> (Tensor<T>, Tensor<T>)
  {(
    grad.mm(&rhs.transpose(0, 1)),
    lhs.transpose(0, 1).mm(grad),
  )}

  fn as_enum(self) -> BinaryMops {
    BinaryMops::MatMul(self)
  }
}


#[derive(Debug, Clone)]
pub struct Broadcast {
  pub(crate) dims: Vec<usize>,
}

impl<T: Real> UnaryOp<T> for Broadcast {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.broadcast(&Shape::new(&self.dims))
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    // Sum over every dimension that got stretched or prepended
    let rank = self.dims.len();
    let pad = rank - lhs.rank();
    let mut grad = grad.clone();
    for d in 0..rank {
      let own = if d < pad { 1 } else { lhs.shape().dims[d - pad] };
      if own == 1 && self.dims[d] != 1 {
        grad = grad.sum_over(d as isize);
      }
    }
    grad.reshape(&lhs.shape().dims)
  }

  fn as_enum(self) -> UnaryMops {
    UnaryMops::Broadcast(self)
  }
}


#[derive(Debug, Clone)]
pub struct Sum {
  dim: isize,
}

impl<T: Real> UnaryOp<T> for Sum {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.sum(self.dim)
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    // Restore collapsed dimensions, then stretch the gradient over them
    let mut dims = grad.shape().dims.clone();
    dims.resize(lhs.rank(), 1);
    grad
      .reshape(&dims)
      .broadcast(lhs.shape())
      .detach()
  }

  fn as_enum(self) -> UnaryMops {
    UnaryMops::Sum(self)
  }
}


#[derive(Debug, Clone)]
pub struct ReLU;

impl<T: Real> UnaryOp<T> for ReLU {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.relu()
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    grad * lhs.gt(&Tensor::scalar(T::zero())).numeric::<T>()
  }

  fn as_enum(self) -> UnaryMops {
    UnaryMops::ReLU(self)
  }
}


#[derive(Debug, Clone)]
pub struct Sqr;

impl<T: Real> UnaryOp<T> for Sqr {
  fn run(&self, lhs: &Tensor<T>) -> Tensor<T> {
    lhs.sqr()
  }

  fn derive(&self, lhs: &Tensor<T>, grad: &Tensor<T>) -> Tensor<T> {
    grad * lhs * T::from(2.0).unwrap()
  }

  fn as_enum(self) -> UnaryMops {
    UnaryMops::Sqr(self)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::ops::Hops;

  /// Compare the automatically derived gradient of `generator` against
  /// central finite differences and return the mean absolute deviation.

  fn check_gradients<F>(shape: &[usize], generator: F) -> f64
  where
    F: Fn(&Variable<f64>) -> Variable<f64>
  {
    let eps = 1e-4;
    let input = Tensor::randn_with(shape, &mut rand::thread_rng());
    let var = input.trained();
    let output = generator(&var).sum(0);
    output.backward();
    let grad = var.grad().unwrap().to_vec();
    let values = input.to_vec();
    let mut total = 0.0;
    for i in 0..values.len() {
      let nudge = |delta: f64| {
        let mut nudged = values.clone();
        nudged[i] += delta;
        generator(&Tensor::new(shape, nudged).tracked()).sum(0).item()
      };
      let numeric = (nudge(eps) - nudge(-eps)) / (2.0 * eps);
      total += (numeric - grad[i]).abs();
    }
    total / values.len() as f64
  }

  #[test]
  fn arithmetic_gradients() {
    assert!(check_gradients(&[3, 2], |x| x * x - x ) < 1e-5);
    assert!(check_gradients(&[4], |x| x / &(x * x + 1.0) ) < 1e-5);
  }

  #[test]
  fn matmul_gradients() {
    let w = Tensor::randn_with(&[2, 3], &mut rand::thread_rng()).tracked();
    assert!(check_gradients(&[4, 2], |x| x.mm(&w) ) < 1e-5);
    let x = Tensor::randn_with(&[4, 2], &mut rand::thread_rng()).tracked();
    assert!(check_gradients(&[2, 3], |w| x.mm(w) ) < 1e-5);
  }

  #[test]
  fn broadcast_gradients() {
    let m = Tensor::randn_with(&[5, 3], &mut rand::thread_rng()).tracked();
    assert!(check_gradients(&[3], |b| &m + b ) < 1e-5);
    assert!(check_gradients(&[1, 3], |b| &m * b ) < 1e-5);
  }

  #[test]
  fn reduction_gradients() {
    assert!(check_gradients(&[3, 4], |x| x.sum(-1) ) < 1e-5);
    assert!(check_gradients(&[3, 4], |x| x.sqr().mean(0) ) < 1e-5);
  }

  #[test]
  fn relu_gradient() {
    let x = Tensor::vec(&[-1.0, 2.0]).trained();
    let y = x.relu().sum(0);
    y.backward();
    assert_eq!(x.grad(), Some(&Tensor::vec(&[0.0, 1.0])));
  }

  #[test]
  fn mse_gradient() {
    let pred = Tensor::new(&[2, 1], vec![1.0, 3.0]).trained();
    let target = Tensor::new(&[2, 1], vec![0.0, 1.0]).tracked();
    let loss = pred.mse(&target);
    assert_eq!(loss.item(), 2.5);
    loss.backward();
    assert_eq!(pred.grad(), Some(&Tensor::new(&[2, 1], vec![1.0, 2.0])));
  }
}
