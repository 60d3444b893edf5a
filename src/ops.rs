use std::ops::{ Sub, Div };

use crate::internal::*;
use crate::Shape;
use crate::scalar::{ Inner, Numeric, Real };


/// Differentiable mid-level operations that are also implemented
/// for non-differentiable [Inner] types.

pub trait BaseOps<I: Inner>: Clone {
  fn scalar(item: I) -> Self;
  fn shape(&self) -> &Shape;
  fn broadcast(&self, shape: &Shape) -> Self;
}


/// Differentiable mid-level operations that are also implemented
/// for non-differentiable [Numeric] inner types.

pub trait NumericOps<I: Numeric>: Sized {
  fn sum(&self, dim: isize) -> Self;
}


/// Differentiable mid-level operations.

pub trait RealOps<I: Real> {
  fn mm(&self, rhs: &Self) -> Self;
  fn relu(&self) -> Self;
  fn sqr(&self) -> Self;
}


/// High-level operations, implemented exclusively on top of
/// mid-level operations. As a result, these are all
/// differentiable when called on a [Variable](crate::Variable).

pub trait Hops<I>: BaseOps<I> + NumericOps<I> + RealOps<I>
where
  I: Real,
  for<'a> &'a Self: Sub<&'a Self, Output = Self> + Div<I, Output = Self>,
{
  fn mean(&self, dim: isize) -> Self {
    let udim = negative_index(dim, self.shape().rank());
    let n: usize = self.shape().dims[udim..].iter().product();
    let n = I::from(n).unwrap();
    &self.sum(dim) / n
  }

  /// Mean squared error against `target`, reduced to a scalar.

  fn mse(&self, target: &Self) -> Self {
    (self - target).sqr().mean(0)
  }
}
