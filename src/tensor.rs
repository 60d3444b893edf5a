use std::fmt::Debug;

use rand::Rng;
use parking_lot::{ RwLock, RwLockReadGuard, RwLockWriteGuard };

mod cops;
mod lops;

pub use cops::Gemm;

use crate::{
  internal::*,
  shape::Shape,
  variable::Variable,
  scalar::{ Inner, Numeric, Real },
  ops::{ BaseOps, Hops },
};


/// Multidimensional array.
///
/// Tensors may contain any type that satisfies [Inner], but
/// additional methods are available for [Numeric] and [Real]
/// inner types.
///
/// Storage is shared between a tensor and all views derived from it and
/// sits behind a lock, so tensors can be moved to and read from other threads.
///
/// [Real] tensor types can be wrapped in a [Variable] by
/// calling [tracked](Tensor::tracked) or [trained](Tensor::trained).

#[derive(Debug, Clone)]
pub struct Tensor<T: Inner> {
  shape: Shape,
  data: RcT<RwLock<Vec<T>>>,
}

impl<T: Real> Hops<T> for Tensor<T> {}

impl<T: Inner> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    if self.shape.squeeze().dims != rhs.shape.squeeze().dims { return false }
    self.param_iter().zip(rhs.param_iter()).all(|(a, b)| a == b )
  }
}

impl<T: Inner> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    assert_eq!(shape.size(), data.len(),
      "{} doesn't match data length {}", shape, data.len());
    Self { shape, data: RcT::new(RwLock::new(data)) }
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Self {
    Self::from_shape(Shape::new(shape), data)
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::new(&[vec.len()], vec.to_vec())
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::new(shape, vec![filler; shape.iter().product()])
  }

  pub(crate) fn raw(&self) -> RwLockReadGuard<Vec<T>> {
    self.data.read_recursive()
  }

  pub(crate) fn raw_mut(&self) -> RwLockWriteGuard<Vec<T>> {
    self.data.write()
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  pub fn dim(&self, dim: isize) -> usize {
    self.shape[dim]
  }

  pub fn shared_with(&self, other: &Self) -> bool {
    RcT::ptr_eq(&self.data, &other.data)
  }

  /// Overwrite this tensor's elements in place with those of `other`,
  /// broadcasting `other` if necessary.

  pub fn assign(&self, other: &Self) {
    // Avoid clashing borrow when tensors share storage
    let other = if self.shared_with(other) {
      other.detach()
    } else {
      other.clone()
    };
    let other = other.broadcast(&self.shape);
    assert!(self.shape.squeeze().dims == other.shape.squeeze().dims,
      "Could not assign {} tensor to {} tensor", other.shape, self.shape);
    let values: Vec<T> = other.param_iter().collect();
    let mut data = self.raw_mut();
    for (i, value) in self.shape.iter().zip(values) {
      data[i] = value;
    }
  }

  pub fn refill(&self, filler: T) {
    let mut data = self.raw_mut();
    for i in self.shape.iter() {
      data[i] = filler;
    }
  }

  pub fn contiguous(&self) -> Self {
    if self.shape.contiguous() {
      self.clone()
    } else {
      self.detach()
    }
  }

  pub fn detach(&self) -> Self {
    self.vectorize(|a| a )
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.param_iter().collect()
  }

  pub fn zip<O,F>(&self, rhs: &Self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn((T, T)) -> O,
  {
    let rhs = rhs.broadcast(&self.shape);
    let lhs = self.broadcast(&rhs.shape);
    let data: Vec<O> = lhs.param_iter()
      .zip(rhs.param_iter())
      .map(cb)
      .collect();
    Tensor::new(&rhs.shape.dims, data)
  }

  pub fn vectorize<O,F>(&self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: FnMut(T) -> O,
  {
    let data = self.param_iter().map(cb).collect();
    Tensor::new(&self.shape.dims, data)
  }

  /// Collapse all dimensions from `dim` onward into a single value each.

  pub fn collapse<O,F>(&self, dim: isize, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn(&[T]) -> O,
  {
    let dim = negative_index(dim, self.rank());
    let inner: usize = self.shape.dims[dim..].iter().product();
    let values = self.to_vec();
    let data = if inner == 0 {
      vec![]
    } else {
      values.chunks(inner).map(cb).collect()
    };
    Tensor::new(&self.shape.dims[..dim], data)
  }

  pub fn param_iter(&self) -> TensorIterator<T> {
    TensorIterator::new(self)
  }

  pub fn item(&self) -> T {
    assert!(self.size() == 1,
      "Can't extract item from non-scalar {}", self.shape);
    self.raw()[self.shape.offset]
  }

  /// Gather rows along the first dimension.

  pub fn select_rows(&self, rows: &[usize]) -> Self {
    let this = self.contiguous();
    let n = this.shape[0];
    let row_len = if n == 0 { 0 } else { this.size() / n };
    let data = {
      let raw = this.raw();
      let start = this.shape.offset;
      rows.iter()
        .flat_map(|&r| {
          assert!(r < n, "Row {r} out of bounds for {}", this.shape);
          raw[start + r * row_len .. start + (r + 1) * row_len].to_vec()
        })
        .collect()
    };
    let mut dims = this.shape.dims.clone();
    dims[0] = rows.len();
    Self::new(&dims, data)
  }
}

impl<T: Numeric> Tensor<T> {
  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  /// Sum a single dimension, keeping it with size one.

  pub fn sum_over(&self, dim: isize) -> Self {
    let dim = negative_index(dim, self.rank());
    let dims = &self.shape.dims;
    let outer: usize = dims[..dim].iter().product();
    let inner: usize = dims[dim + 1..].iter().product();
    let n = dims[dim];
    let values = self.to_vec();
    let mut data = vec![T::zero(); outer * inner];
    for o in 0..outer {
      for k in 0..n {
        for i in 0..inner {
          data[o * inner + i] += values[(o * n + k) * inner + i];
        }
      }
    }
    let mut dims = dims.clone();
    dims[dim] = 1;
    Self::new(&dims, data)
  }

  pub fn gt(&self, rhs: &Self) -> Tensor<bool> {
    self.zip(rhs, |(a, b)| a > b )
  }
}

impl<T: Real> Tensor<T> {
  /// Uniformly distributed values in `[low, high)`.

  pub fn uniform_with<G: Rng + ?Sized>(shape: &[usize], low: T, high: T, rng: &mut G) -> Self {
    let len = shape.iter().product();
    let data = (0..len).map(|_| rng.gen_range(low, high) ).collect();
    Self::new(shape, data)
  }

  pub fn randn_with<G: Rng + ?Sized>(shape: &[usize], rng: &mut G) -> Self {
    let len = shape.iter().product();
    let mut data = vec![T::zero(); len];
    for i in 0..(len + 1) / 2 {
      let j = i * 2;
      let (r1, r2): (T, T) = randn(rng);
      data[j] = r1;
      if j + 1 < len { data[j + 1] = r2 }
    }
    Self::new(shape, data)
  }

  /// Glorot (Xavier) uniform initialization for a `[fan_in, fan_out]` matrix.

  pub fn glorot_uniform_with<G: Rng + ?Sized>(dims: &[usize; 2], rng: &mut G) -> Self {
    let limit = (T::from(6.0).unwrap() / T::from(dims[0] + dims[1]).unwrap()).sqrt();
    Self::uniform_with(dims, -limit, limit, rng)
  }

  pub fn sqrt(&self) -> Self {
    self.vectorize(|a| a.sqrt() )
  }

  pub fn trained(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), true)
  }

  pub fn tracked(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), false)
  }
}

impl Tensor<bool> {
  pub fn numeric<O: Numeric>(&self) -> Tensor<O> {
    self.vectorize(|a| if a { O::one() } else { O::zero() })
  }
}

impl<T: Inner> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Tensor{:?} ", self.shape.dims)?;
    print_chunks(0, &self.shape, &self.to_vec(), f)?;
    Ok(())
  }
}

fn print_chunks<T: Debug>(idx: usize, shape: &Shape, vec: &[T], f: &mut std::fmt::Formatter) -> std::fmt::Result {
  let indent = (0..idx * 2).map(|_| " ").collect::<String>();
  if shape.rank() == 0 {
    write!(f, "{indent}{:?}", vec[0])?;
  } else if idx == shape.rank() - 1 {
    writeln!(f, "{indent}{:?}", vec)?;
  } else {
    let chunks = vec.chunks((vec.len() / shape.dims[idx]).max(1));
    writeln!(f, "{indent}[")?;
    for chunk in chunks {
      print_chunks(idx + 1, shape, chunk, f)?;
    }
    writeln!(f, "{indent}]")?;
  }
  Ok(())
}


/// Iterates a tensor's elements in logical order, holding a read lock on its storage.

pub struct TensorIterator<'a, T: Inner> {
  data: RwLockReadGuard<'a, Vec<T>>,
  shape_iter: Box<dyn Iterator<Item=usize> + 'a>,
}

impl<'a, T: Inner> TensorIterator<'a, T> {
  fn new(tensor: &'a Tensor<T>) -> Self {
    Self {
      data: tensor.raw(),
      shape_iter: tensor.shape.iter(),
    }
  }
}

impl<T: Inner> Iterator for TensorIterator<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.shape_iter.next().map(|i| self.data[i] )
  }
}
