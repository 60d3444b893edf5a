use rand::distributions::uniform::SampleUniform;
use num_traits::{ NumAssignOps, Num, NumCast, Float };

use crate::tensor::Gemm;


/// All types that may be used in a [Tensor](crate::Tensor).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug + 'static {}
impl<T: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug + 'static> Inner for T {}


/// All numeric types.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Numeric: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum {}
impl<T: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum> Numeric for T {}


/// All continuous numeric types that can be differentiated.
///
/// Implemented automatically for `f32` and `f64`, the types
/// with a matrix multiplication kernel.

pub trait Real: Numeric + Float + SampleUniform + Gemm {}
impl<T: Numeric + Float + SampleUniform + Gemm> Real for T {}
