use crate::{
  tensor::Tensor,
  scalar::{ Numeric, Real },
};


/// Strided general matrix multiplication `C = A * B` for `m x k` times `k x n`.
///
/// `a` and `b` start at the first element of their matrices and are addressed
/// through `(row_stride, col_stride)` pairs. `c` is written row-major.

pub trait Gemm: Sized {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], sa: (isize, isize), b: &[Self], sb: (isize, isize), c: &mut [Self]);
}

#[cfg_attr(feature = "unsafe", allow(dead_code))]
fn naive_gemm<T: Numeric>(m: usize, k: usize, n: usize, a: &[T], sa: (isize, isize), b: &[T], sb: (isize, isize), c: &mut [T]) {
  for i in 0..m {
    for j in 0..n {
      let mut acc = T::zero();
      for p in 0..k {
        acc += a[(i as isize * sa.0 + p as isize * sa.1) as usize] *
               b[(p as isize * sb.0 + j as isize * sb.1) as usize];
      }
      c[i * n + j] = acc;
    }
  }
}

#[cfg(not(feature = "unsafe"))]
impl Gemm for f32 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], sa: (isize, isize), b: &[Self], sb: (isize, isize), c: &mut [Self]) {
    naive_gemm(m, k, n, a, sa, b, sb, c)
  }
}

#[cfg(not(feature = "unsafe"))]
impl Gemm for f64 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], sa: (isize, isize), b: &[Self], sb: (isize, isize), c: &mut [Self]) {
    naive_gemm(m, k, n, a, sa, b, sb, c)
  }
}

#[cfg(feature = "unsafe")]
impl Gemm for f32 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], sa: (isize, isize), b: &[Self], sb: (isize, isize), c: &mut [Self]) {
    assert!(c.len() >= m * n);
    if m == 0 || n == 0 { return }
    if k == 0 { return c[..m * n].fill(0.0) }
    assert!(a.len() > ((m - 1) as isize * sa.0 + (k - 1) as isize * sa.1) as usize);
    assert!(b.len() > ((k - 1) as isize * sb.0 + (n - 1) as isize * sb.1) as usize);
    unsafe {
      matrixmultiply::sgemm(
        m, k, n,
        1.0,
        a.as_ptr(), sa.0, sa.1,
        b.as_ptr(), sb.0, sb.1,
        0.0,
        c.as_mut_ptr(), n as isize, 1,
      );
    }
  }
}

#[cfg(feature = "unsafe")]
impl Gemm for f64 {
  fn gemm(m: usize, k: usize, n: usize, a: &[Self], sa: (isize, isize), b: &[Self], sb: (isize, isize), c: &mut [Self]) {
    assert!(c.len() >= m * n);
    if m == 0 || n == 0 { return }
    if k == 0 { return c[..m * n].fill(0.0) }
    assert!(a.len() > ((m - 1) as isize * sa.0 + (k - 1) as isize * sa.1) as usize);
    assert!(b.len() > ((k - 1) as isize * sb.0 + (n - 1) as isize * sb.1) as usize);
    unsafe {
      matrixmultiply::dgemm(
        m, k, n,
        1.0,
        a.as_ptr(), sa.0, sa.1,
        b.as_ptr(), sb.0, sb.1,
        0.0,
        c.as_mut_ptr(), n as isize, 1,
      );
    }
  }
}

impl<T: Real> Tensor<T> {
  /// Multiply two matrices without copying strided operands.

  pub(crate) fn matmul(&self, rhs: &Self) -> Tensor<T> {
    assert!(self.rank() == 2 && rhs.rank() == 2,
      "Matrix multiplication needs two matrices, got {} & {}", self.shape, rhs.shape);
    let (rows_l, cols_l) = (self.shape[0], self.shape[1]);
    let (rows_r, cols_r) = (rhs.shape[0], rhs.shape[1]);
    assert_eq!(cols_l, rows_r,
      "Could not multiply {} & {}", self.shape, rhs.shape);

    let mut data = vec![T::zero(); rows_l * cols_r];
    {
      let data_l = self.raw();
      let data_r = rhs.raw();
      T::gemm(
        rows_l, cols_l, cols_r,
        &data_l[self.shape.offset..], (self.shape.strides[0], self.shape.strides[1]),
        &data_r[rhs.shape.offset..], (rhs.shape.strides[0], rhs.shape.strides[1]),
        &mut data,
      );
    }
    Tensor::new(&[rows_l, cols_r], data)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::ops::RealOps;

  #[test]
  fn matmul() {
    let x = Tensor::new(&[2,3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let y = Tensor::new(&[3,2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,2], vec![22.0, 28.0, 49.0, 64.0]));
  }

  #[test]
  fn matmul_vector() {
    let x = Tensor::new(&[2,3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let y = Tensor::new(&[3,1], vec![1.0, 2.0, 3.0]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,1], vec![14.0, 32.0]));
  }

  #[test]
  fn matmul_transposed() {
    let x = Tensor::new(&[3,2], vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]).transpose(0, 1);
    let y = Tensor::new(&[3,2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,2], vec![22.0, 28.0, 49.0, 64.0]));
  }

  #[test]
  fn naive_matches_kernel() {
    let a = [1.0, 2.0, 3.0, 4.0];
    let b = [5.0, 6.0, 7.0, 8.0];
    let mut c = [0.0; 4];
    naive_gemm(2, 2, 2, &a, (2, 1), &b, (2, 1), &mut c);
    let mut d = [0.0; 4];
    f64::gemm(2, 2, 2, &a, (2, 1), &b, (2, 1), &mut d);
    assert_eq!(c, d);
    assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
  }
}
