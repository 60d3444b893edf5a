use std::sync::Arc;

use rand::Rng;

use crate::scalar::Real;


pub(crate) type RcT<T> = Arc<T>;


#[inline]
pub fn negative_index(i: isize, n: usize) -> usize {
  if i < 0 {
    (n as isize + i) as usize
  } else {
    i as usize
  }
}


// Polar Box-Muller transformation

pub fn randn<T: Real, G: Rng + ?Sized>(rng: &mut G) -> (T, T) {
  loop {
    let u = rng.gen_range(-T::one(), T::one());
    let v = rng.gen_range(-T::one(), T::one());
    let r = u * u + v * v;
    // Try again if outside interval
    if r == T::zero() || r >= T::one() { continue }
    let c = (T::from(-2.0).unwrap() * r.ln() / r).sqrt();
    return (u * c, v * c)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use rand::{ SeedableRng, rngs::StdRng };

  #[test]
  fn negative() {
    assert_eq!(negative_index(-1, 3), 2);
    assert_eq!(negative_index(-3, 3), 0);
    assert_eq!(negative_index(1, 3), 1);
  }

  #[test]
  fn standard_normal() {
    let mut rng = StdRng::seed_from_u64(7);
    let samples: Vec<f64> = (0..5000)
      .flat_map(|_| { let (a, b) = randn::<f64, _>(&mut rng); [a, b] })
      .collect();
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2) ).sum::<f64>() / n;
    assert!(mean.abs() < 0.05, "mean {mean}");
    assert!((var - 1.0).abs() < 0.1, "variance {var}");
  }
}
