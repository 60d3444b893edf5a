use rand::Rng;

use crate::{ scalar::Real, Tensor };


/// Randomly generated training pairs with no relationship between
/// features and targets, all drawn from a standard normal distribution.

#[derive(Debug, Clone)]
pub struct SyntheticData<R: Real> {
  pub features: Tensor<R>,
  pub targets: Tensor<R>,
}

impl<R: Real> SyntheticData<R> {
  pub fn generate<G: Rng + ?Sized>(samples: usize, features: usize, rng: &mut G) -> Self {
    Self {
      features: Tensor::randn_with(&[samples, features], rng),
      targets: Tensor::randn_with(&[samples, 1], rng),
    }
  }

  pub fn len(&self) -> usize {
    self.features.dim(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use rand::{ SeedableRng, rngs::StdRng };
  use crate::ops::BaseOps;

  #[test]
  fn dimensions() {
    let data = SyntheticData::<f32>::generate(100, 5, &mut StdRng::seed_from_u64(0));
    assert_eq!(data.features.shape().dims, vec![100, 5]);
    assert_eq!(data.targets.shape().dims, vec![100, 1]);
    assert_eq!(data.len(), 100);
  }

  #[test]
  fn roughly_standard_normal() {
    let data = SyntheticData::<f64>::generate(2000, 5, &mut StdRng::seed_from_u64(1));
    let values = data.features.to_vec();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    assert!(mean.abs() < 0.1);
    assert!(values.iter().any(|&v| v < 0.0 ));
  }
}
