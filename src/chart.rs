use std::cmp::Ordering;

use itertools::Itertools;
use rand::Rng;

/// Points per series, one per hour of the day.
pub const HOURS: usize = 24;

/// Values are drawn from `[0, SCALE)`.
pub const SCALE: f32 = 10.0;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
  pub hour: u8,
  pub value: f32,
}


/// Hourly "forecast" curve.
///
/// Every value is independent noise. It has no relationship to the
/// readings or to the network's prediction.

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
  points: Vec<ChartPoint>,
}

impl ChartSeries {
  pub fn generate<G: Rng + ?Sized>(rng: &mut G) -> Self {
    let points = (0..HOURS)
      .map(|hour| ChartPoint { hour: hour as u8, value: rng.gen::<f32>() * SCALE } )
      .collect();
    Self { points }
  }

  pub fn points(&self) -> &[ChartPoint] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Draw the series as a text plot `height` rows tall, followed by an hour axis.

  pub fn render(&self, height: usize) -> String {
    let height = height.max(1);
    let step = SCALE / height as f32;
    let levels: Vec<usize> = self.points.iter()
      .map(|point| ((point.value / step) as usize).min(height - 1) )
      .collect();
    let mut out = String::new();

    for row in (0..height).rev() {
      out += &format!("{:>5.1} |", (row + 1) as f32 * step);
      for &level in &levels {
        // Mark the row the value falls into, fill everything beneath
        out += match level.cmp(&row) {
          Ordering::Greater => " |",
          Ordering::Equal => " *",
          Ordering::Less => "  ",
        };
      }
      out.push('\n');
    }

    out += &format!("{:>5} +{}\n", "", "--".repeat(self.points.len()));
    let hours = self.points.iter().map(|point| format!("{:>2}", point.hour % 10) ).join("");
    out += &format!("{:>5}  {hours}\n", "h");
    out
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use rand::{ SeedableRng, rngs::StdRng };

  #[test]
  fn hours() {
    let series = ChartSeries::generate(&mut StdRng::seed_from_u64(0));
    assert_eq!(series.len(), HOURS);
    let hours: Vec<u8> = series.points().iter().map(|p| p.hour ).collect();
    assert_eq!(hours, (0..24).collect::<Vec<u8>>());
  }

  #[test]
  fn regenerated_series_differ() {
    let mut rng = rand::thread_rng();
    let a = ChartSeries::generate(&mut rng);
    let b = ChartSeries::generate(&mut rng);
    assert_ne!(a, b);
  }

  #[test]
  fn render_layout() {
    let series = ChartSeries::generate(&mut StdRng::seed_from_u64(1));
    let text = series.render(5);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with(" 10.0 |"));
    // Every column has exactly one marker
    let markers = text.matches('*').count();
    assert_eq!(markers, HOURS);
  }

  #[test]
  fn uneven_rows_mark_every_point() {
    let points = [0.0, 3.3333, 3.3334, 6.6666, 6.6667, 9.99999]
      .iter()
      .cycle()
      .take(HOURS)
      .enumerate()
      .map(|(hour, &value)| ChartPoint { hour: hour as u8, value } )
      .collect();
    let series = ChartSeries { points };
    for height in [3, 7, 9] {
      assert_eq!(series.render(height).matches('*').count(), HOURS);
    }
  }

  proptest! {
    #[test]
    fn bounded(seed in any::<u64>()) {
      let series = ChartSeries::generate(&mut StdRng::seed_from_u64(seed));
      prop_assert_eq!(series.len(), 24);
      for point in series.points() {
        prop_assert!(point.value >= 0.0 && point.value < SCALE);
      }
    }

    #[test]
    fn one_marker_per_hour(seed in any::<u64>(), height in 1usize..20) {
      let series = ChartSeries::generate(&mut StdRng::seed_from_u64(seed));
      prop_assert_eq!(series.render(height).matches('*').count(), HOURS);
    }
  }
}
