//! In-memory numeric statistics and the rounding rules applied to them.

use serde::{Deserialize, Serialize};

use crate::config::StdDevConvention;

/// Descriptive statistics of a non-empty numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    /// Number of values.
    pub count: usize,
    /// Sum of all values, accumulated left to right.
    pub sum: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Middle value, or the mean of the two middle values.
    pub median: f64,
    /// Standard deviation; `None` for the sample convention with one value.
    pub std_dev: Option<f64>,
}

impl NumericStats {
    /// Computes statistics of `values`; `None` when `values` is empty.
    pub fn compute(values: &[f64], convention: StdDevConvention) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let min = sorted[0];
        let max = sorted[count - 1];
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        Some(Self {
            count,
            sum,
            mean,
            min,
            max,
            median,
            std_dev: std_dev(values, mean, convention),
        })
    }
}

/// Two-pass standard deviation around a known mean.
fn std_dev(values: &[f64], mean: f64, convention: StdDevConvention) -> Option<f64> {
    let denominator = match convention {
        StdDevConvention::Population => values.len() as f64,
        StdDevConvention::Sample if values.len() > 1 => (values.len() - 1) as f64,
        StdDevConvention::Sample => return None,
    };
    let squared_deviations: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((squared_deviations / denominator).sqrt())
}

/// Rounds to `decimals` places.
///
/// The decision is made on the exact binary value, so `-199.985` (stored
/// slightly below) becomes `-199.99`; only exactly representable ties such as
/// `0.125` go to the even neighbour.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Discards the fractional part (toward zero). Non-finite values map to 0.
pub fn truncate(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_compute_basic() {
        let stats = NumericStats::compute(&[1.0, 2.0, 4.0], StdDevConvention::Population).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, 7.0);
        assert!(approx(stats.mean, 7.0 / 3.0));
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.median, 2.0);
        // sqrt(((1-7/3)^2 + (2-7/3)^2 + (4-7/3)^2) / 3) = sqrt(14/9)
        assert!(approx(stats.std_dev.unwrap(), (14.0f64 / 9.0).sqrt()));
    }

    #[test]
    fn test_sample_convention() {
        let stats = NumericStats::compute(&[1.0, 2.0, 4.0], StdDevConvention::Sample).unwrap();
        // sqrt((14/3) / 2) = sqrt(7/3)
        assert!(approx(stats.std_dev.unwrap(), (7.0f64 / 3.0).sqrt()));

        let single = NumericStats::compute(&[5.0], StdDevConvention::Sample).unwrap();
        assert_eq!(single.std_dev, None);
        let single = NumericStats::compute(&[5.0], StdDevConvention::Population).unwrap();
        assert_eq!(single.std_dev, Some(0.0));
    }

    #[test]
    fn test_even_median() {
        let stats =
            NumericStats::compute(&[4.0, 1.0, 3.0, 2.0], StdDevConvention::Population).unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_empty() {
        assert!(NumericStats::compute(&[], StdDevConvention::Population).is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(7.0 / 3.0, 2), 2.33);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(-0.125, 2), -0.12);
        assert_eq!(round_to(1.005, 2), 1.0);
        assert_eq!(round_to(10.0, 2), 10.0);
        assert!(round_to(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_round_to_uses_exact_binary_value() {
        // -199.985 is stored as -199.98500000000001364...
        assert_eq!(round_to(-199.985, 2), -199.99);
        // 1.015 is stored as 1.01499999999999990230...
        assert_eq!(round_to(1.015, 2), 1.01);
        // 8.345 is stored as 8.34500000000000063948...
        assert_eq!(round_to(8.345, 2), 8.35);
        assert_eq!(round_to(0.625, 2), 0.62);
        assert_eq!(round_to(-0.0, 2), 0.0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(7.0 / 3.0), 2);
        assert_eq!(truncate(2.99), 2);
        assert_eq!(truncate(-2.99), -2);
        assert_eq!(truncate(f64::NAN), 0);
    }
}
