//! Descriptive statistics of a sample.

use serde::{Deserialize, Serialize};

/// Summary statistics of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values.
    pub n: usize,
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Standard error of the mean, using the population standard deviation.
    pub fn sem(&self) -> f64 {
        self.std / (self.n as f64).sqrt()
    }

    /// Whether all values are equal (or there are none).
    pub fn is_constant(&self) -> bool {
        self.n == 0 || self.max - self.min <= 0.0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} mean={:.2} std={:.2} median={:.2} range=[{:.2}, {:.2}]",
            self.n, self.mean, self.std, self.median, self.min, self.max
        )
    }
}

/// Describe a sample. An empty sample has `n = 0` and NaN statistics.
pub fn describe(values: &[f64]) -> Summary {
    let n = values.len();
    if n == 0 {
        return Summary {
            n: 0,
            mean: f64::NAN,
            std: f64::NAN,
            median: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / n as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    Summary {
        n,
        mean,
        std: variance.sqrt(),
        median,
        min: sorted[0],
        max: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_describe() {
        let s = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.n, 8);
        assert_relative_eq!(s.mean, 5.0);
        // population std of the classic example is exactly 2
        assert_relative_eq!(s.std, 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.median, 4.5);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_relative_eq!(s.sem(), 2.0 / 8f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_describe_odd_and_empty() {
        assert_eq!(describe(&[3.0, 1.0, 2.0]).median, 2.0);
        let empty = describe(&[]);
        assert_eq!(empty.n, 0);
        assert!(empty.mean.is_nan());
        assert!(empty.is_constant());
    }
}
