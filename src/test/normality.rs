//! Shapiro-Wilk test for normality.
//!
//! Implements Royston's approximation (Applied Statistics algorithm AS R94),
//! which extends the test to 3 ≤ n ≤ 5000 and is what most statistics
//! packages report. For n = 3 the exact p-value is used.

use crate::error::{AssayError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

const MAX_N: usize = 5000;

/// Result of a Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroResult {
    /// W statistic in (0, 1].
    pub w: f64,
    /// P-value for H0: the sample comes from a normal distribution.
    pub p_value: f64,
    /// Sample size.
    pub n: usize,
}

impl ShapiroResult {
    /// Whether normality is not rejected at `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Polynomial c[0] + c[1]·x + c[2]·x² + …
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| AssayError::Analysis(e.to_string()))
}

/// The antisymmetric weights a[0..n/2] for the ordered sample.
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let half = n / 2;
    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let mut a = vec![0.0; half];
    a[0] = poly(&C1, rsn) - m[0] / ssumm2;

    let (first_scaled, fac) = if n > 5 {
        a[1] = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a[0].powi(2) - 2.0 * a[1].powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a[0].powi(2))).sqrt();
        (1, fac)
    };

    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - PI / 3.0);
        return p.clamp(0.0, 1.0);
    }
    if w >= 1.0 {
        return 1.0;
    }

    let w1 = (1.0 - w).ln();
    let nf = n as f64;
    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if w1 >= gamma {
            return 0.0;
        }
        (-(gamma - w1).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };
    normal.sf((y - m) / s)
}

/// Shapiro-Wilk test for normality.
///
/// A sample whose values are all equal gives `W = 1` and `p = 1`.
///
/// # Errors
/// `InsufficientData` for fewer than 3 values; `InvalidParameter` for
/// non-finite values.
pub fn shapiro_wilk(values: &[f64]) -> Result<ShapiroResult> {
    let n = values.len();
    if n < 3 {
        return Err(AssayError::InsufficientData(format!(
            "Shapiro-Wilk needs at least 3 values, got {}",
            n
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AssayError::InvalidParameter(
            "Shapiro-Wilk input contains non-finite values".to_string(),
        ));
    }
    if n > MAX_N {
        tracing::warn!(n, "Shapiro-Wilk p-value may be inaccurate for n > 5000");
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if x[n - 1] - x[0] <= 0.0 {
        tracing::debug!(n, "Shapiro-Wilk on a constant sample");
        return Ok(ShapiroResult {
            w: 1.0,
            p_value: 1.0,
            n,
        });
    }

    let normal = standard_normal()?;
    let a = coefficients(n, &normal);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ssq).min(1.0);

    Ok(ShapiroResult {
        w,
        p_value: p_value(w, n, &normal),
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shapiro_reference_sample() {
        // Classic weights example; W = 0.7888, p = 0.0067
        let x = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
        let r = shapiro_wilk(&x).unwrap();
        assert_relative_eq!(r.w, 0.78881, epsilon = 1e-4);
        assert_relative_eq!(r.p_value, 0.006704, epsilon = 2e-4);
        assert!(!r.is_normal(0.05));
    }

    #[test]
    fn test_shapiro_exact_n3() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(r.w, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shapiro_normal_like_sample() {
        let x = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0, 2.5, 3.6];
        let r = shapiro_wilk(&x).unwrap();
        assert_relative_eq!(r.w, 0.97109, epsilon = 1e-4);
        assert!(r.is_normal(0.05));
    }

    #[test]
    fn test_shapiro_skewed_sample() {
        let x = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 89.0];
        let r = shapiro_wilk(&x).unwrap();
        assert_relative_eq!(r.w, 0.68251, epsilon = 1e-4);
        assert!(r.p_value < 0.001);
    }

    #[test]
    fn test_shapiro_small_n_branch() {
        let r = shapiro_wilk(&[4.0, 5.5, 6.1, 7.2, 8.0]).unwrap();
        assert_relative_eq!(r.w, 0.98391, epsilon = 1e-4);
        assert!(r.p_value > 0.9);
    }

    #[test]
    fn test_shapiro_order_invariant() {
        let a = shapiro_wilk(&[5.0, 1.0, 4.0, 2.0, 3.0, 9.0]).unwrap();
        let b = shapiro_wilk(&[1.0, 2.0, 3.0, 4.0, 5.0, 9.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shapiro_constant_sample() {
        let r = shapiro_wilk(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(r.w, 1.0);
        assert_eq!(r.p_value, 1.0);
        assert!(r.is_normal(0.05));
    }

    #[test]
    fn test_shapiro_rejects_degenerate_input() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(AssayError::InsufficientData(_))
        ));
        assert!(matches!(
            shapiro_wilk(&[1.0, f64::NAN, 3.0]),
            Err(AssayError::InvalidParameter(_))
        ));
    }
}
