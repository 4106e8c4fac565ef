//! Gaussian kernel density estimate for violin outlines.

use std::f64::consts::PI;

/// Gaussian KDE with Scott's bandwidth, evaluated at `points` evenly spaced
/// values between the sample minimum and maximum.
///
/// Returns `(value, density)` pairs, or `None` when the density is undefined
/// (fewer than two values or zero variance).
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 || points < 2 {
        return None;
    }

    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    if !(var > 0.0) || !var.is_finite() {
        return None;
    }

    // Scott's rule: n^(-1/(d+4)) with d = 1
    let factor = nf.powf(-0.2);
    let bandwidth = factor * var.sqrt();
    let norm = 1.0 / (nf * bandwidth * (2.0 * PI).sqrt());

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (points - 1) as f64;

    Some(
        (0..points)
            .map(|i| {
                let y = min + step * i as f64;
                let density = values
                    .iter()
                    .map(|v| {
                        let z = (y - v) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum::<f64>()
                    * norm;
                (y, density)
            })
            .collect(),
    )
}
