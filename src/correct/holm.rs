//! Holm step-down family-wise error rate correction.

use crate::correct::finite_indices;

/// Apply Holm's step-down correction.
///
/// The i-th smallest (0-based) of m p-values is multiplied by (m - i); the
/// running maximum keeps the adjusted values monotone. NaN entries are
/// returned unchanged and do not count towards m.
pub fn correct_holm(p_values: &[f64]) -> Vec<f64> {
    let mut adjusted = p_values.to_vec();
    let indices = finite_indices(p_values);
    let m = indices.len();

    let mut running: f64 = 0.0;
    for (i, &idx) in indices.iter().enumerate() {
        running = running.max((m - i) as f64 * p_values[idx]);
        adjusted[idx] = running.min(1.0);
    }
    adjusted
}

/// Bonferroni correction: every p-value times the family size, clipped to 1.
pub fn correct_bonferroni(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.iter().filter(|p| !p.is_nan()).count() as f64;
    p_values
        .iter()
        .map(|&p| if p.is_nan() { p } else { (p * m).min(1.0) })
        .collect()
}
