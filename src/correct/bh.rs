//! Benjamini-Hochberg false discovery rate correction.

use crate::correct::finite_indices;

/// Apply Benjamini-Hochberg FDR correction.
///
/// For the i-th smallest of m p-values the adjusted value is
/// q[i] = min(p[i] * m / i, q[i+1]), clipped to 1. NaN entries are returned
/// unchanged and do not count towards m.
pub fn correct_bh(p_values: &[f64]) -> Vec<f64> {
    let mut q_values = p_values.to_vec();
    let indices = finite_indices(p_values);
    let n = indices.len();
    if n == 0 {
        return q_values;
    }

    let n_f64 = n as f64;
    let mut running = p_values[indices[n - 1]].min(1.0);
    q_values[indices[n - 1]] = running;

    // Work backwards from the largest p-value
    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let adjusted = p_values[indices[i]] * n_f64 / rank as f64;
        running = adjusted.min(running).min(1.0);
        q_values[indices[i]] = running;
    }
    q_values
}
