//! Multiple testing correction.

mod bh;
mod holm;

pub use bh::correct_bh;
pub use holm::{correct_bonferroni, correct_holm};

use serde::{Deserialize, Serialize};

/// Correction applied across a family of p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Report raw p-values.
    #[default]
    None,
    Bonferroni,
    Holm,
    /// Benjamini-Hochberg FDR.
    BenjaminiHochberg,
}

impl Correction {
    /// Adjust `p_values`, preserving order.
    pub fn apply(&self, p_values: &[f64]) -> Vec<f64> {
        match self {
            Correction::None => p_values.to_vec(),
            Correction::Bonferroni => correct_bonferroni(p_values),
            Correction::Holm => correct_holm(p_values),
            Correction::BenjaminiHochberg => correct_bh(p_values),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Correction::None => "none",
            Correction::Bonferroni => "bonferroni",
            Correction::Holm => "holm",
            Correction::BenjaminiHochberg => "fdr_bh",
        }
    }
}

/// Indices of the non-NaN p-values, sorted by ascending p-value.
pub(crate) fn finite_indices(p_values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    indices.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let p = [0.2, 0.01];
        assert_eq!(Correction::None.apply(&p), p.to_vec());
    }

    #[test]
    fn test_yaml_names() {
        let c: Correction = serde_yaml::from_str("benjamini_hochberg").unwrap();
        assert_eq!(c, Correction::BenjaminiHochberg);
        let c: Correction = serde_yaml::from_str("holm").unwrap();
        assert_eq!(c.name(), "holm");
    }
}
