//! Control vs drug comparison with normality-driven test selection.
//!
//! Both samples are checked with Shapiro-Wilk. When neither departs from
//! normality the configured t-test is used, otherwise the Mann-Whitney U
//! test. Samples too small for Shapiro-Wilk count as non-normal; a constant
//! sample counts as normal.

use crate::error::{AssayError, Result};
use crate::profile::{describe, Summary};
use crate::test::mann_whitney::mann_whitney_u;
use crate::test::normality::{shapiro_wilk, ShapiroResult};
use crate::test::ttest::{t_test, TTestKind};
use serde::{Deserialize, Serialize};

/// Parameters of the test selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Significance level; p-values at or above it get no stars and no
    /// bracket.
    pub alpha: f64,
    /// Shapiro-Wilk p-value above which a sample is treated as normal.
    pub normality_alpha: f64,
    /// t-test variant used for normal samples.
    pub t_test: TTestKind,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            normality_alpha: 0.05,
            t_test: TTestKind::Student,
        }
    }
}

impl SelectionConfig {
    /// Selection using Welch's t-test for normal samples.
    pub fn welch() -> Self {
        Self {
            t_test: TTestKind::Welch,
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("normality_alpha", self.normality_alpha)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(AssayError::InvalidParameter(format!(
                    "{} must be in (0, 1), got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// The test that produced a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    StudentT,
    WelchT,
    MannWhitneyU,
}

impl TestKind {
    /// Human readable name used in tables.
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::StudentT | TestKind::WelchT => "Unpaired t-test",
            TestKind::MannWhitneyU => "Mann-Whitney U test",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Star annotation of a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    NotSignificant,
    /// p < 0.05
    One,
    /// p < 0.01
    Two,
    /// p < 0.001
    Three,
}

impl Significance {
    /// Stars at the 0.05 level.
    pub fn from_p(p_value: f64) -> Self {
        Self::at_level(p_value, 0.05)
    }

    /// Stars of a p-value below `alpha`; NaN p-values are not significant.
    pub fn at_level(p_value: f64, alpha: f64) -> Self {
        if !(p_value < alpha) {
            Significance::NotSignificant
        } else if p_value < 0.001 {
            Significance::Three
        } else if p_value < 0.01 {
            Significance::Two
        } else {
            Significance::One
        }
    }

    pub fn stars(&self) -> &'static str {
        match self {
            Significance::NotSignificant => "",
            Significance::One => "*",
            Significance::Two => "**",
            Significance::Three => "***",
        }
    }

    pub fn is_significant(&self) -> bool {
        *self != Significance::NotSignificant
    }
}

/// Outcome of one control vs drug comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupComparison {
    pub control: Summary,
    pub drug: Summary,
    /// Shapiro-Wilk results; `None` where the test was not applicable.
    pub control_normality: Option<ShapiroResult>,
    pub drug_normality: Option<ShapiroResult>,
    pub test: TestKind,
    pub statistic: f64,
    /// Raw p-value.
    pub p_value: f64,
    /// p-value after multiple testing correction, equal to `p_value` until
    /// a correction is applied.
    pub p_adjusted: f64,
    /// Level the annotation was computed at.
    pub alpha: f64,
    pub significance: Significance,
}

impl GroupComparison {
    /// Replace the adjusted p-value and recompute the annotation.
    pub fn set_adjusted(&mut self, p_adjusted: f64) {
        self.p_adjusted = p_adjusted;
        self.significance = Significance::at_level(p_adjusted, self.alpha);
    }

    pub fn is_significant(&self) -> bool {
        self.significance.is_significant()
    }
}

fn normality(values: &[f64]) -> Result<Option<ShapiroResult>> {
    match shapiro_wilk(values) {
        Ok(r) => Ok(Some(r)),
        Err(AssayError::InsufficientData(reason)) => {
            tracing::debug!(%reason, "normality not testable, treating sample as non-normal");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Compare control and drug samples.
pub fn compare_groups(control: &[f64], drug: &[f64], config: &SelectionConfig) -> Result<GroupComparison> {
    config.validate()?;
    if control.is_empty() || drug.is_empty() {
        return Err(AssayError::InsufficientData(format!(
            "comparison needs both groups, got {} control and {} drug values",
            control.len(),
            drug.len()
        )));
    }

    let control_normality = normality(control)?;
    let drug_normality = normality(drug)?;
    let both_normal = match (&control_normality, &drug_normality) {
        (Some(a), Some(b)) => a.is_normal(config.normality_alpha) && b.is_normal(config.normality_alpha),
        _ => false,
    };

    let (test, statistic, p_value) = if both_normal {
        let r = t_test(control, drug, config.t_test)?;
        let kind = match config.t_test {
            TTestKind::Student => TestKind::StudentT,
            TTestKind::Welch => TestKind::WelchT,
        };
        (kind, r.statistic, r.p_value)
    } else {
        let r = mann_whitney_u(control, drug)?;
        (TestKind::MannWhitneyU, r.u, r.p_value)
    };

    Ok(GroupComparison {
        control: describe(control),
        drug: describe(drug),
        control_normality,
        drug_normality,
        test,
        statistic,
        p_value,
        p_adjusted: p_value,
        alpha: config.alpha,
        significance: Significance::at_level(p_value, config.alpha),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_thresholds() {
        assert_eq!(Significance::from_p(0.0005).stars(), "***");
        assert_eq!(Significance::from_p(0.001).stars(), "**");
        assert_eq!(Significance::from_p(0.049).stars(), "*");
        assert_eq!(Significance::from_p(0.05).stars(), "");
        assert!(!Significance::from_p(f64::NAN).is_significant());
    }

    #[test]
    fn test_significance_follows_alpha() {
        assert_eq!(Significance::at_level(0.03, 0.01), Significance::NotSignificant);
        assert_eq!(Significance::at_level(0.005, 0.01).stars(), "**");
        assert_eq!(Significance::at_level(0.07, 0.1).stars(), "*");

        let control = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0, 2.5, 3.6];
        let drug: Vec<f64> = control.iter().map(|v| v + 1.0).collect();
        let strict = SelectionConfig {
            alpha: 0.001,
            ..Default::default()
        };
        let loose = compare_groups(&control, &drug, &SelectionConfig::default()).unwrap();
        let mut r = compare_groups(&control, &drug, &strict).unwrap();
        assert!(loose.p_value > 0.001 && loose.p_value < 0.05);
        assert!(loose.is_significant());
        assert!(!r.is_significant());
        r.set_adjusted(0.0005);
        assert_eq!(r.significance, Significance::Three);
    }

    #[test]
    fn test_normal_samples_use_t_test() {
        let control = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0, 2.5, 3.6];
        let drug: Vec<f64> = control.iter().map(|v| v + 3.0).collect();
        let r = compare_groups(&control, &drug, &SelectionConfig::default()).unwrap();
        assert_eq!(r.test, TestKind::StudentT);
        assert!(r.statistic < 0.0);
        assert!(r.significance.is_significant());

        let r = compare_groups(&control, &drug, &SelectionConfig::welch()).unwrap();
        assert_eq!(r.test, TestKind::WelchT);
        assert_eq!(r.test.name(), "Unpaired t-test");
    }

    #[test]
    fn test_skewed_sample_uses_mann_whitney() {
        let control = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 89.0];
        let drug = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0];
        let r = compare_groups(&control, &drug, &SelectionConfig::default()).unwrap();
        assert_eq!(r.test, TestKind::MannWhitneyU);
        assert!(r.control_normality.is_some());
    }

    #[test]
    fn test_tiny_samples_are_non_normal() {
        let r = compare_groups(&[1.0, 2.0], &[3.0, 4.0, 5.0], &SelectionConfig::default()).unwrap();
        assert_eq!(r.test, TestKind::MannWhitneyU);
        assert!(r.control_normality.is_none());
    }

    #[test]
    fn test_constant_sample_counts_as_normal() {
        let control = [0.0; 12];
        let drug = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.1, 3.9, 3.0, 2.5, 3.6];
        let r = compare_groups(&control, &drug, &SelectionConfig::welch()).unwrap();
        assert_eq!(r.test, TestKind::WelchT);
        assert_eq!(r.control_normality.map(|n| n.p_value), Some(1.0));
        assert!(r.statistic < 0.0);
        assert!(r.p_value < 1e-5);
    }

    #[test]
    fn test_empty_group_is_error() {
        assert!(matches!(
            compare_groups(&[], &[1.0], &SelectionConfig::default()),
            Err(AssayError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_set_adjusted() {
        let mut r = compare_groups(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0], &SelectionConfig::default()).unwrap();
        r.set_adjusted(0.5);
        assert_eq!(r.p_adjusted, 0.5);
        assert!(!r.significance.is_significant());
        assert!(r.p_value < r.p_adjusted);
    }
}
