//! Developmental age and drug labels derived from export file names.
//!
//! Exports are named `<drug>_<age>_<anything>.csv`, e.g.
//! `TCB-2_3DPF_2ndcon-27_01_2025.csv`.

use crate::error::{AssayError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

fn age_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(\d+)\s*dpf\s*$").expect("static regex"))
}

/// Larval age in days post-fertilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Age {
    pub dpf: u32,
}

impl Age {
    pub fn new(dpf: u32) -> Self {
        Self { dpf }
    }

    /// Parse labels such as `3DPF`, `3dpf` or `3 dpf`.
    pub fn parse(label: &str) -> Result<Self> {
        let caps = age_regex()
            .captures(label)
            .ok_or_else(|| AssayError::InvalidLabel(format!("'{}' is not an age (e.g. 3dpf)", label)))?;
        let dpf = caps[1]
            .parse()
            .map_err(|_| AssayError::InvalidLabel(format!("age out of range: '{}'", label)))?;
        Ok(Self { dpf })
    }

    /// Compact label used in file names and tables (`3DPF`).
    pub fn label(&self) -> String {
        format!("{}DPF", self.dpf)
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} dpf", self.dpf)
    }
}

impl TryFrom<String> for Age {
    type Error = AssayError;

    fn try_from(value: String) -> Result<Self> {
        Age::parse(&value)
    }
}

impl From<Age> for String {
    fn from(age: Age) -> String {
        age.label()
    }
}

/// Labels derived from an export file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLabel {
    /// File name without extension.
    pub stem: String,
    /// First `_`-separated token.
    pub drug: String,
    /// Second token, when it is an age.
    pub age: Option<Age>,
}

/// Derive drug and age labels from a file path.
pub fn parse_file_label<P: AsRef<Path>>(path: P) -> FileLabel {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut tokens = stem.split('_');
    let drug = tokens.next().unwrap_or_default().to_string();
    let age = tokens.next().and_then(|t| Age::parse(t).ok());
    FileLabel { stem, drug, age }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(Age::parse("3DPF").unwrap().dpf, 3);
        assert_eq!(Age::parse("4dpf").unwrap().dpf, 4);
        assert_eq!(Age::parse("5 dpf").unwrap().dpf, 5);
        assert!(Age::parse("2ndcon").is_err());
    }

    #[test]
    fn test_age_display_and_label() {
        let age = Age::new(3);
        assert_eq!(age.to_string(), "3 dpf");
        assert_eq!(age.label(), "3DPF");
    }

    #[test]
    fn test_age_ordering() {
        let mut ages = vec![Age::new(5), Age::new(3), Age::new(4)];
        ages.sort();
        assert_eq!(ages, vec![Age::new(3), Age::new(4), Age::new(5)]);
    }

    #[test]
    fn test_parse_file_label() {
        let label = parse_file_label("/data/TCB-2/TCB-2_3DPF_2ndcon-27_01_2025.csv");
        assert_eq!(label.drug, "TCB-2");
        assert_eq!(label.age, Some(Age::new(3)));
        assert_eq!(label.stem, "TCB-2_3DPF_2ndcon-27_01_2025");
    }

    #[test]
    fn test_parse_file_label_without_age() {
        let label = parse_file_label("Muscarine_control.csv");
        assert_eq!(label.drug, "Muscarine");
        assert_eq!(label.age, None);
    }

    #[test]
    fn test_age_serde_as_label() {
        let yaml = serde_yaml::to_string(&Age::new(4)).unwrap();
        assert_eq!(yaml.trim(), "4DPF");
        let parsed: Age = serde_yaml::from_str("4dpf").unwrap();
        assert_eq!(parsed, Age::new(4));
    }
}
