//! Locomotion metrics and the categorical keys observations are grouped by.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// A locomotion measurement exported per animal and time bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Time spent in small (slow) movement, seconds.
    SmlDur,
    /// Distance travelled in small (slow) movement, millimetres.
    SmlDist,
    /// Time spent in large (fast) movement, seconds.
    LarDur,
    /// Distance travelled in large (fast) movement, millimetres.
    LarDist,
}

impl Metric {
    /// All metrics in export column order.
    pub const ALL: [Metric; 4] = [Metric::SmlDur, Metric::SmlDist, Metric::LarDur, Metric::LarDist];

    /// CSV column name.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::SmlDur => "smldur",
            Metric::SmlDist => "smldist",
            Metric::LarDur => "lardur",
            Metric::LarDist => "lardist",
        }
    }

    /// Parse a CSV column name.
    pub fn from_column(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "smldur" => Some(Metric::SmlDur),
            "smldist" => Some(Metric::SmlDist),
            "lardur" => Some(Metric::LarDur),
            "lardist" => Some(Metric::LarDist),
            _ => None,
        }
    }

    /// Swim mode the metric belongs to.
    pub fn mode(&self) -> SwimMode {
        match self {
            Metric::SmlDur | Metric::SmlDist => SwimMode::Slow,
            Metric::LarDur | Metric::LarDist => SwimMode::Fast,
        }
    }

    /// Physical quantity the metric measures.
    pub fn parameter(&self) -> Parameter {
        match self {
            Metric::SmlDur | Metric::LarDur => Parameter::Duration,
            Metric::SmlDist | Metric::LarDist => Parameter::Distance,
        }
    }

    /// The metric for a given mode and parameter.
    pub fn from_parts(mode: SwimMode, parameter: Parameter) -> Self {
        match (mode, parameter) {
            (SwimMode::Slow, Parameter::Duration) => Metric::SmlDur,
            (SwimMode::Slow, Parameter::Distance) => Metric::SmlDist,
            (SwimMode::Fast, Parameter::Duration) => Metric::LarDur,
            (SwimMode::Fast, Parameter::Distance) => Metric::LarDist,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Slow (small) vs fast (large) swimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SwimMode {
    Slow,
    Fast,
}

impl SwimMode {
    pub const ALL: [SwimMode; 2] = [SwimMode::Slow, SwimMode::Fast];

    pub fn name(&self) -> &'static str {
        match self {
            SwimMode::Slow => "Slow",
            SwimMode::Fast => "Fast",
        }
    }
}

/// Duration vs distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    Duration,
    Distance,
}

impl Parameter {
    pub const ALL: [Parameter; 2] = [Parameter::Duration, Parameter::Distance];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Duration => "Duration",
            Parameter::Distance => "Distance",
        }
    }

    /// Unit of the raw exported values.
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Duration => "s",
            Parameter::Distance => "mm",
        }
    }
}

/// Experimental group of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    Control,
    Drug,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Control, Group::Drug];

    pub fn name(&self) -> &'static str {
        match self {
            Group::Control => "Control",
            Group::Drug => "Drug",
        }
    }
}

/// One value per metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    pub smldur: f64,
    pub smldist: f64,
    pub lardur: f64,
    pub lardist: f64,
}

impl Measures {
    pub fn new(smldur: f64, smldist: f64, lardur: f64, lardist: f64) -> Self {
        Self {
            smldur,
            smldist,
            lardur,
            lardist,
        }
    }

    /// Whether every metric holds a finite value.
    pub fn is_finite(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_finite())
    }

    #[inline]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SmlDur => self.smldur,
            Metric::SmlDist => self.smldist,
            Metric::LarDur => self.lardur,
            Metric::LarDist => self.lardist,
        }
    }

    #[inline]
    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::SmlDur => self.smldur = value,
            Metric::SmlDist => self.smldist = value,
            Metric::LarDur => self.lardur = value,
            Metric::LarDist => self.lardist = value,
        }
    }
}

impl Add for Measures {
    type Output = Measures;

    fn add(self, rhs: Measures) -> Measures {
        Measures {
            smldur: self.smldur + rhs.smldur,
            smldist: self.smldist + rhs.smldist,
            lardur: self.lardur + rhs.lardur,
            lardist: self.lardist + rhs.lardist,
        }
    }
}

impl AddAssign for Measures {
    fn add_assign(&mut self, rhs: Measures) {
        *self = *self + rhs;
    }
}
