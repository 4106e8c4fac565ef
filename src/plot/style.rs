//! Colours, markers and figure-wide style options.

use crate::data::{Group, SwimMode};
use crate::error::{AssayError, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Control violins are always grey.
pub const CONTROL_COLOR: RGBColor = RGBColor(0xAA, 0xAA, 0xAA);

const SLOW_DRUG: RGBColor = RGBColor(0x5D, 0xAD, 0xE2);
const FAST_DRUG: RGBColor = RGBColor(0xF1, 0x94, 0x8A);

/// Light to dark, one shade per age.
const SLOW_BY_AGE: [RGBColor; 3] = [
    RGBColor(0x92, 0xB4, 0xF9),
    RGBColor(0x5A, 0x87, 0xF0),
    RGBColor(0x12, 0x67, 0xE9),
];
const FAST_BY_AGE: [RGBColor; 3] = [
    RGBColor(0xF9, 0xA3, 0xA9),
    RGBColor(0xD9, 0x4B, 0x55),
    RGBColor(0xE6, 0x39, 0x46),
];

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn hex_color(hex: &str) -> Result<RGBColor> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AssayError::InvalidParameter(format!(
            "'{}' is not a #RRGGBB colour",
            hex
        )));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| AssayError::InvalidParameter(format!("'{}' is not a #RRGGBB colour", hex)))
    };
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// How drug violins are coloured in the grouped figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// One colour per swim mode, with a legend.
    #[default]
    ByMode,
    /// Age-graded shades per swim mode.
    ByAge,
}

impl ColorScheme {
    pub fn color(&self, age_idx: usize, mode: SwimMode, group: Group) -> RGBColor {
        if group == Group::Control {
            return CONTROL_COLOR;
        }
        match (self, mode) {
            (ColorScheme::ByMode, SwimMode::Slow) => SLOW_DRUG,
            (ColorScheme::ByMode, SwimMode::Fast) => FAST_DRUG,
            (ColorScheme::ByAge, SwimMode::Slow) => SLOW_BY_AGE[age_idx.min(SLOW_BY_AGE.len() - 1)],
            (ColorScheme::ByAge, SwimMode::Fast) => FAST_BY_AGE[age_idx.min(FAST_BY_AGE.len() - 1)],
        }
    }

    /// Legend entries; the age-graded scheme has none.
    pub fn legend(&self) -> Vec<(&'static str, RGBColor)> {
        match self {
            ColorScheme::ByMode => vec![
                ("Control", CONTROL_COLOR),
                ("Drug - Slow swim", SLOW_DRUG),
                ("Drug - Fast swim", FAST_DRUG),
            ],
            ColorScheme::ByAge => Vec::new(),
        }
    }
}

/// Scatter marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Triangle,
    Square,
}

impl Marker {
    /// Marker of the `age_idx`-th age, cycling circle, triangle, square.
    pub fn for_age(age_idx: usize) -> Self {
        match age_idx % 3 {
            0 => Marker::Circle,
            1 => Marker::Triangle,
            _ => Marker::Square,
        }
    }
}

/// Presentation options shared by all figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Drug colouring of the grouped figure.
    pub scheme: ColorScheme,
    /// Drug colour of pairwise figures.
    pub drug_color: String,
    /// Show distances in metres instead of millimetres.
    pub distance_in_metres: bool,
    /// Log-10 distance axis in the grouped figure.
    pub log_distance: bool,
    /// Lower y limit of duration panels in pairwise figures.
    pub duration_floor: Option<f64>,
    /// Lower y limit of distance panels in pairwise figures.
    pub distance_floor: Option<f64>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::ByMode,
            drug_color: "#DC143C".to_string(),
            distance_in_metres: false,
            log_distance: false,
            duration_floor: Some(-50.0),
            distance_floor: Some(-1500.0),
        }
    }
}

impl PlotStyle {
    /// Age-graded colours with distances in metres on a log axis.
    pub fn poster() -> Self {
        Self {
            scheme: ColorScheme::ByAge,
            distance_in_metres: true,
            log_distance: true,
            ..Default::default()
        }
    }

    pub fn drug_rgb(&self) -> Result<RGBColor> {
        hex_color(&self.drug_color)
    }
}
