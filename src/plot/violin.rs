//! Violin panels: outline geometry, grouped positions, significance brackets
//! and the renderer every figure draws its panels with.

use crate::error::Result;
use crate::plot::kde::gaussian_kde;
use crate::plot::style::Marker;
use crate::test::Significance;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Points the density is evaluated at.
const KDE_POINTS: usize = 100;
/// Smallest value shown on a log axis.
const LOG_MIN: f64 = 1e-6;

/// Outline and summary bars of one violin, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinShape {
    pub center: f64,
    pub width: f64,
    /// Closed outline (right side bottom-up, then left side top-down); a flat
    /// two-point line when the density is undefined.
    pub outline: Vec<(f64, f64)>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ViolinShape {
    /// Violin of `values` centred at `center`, `width` wide at its widest.
    ///
    /// Returns `None` for an empty sample.
    pub fn new(values: &[f64], center: f64, width: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let half = width / 2.0;

        let outline = match gaussian_kde(values, KDE_POINTS) {
            Some(density) => {
                let peak = density.iter().map(|p| p.1).fold(0.0, f64::max);
                let scale = if peak > 0.0 { half / peak } else { 0.0 };
                let right = density.iter().map(|&(y, d)| (center + d * scale, y));
                let left = density.iter().rev().map(|&(y, d)| (center - d * scale, y));
                right.chain(left).collect()
            }
            None => vec![(center - half, mean), (center + half, mean)],
        };

        Some(Self {
            center,
            width,
            outline,
            mean,
            min,
            max,
        })
    }

    /// Whether the outline is a real shape rather than a flat line.
    pub fn has_body(&self) -> bool {
        self.outline.len() > 2
    }

    /// Apply `f` to every y coordinate (axis transforms).
    pub fn map_y<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            center: self.center,
            width: self.width,
            outline: self.outline.iter().map(|&(x, y)| (x, f(y))).collect(),
            mean: f(self.mean),
            min: f(self.min),
            max: f(self.max),
        }
    }

    /// Mean, min and max bars plus the vertical extent bar.
    pub fn bars(&self) -> Vec<[(f64, f64); 2]> {
        let q = self.width / 4.0;
        let c = self.center;
        vec![
            [(c - q, self.mean), (c + q, self.mean)],
            [(c - q, self.min), (c + q, self.min)],
            [(c - q, self.max), (c + q, self.max)],
            [(c, self.min), (c, self.max)],
        ]
    }
}

/// X positions of violins grouped by age, then swim mode, then group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedLayout {
    pub age_gap: f64,
    pub mode_gap: f64,
    pub group_gap: f64,
    pub n_modes: usize,
}

impl Default for GroupedLayout {
    fn default() -> Self {
        Self {
            age_gap: 3.0,
            mode_gap: 1.0,
            group_gap: 0.4,
            n_modes: 2,
        }
    }
}

impl GroupedLayout {
    pub fn position(&self, age_idx: usize, mode_idx: usize, group_idx: usize) -> f64 {
        age_idx as f64 * self.age_gap + mode_idx as f64 * self.mode_gap + group_idx as f64 * self.group_gap
    }

    /// Centre of an age block, where its tick label goes.
    pub fn tick(&self, age_idx: usize) -> f64 {
        age_idx as f64 * self.age_gap + 0.5 * (self.n_modes as f64 * self.mode_gap + self.group_gap)
    }

    /// X range covering `n_ages` blocks with some padding.
    pub fn x_range(&self, n_ages: usize) -> (f64, f64) {
        let last = self.position(n_ages.saturating_sub(1), self.n_modes.saturating_sub(1), 1);
        (-0.5, last + 0.5)
    }
}

/// Bracket joining two violins whose comparison is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceBracket {
    pub x_start: f64,
    pub x_end: f64,
    /// Height of the bracket feet, in data units.
    pub y: f64,
    pub significance: Significance,
}

impl SignificanceBracket {
    /// Bracket 5% above the larger maximum; `None` when not significant.
    pub fn new(x_start: f64, x_end: f64, max_value: f64, significance: Significance) -> Option<Self> {
        Self::at(x_start, x_end, max_value * 1.05, significance)
    }

    /// Bracket with its feet at `y`; `None` when not significant.
    pub fn at(x_start: f64, x_end: f64, y: f64, significance: Significance) -> Option<Self> {
        significance.is_significant().then(|| Self {
            x_start,
            x_end,
            y,
            significance,
        })
    }

    pub fn stars(&self) -> &'static str {
        self.significance.stars()
    }

    pub fn mid(&self) -> f64 {
        (self.x_start + self.x_end) / 2.0
    }
}

/// Linear or log-10 value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YAxis {
    #[default]
    Linear,
    Log10,
}

impl YAxis {
    /// Map a data value into chart coordinates.
    pub fn transform(&self, v: f64) -> f64 {
        match self {
            YAxis::Linear => v,
            YAxis::Log10 => v.max(LOG_MIN).log10(),
        }
    }

    /// Tick label of a chart coordinate.
    pub fn format_tick(&self, v: f64) -> String {
        match self {
            YAxis::Linear => format_number(v),
            YAxis::Log10 => format_number(10f64.powf(v)),
        }
    }
}

fn format_number(v: f64) -> String {
    let a = v.abs();
    if a == 0.0 {
        "0".to_string()
    } else if a >= 1e5 || a < 1e-3 {
        format!("{:.0e}", v)
    } else if a >= 10.0 {
        format!("{:.0}", v)
    } else if a >= 1.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.3}", v)
    }
}

/// One violin with its scatter overlay.
#[derive(Debug, Clone)]
pub struct ViolinSeries {
    pub position: f64,
    pub values: Vec<f64>,
    pub color: RGBColor,
    pub marker: Marker,
}

/// Everything needed to draw one violin panel.
#[derive(Debug, Clone)]
pub struct ViolinPanel {
    pub violins: Vec<ViolinSeries>,
    /// Widest violin extent in x units.
    pub width: f64,
    /// Fill opacity of violin bodies.
    pub alpha: f64,
    pub brackets: Vec<SignificanceBracket>,
    /// Tick labels at x positions.
    pub ticks: Vec<(f64, String)>,
    pub x_range: (f64, f64),
    pub y_label: String,
    pub y_axis: YAxis,
    /// Lower y limit in data units; the axis still extends to any lower value.
    pub y_floor: Option<f64>,
    /// Upper y limit in data units, ignored unless above every value and bracket.
    pub y_ceiling: Option<f64>,
    /// Bold panel letter in the top-left corner.
    pub letter: Option<String>,
}

impl ViolinPanel {
    /// Y range in chart coordinates, leaving room above brackets for stars.
    pub fn y_range(&self) -> (f64, f64) {
        let axis = self.y_axis;
        let values: Vec<f64> = self
            .violins
            .iter()
            .flat_map(|v| v.values.iter().map(|&y| axis.transform(y)))
            .filter(|y| y.is_finite())
            .collect();

        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if values.is_empty() {
            lo = 0.0;
            hi = 1.0;
        }
        for b in &self.brackets {
            hi = hi.max(axis.transform(b.y));
        }

        let span = if hi > lo { hi - lo } else { 1.0 };
        let hi = match self.y_ceiling.map(|c| axis.transform(c)) {
            Some(ceiling) if ceiling > hi => ceiling,
            _ => hi + 0.15 * span,
        };
        let lo = match self.y_floor {
            Some(floor) => axis.transform(floor).min(lo),
            None => lo - 0.05 * span,
        };
        (lo, hi)
    }

    /// Length of bracket feet in chart coordinates.
    fn bracket_leg(&self, y_range: (f64, f64)) -> f64 {
        0.02 * (y_range.1 - y_range.0)
    }
}

/// Draw a violin panel into `area`.
pub fn draw_violin_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &ViolinPanel,
) -> Result<()> {
    let axis = panel.y_axis;
    let (y_lo, y_hi) = panel.y_range();
    let (x_lo, x_hi) = panel.x_range;

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .margin_left(if panel.letter.is_some() { 40 } else { 10 })
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_desc(panel.y_label.as_str())
        .y_label_formatter(&|v| axis.format_tick(*v))
        .axis_desc_style(("sans-serif", 18, FontStyle::Bold))
        .label_style(("sans-serif", 14))
        .draw()?;

    for v in &panel.violins {
        let shape = match ViolinShape::new(&v.values, v.position, panel.width) {
            Some(s) => s.map_y(|y| axis.transform(y)),
            None => continue,
        };

        if shape.has_body() {
            chart.draw_series(std::iter::once(Polygon::new(
                shape.outline.clone(),
                v.color.mix(panel.alpha).filled(),
            )))?;
            let mut border = shape.outline.clone();
            border.push(shape.outline[0]);
            chart.draw_series(std::iter::once(PathElement::new(border, BLACK.stroke_width(1))))?;
        } else {
            chart.draw_series(std::iter::once(PathElement::new(
                shape.outline.clone(),
                v.color.stroke_width(2),
            )))?;
        }
        chart.draw_series(
            shape
                .bars()
                .into_iter()
                .map(|bar| PathElement::new(bar.to_vec(), BLACK.stroke_width(1))),
        )?;

        let points: Vec<(f64, f64)> = v
            .values
            .iter()
            .map(|&y| (v.position, axis.transform(y)))
            .collect();
        let style = BLACK.mix(0.6).filled();
        match v.marker {
            Marker::Circle => {
                chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, style)))?;
            }
            Marker::Triangle => {
                chart.draw_series(points.iter().map(|&p| TriangleMarker::new(p, 5, style)))?;
            }
            Marker::Square => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|&p| EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], style)),
                )?;
            }
        }
    }

    let leg = panel.bracket_leg((y_lo, y_hi));
    for b in &panel.brackets {
        let y = axis.transform(b.y);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(b.x_start, y), (b.x_start, y + leg), (b.x_end, y + leg), (b.x_end, y)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            b.stars().to_string(),
            (b.mid(), y + leg),
            ("sans-serif", 22)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom)),
        )))?;
    }

    // Tick labels sit at arbitrary x positions, so they are placed by hand.
    let base = area.get_base_pixel();
    for (x, label) in &panel.ticks {
        let (px, py) = chart.backend_coord(&(*x, y_lo));
        area.draw(&Text::new(
            label.clone(),
            (px - base.0, py - base.1 + 8),
            ("sans-serif", 18, FontStyle::Bold)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;
    }

    if let Some(letter) = &panel.letter {
        area.draw(&Text::new(
            letter.clone(),
            (8, 8),
            ("sans-serif", 28, FontStyle::Bold).into_font().color(&BLACK),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_violin_outline_width() {
        let shape = ViolinShape::new(&[1.0, 2.0, 2.5, 3.0, 5.0], 2.0, 0.5).unwrap();
        assert!(shape.has_body());
        assert_eq!(shape.outline.len(), 2 * KDE_POINTS);
        let widest = shape
            .outline
            .iter()
            .map(|p| (p.0 - 2.0).abs())
            .fold(0.0, f64::max);
        assert_relative_eq!(widest, 0.25, epsilon = 1e-12);
        assert_relative_eq!(shape.mean, 2.7, epsilon = 1e-12);
        assert_eq!((shape.min, shape.max), (1.0, 5.0));
        assert_eq!(shape.outline[0].1, 1.0);
        assert_relative_eq!(shape.outline[KDE_POINTS - 1].1, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_violin_degenerate_is_flat() {
        let shape = ViolinShape::new(&[3.0, 3.0], 1.0, 0.4).unwrap();
        assert!(!shape.has_body());
        assert_eq!(shape.outline, vec![(0.8, 3.0), (1.2, 3.0)]);
        assert!(ViolinShape::new(&[], 0.0, 1.0).is_none());
    }

    #[test]
    fn test_map_y_and_bars() {
        let shape = ViolinShape::new(&[1.0, 10.0, 100.0], 0.0, 1.0).unwrap();
        let log = shape.map_y(|y| YAxis::Log10.transform(y));
        assert_relative_eq!(log.min, 0.0);
        assert_relative_eq!(log.max, 2.0, epsilon = 1e-12);
        let bars = log.bars();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[3][0], (0.0, 0.0));
        assert_relative_eq!(bars[3][1].1, 2.0, epsilon = 1e-12);
        assert_eq!(bars[0][0].0, -0.25);
    }

    #[test]
    fn test_grouped_layout() {
        let layout = GroupedLayout::default();
        assert_relative_eq!(layout.position(0, 0, 0), 0.0);
        assert_relative_eq!(layout.position(1, 1, 1), 4.4);
        assert_relative_eq!(layout.position(2, 0, 1), 6.4);
        assert_relative_eq!(layout.tick(0), 1.2);
        assert_relative_eq!(layout.tick(2), 7.2);
        let (lo, hi) = layout.x_range(3);
        assert_relative_eq!(lo, -0.5);
        assert_relative_eq!(hi, 7.9);
    }

    #[test]
    fn test_bracket() {
        assert!(SignificanceBracket::new(0.0, 0.4, 10.0, Significance::NotSignificant).is_none());
        let b = SignificanceBracket::new(0.0, 0.4, 10.0, Significance::Two).unwrap();
        assert_relative_eq!(b.y, 10.5);
        assert_relative_eq!(b.mid(), 0.2);
        assert_eq!(b.stars(), "**");
    }

    fn panel(values: Vec<f64>, axis: YAxis, floor: Option<f64>) -> ViolinPanel {
        ViolinPanel {
            violins: vec![ViolinSeries {
                position: 0.0,
                values,
                color: RGBColor(0, 0, 0),
                marker: Marker::Circle,
            }],
            width: 0.5,
            alpha: 0.8,
            brackets: vec![],
            ticks: vec![],
            x_range: (-0.5, 1.5),
            y_label: "Duration (s)".to_string(),
            y_axis: axis,
            y_floor: floor,
            y_ceiling: None,
            letter: None,
        }
    }

    #[test]
    fn test_y_range_includes_brackets_and_floor() {
        let mut p = panel(vec![0.0, 100.0], YAxis::Linear, Some(-50.0));
        p.brackets
            .push(SignificanceBracket::new(0.0, 1.0, 100.0, Significance::One).unwrap());
        let (lo, hi) = p.y_range();
        assert_relative_eq!(lo, -50.0);
        assert!(hi > 105.0);

        let p = panel(vec![0.5, 50.0], YAxis::Log10, Some(0.1));
        let (lo, hi) = p.y_range();
        assert_relative_eq!(lo, -1.0, epsilon = 1e-12);
        assert!(hi > 50f64.log10());
    }

    #[test]
    fn test_y_ceiling() {
        let mut p = panel(vec![0.0, 100.0], YAxis::Linear, None);
        p.y_ceiling = Some(140.0);
        assert_relative_eq!(p.y_range().1, 140.0);

        p.y_ceiling = Some(90.0);
        assert_relative_eq!(p.y_range().1, 115.0);
    }

    #[test]
    fn test_tick_format() {
        assert_eq!(YAxis::Log10.format_tick(1.0), "10");
        assert_eq!(YAxis::Log10.format_tick(-1.0), "0.100");
        assert_eq!(YAxis::Linear.format_tick(2.5), "2.5");
        assert_eq!(YAxis::Linear.format_tick(0.0), "0");
    }
}
