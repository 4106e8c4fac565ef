//! Grouped control vs drug figure across ages, one panel per parameter.

use crate::data::{Age, Group, Metric, ObservationSet, Parameter, SwimMode};
use crate::error::Result;
use crate::plot::style::{ColorScheme, Marker, PlotStyle};
use crate::plot::violin::{
    draw_violin_panel, GroupedLayout, SignificanceBracket, ViolinPanel, ViolinSeries, YAxis,
};
use crate::plot::Figure;
use crate::test::Significance;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;

const VIOLIN_WIDTH: f64 = 0.35;
/// Lower limit of a log distance axis, in display units.
const LOG_FLOOR: f64 = 0.1;

/// Duration and distance panels of control vs drug violins per age and
/// swim mode, with brackets over significant pairs.
#[derive(Debug, Clone)]
pub struct BlockedFigure {
    title: String,
    ages: Vec<Age>,
    values: BTreeMap<(Age, Metric, Group), Vec<f64>>,
    marks: Vec<(Age, Metric, Significance)>,
    style: PlotStyle,
    layout: GroupedLayout,
}

impl BlockedFigure {
    pub fn new(observations: &ObservationSet, style: &PlotStyle) -> Self {
        let mut values: BTreeMap<(Age, Metric, Group), Vec<f64>> = BTreeMap::new();
        for o in observations.iter() {
            values.entry((o.age, o.metric, o.group)).or_default().push(o.value);
        }
        let title = format!("Treatment: {}", observations.drug().unwrap_or("unknown"));
        Self {
            title,
            ages: observations.ages(),
            values,
            marks: Vec::new(),
            style: style.clone(),
            layout: GroupedLayout::default(),
        }
    }

    /// Annotate the control vs drug pair of one age and metric.
    pub fn mark(&mut self, age: Age, metric: Metric, significance: Significance) {
        self.marks.push((age, metric, significance));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn scale(&self, parameter: Parameter) -> f64 {
        if parameter == Parameter::Distance && self.style.distance_in_metres {
            1e-3
        } else {
            1.0
        }
    }

    fn scaled(&self, age: Age, metric: Metric, group: Group) -> Vec<f64> {
        let scale = self.scale(metric.parameter());
        self.values
            .get(&(age, metric, group))
            .map(|v| v.iter().map(|x| x * scale).collect())
            .unwrap_or_default()
    }

    /// The panel of one parameter.
    pub fn panel(&self, parameter: Parameter) -> ViolinPanel {
        let scheme = self.style.scheme;
        let mut violins = Vec::new();
        let mut ticks = Vec::new();

        for (age_idx, &age) in self.ages.iter().enumerate() {
            for (mode_idx, &mode) in SwimMode::ALL.iter().enumerate() {
                let metric = Metric::from_parts(mode, parameter);
                for (group_idx, &group) in Group::ALL.iter().enumerate() {
                    violins.push(ViolinSeries {
                        position: self.layout.position(age_idx, mode_idx, group_idx),
                        values: self.scaled(age, metric, group),
                        color: scheme.color(age_idx, mode, group),
                        marker: Marker::for_age(age_idx),
                    });
                }
            }
            ticks.push((self.layout.tick(age_idx), age.to_string()));
        }

        let brackets = self
            .marks
            .iter()
            .filter(|(_, metric, _)| metric.parameter() == parameter)
            .filter_map(|&(age, metric, significance)| {
                let age_idx = self.ages.iter().position(|&a| a == age)?;
                let mode_idx = SwimMode::ALL.iter().position(|&m| m == metric.mode())?;
                let max = Group::ALL
                    .iter()
                    .flat_map(|&g| self.scaled(age, metric, g))
                    .fold(f64::NEG_INFINITY, f64::max);
                if !max.is_finite() {
                    return None;
                }
                SignificanceBracket::new(
                    self.layout.position(age_idx, mode_idx, 0),
                    self.layout.position(age_idx, mode_idx, 1),
                    max,
                    significance,
                )
            })
            .collect();

        let log = parameter == Parameter::Distance && self.style.log_distance;
        let unit = match parameter {
            Parameter::Distance if self.style.distance_in_metres => "m",
            p => p.unit(),
        };

        ViolinPanel {
            violins,
            width: VIOLIN_WIDTH,
            alpha: match scheme {
                ColorScheme::ByMode => 0.8,
                ColorScheme::ByAge => 1.0,
            },
            brackets,
            ticks,
            x_range: self.layout.x_range(self.ages.len()),
            y_label: format!("{} ({})", parameter.name(), unit),
            y_axis: if log { YAxis::Log10 } else { YAxis::Linear },
            y_floor: if log { Some(LOG_FLOOR) } else { None },
            y_ceiling: None,
            letter: None,
        }
    }
}

fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, entries: &[(&str, RGBColor)]) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let slot = 220;
    let start = (width as i32 - slot * entries.len() as i32) / 2;
    for (i, (label, color)) in entries.iter().enumerate() {
        let x = start + slot * i as i32;
        area.draw(&Rectangle::new([(x, 10), (x + 18, 28)], color.filled()))?;
        area.draw(&Rectangle::new([(x, 10), (x + 18, 28)], BLACK.stroke_width(1)))?;
        area.draw(&Text::new(
            label.to_string(),
            (x + 26, 12),
            ("sans-serif", 16).into_font().color(&BLACK),
        ))?;
    }
    Ok(())
}

impl Figure for BlockedFigure {
    fn size(&self) -> (u32, u32) {
        (1200, 900)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let body = root.titled(&self.title, ("sans-serif", 24, FontStyle::Bold))?;
        let legend = self.style.scheme.legend();
        let body = if legend.is_empty() {
            body
        } else {
            let (legend_area, rest) = body.split_vertically(40);
            draw_legend(&legend_area, &legend)?;
            rest
        };

        let panels = body.split_evenly((2, 1));
        for (area, parameter) in panels.iter().zip(Parameter::ALL) {
            draw_violin_panel(area, &self.panel(parameter))?;
        }
        Ok(())
    }
}
