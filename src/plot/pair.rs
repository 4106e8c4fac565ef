//! Single control vs drug comparisons and rows of them.

use crate::data::{Metric, Parameter};
use crate::error::{AssayError, Result};
use crate::plot::style::{Marker, PlotStyle, CONTROL_COLOR};
use crate::plot::violin::{draw_violin_panel, SignificanceBracket, ViolinPanel, ViolinSeries, YAxis};
use crate::plot::Figure;
use crate::profile::describe;
use crate::test::Significance;
use plotters::coord::Shift;
use plotters::prelude::*;

const VIOLIN_WIDTH: f64 = 0.5;

/// Control vs drug violins of one metric.
#[derive(Debug, Clone)]
pub struct PairFigure {
    pub control: Vec<f64>,
    pub drug: Vec<f64>,
    /// Tick label of the drug violin.
    pub drug_label: String,
    pub metric: Metric,
    pub significance: Significance,
    pub title: Option<String>,
    pub letter: Option<String>,
    drug_color: RGBColor,
    y_floor: Option<f64>,
}

impl PairFigure {
    pub fn new(
        control: Vec<f64>,
        drug: Vec<f64>,
        drug_label: &str,
        metric: Metric,
        significance: Significance,
        style: &PlotStyle,
    ) -> Result<Self> {
        let y_floor = match metric.parameter() {
            Parameter::Duration => style.duration_floor,
            Parameter::Distance => style.distance_floor,
        };
        Ok(Self {
            control,
            drug,
            drug_label: drug_label.to_string(),
            metric,
            significance,
            title: None,
            letter: None,
            drug_color: style.drug_rgb()?,
            y_floor,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_letter(mut self, letter: impl Into<String>) -> Self {
        self.letter = Some(letter.into());
        self
    }

    /// Bracket height: the larger maximum plus half the summed standard
    /// deviations. `None` for empty samples.
    pub fn bracket_y(&self) -> Option<f64> {
        let control = describe(&self.control);
        let drug = describe(&self.drug);
        let max = control.max.max(drug.max);
        let spread = [control.std, drug.std].iter().filter(|s| s.is_finite()).sum::<f64>();
        let y = max + 0.5 * spread;
        y.is_finite().then_some(y)
    }

    pub fn panel(&self) -> ViolinPanel {
        let parameter = self.metric.parameter();
        let sig_y = self.bracket_y();
        let brackets = sig_y
            .and_then(|y| SignificanceBracket::at(0.0, 1.0, y, self.significance))
            .into_iter()
            .collect();

        ViolinPanel {
            violins: vec![
                ViolinSeries {
                    position: 0.0,
                    values: self.control.clone(),
                    color: CONTROL_COLOR,
                    marker: Marker::Circle,
                },
                ViolinSeries {
                    position: 1.0,
                    values: self.drug.clone(),
                    color: self.drug_color,
                    marker: Marker::Circle,
                },
            ],
            width: VIOLIN_WIDTH,
            alpha: 0.8,
            brackets,
            ticks: vec![(0.0, "Control".to_string()), (1.0, self.drug_label.clone())],
            x_range: (-0.6, 1.6),
            y_label: format!("{} ({})", parameter.name(), parameter.unit()),
            y_axis: YAxis::Linear,
            y_floor: self.y_floor,
            y_ceiling: sig_y.map(|y| y * 1.15),
            letter: self.letter.clone(),
        }
    }
}

impl Figure for PairFigure {
    fn size(&self) -> (u32, u32) {
        (800, 450)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        match &self.title {
            Some(title) => {
                let body = root.titled(title, ("sans-serif", 18))?;
                draw_violin_panel(&body, &self.panel())
            }
            None => draw_violin_panel(root, &self.panel()),
        }
    }
}

/// Pair panels side by side.
#[derive(Debug, Clone)]
pub struct PanelRowFigure {
    panels: Vec<PairFigure>,
}

impl PanelRowFigure {
    pub fn new(panels: Vec<PairFigure>) -> Result<Self> {
        if panels.is_empty() {
            return Err(AssayError::InvalidParameter(
                "a panel row needs at least one panel".to_string(),
            ));
        }
        Ok(Self { panels })
    }

    pub fn panels(&self) -> &[PairFigure] {
        &self.panels
    }
}

impl Figure for PanelRowFigure {
    fn size(&self) -> (u32, u32) {
        (450 * self.panels.len() as u32, 450)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let areas = root.split_evenly((1, self.panels.len()));
        for (area, panel) in areas.iter().zip(&self.panels) {
            draw_violin_panel(area, &panel.panel())?;
        }
        Ok(())
    }
}
