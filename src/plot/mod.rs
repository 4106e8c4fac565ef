//! Static figure rendering with plotters.
//!
//! Every figure implements [`Figure`] and can be written with
//! [`save_figure`], which picks SVG or bitmap output from the file
//! extension.

mod blocked;
mod kde;
mod pair;
mod style;
mod table;
mod violin;

pub use blocked::BlockedFigure;
pub use kde::gaussian_kde;
pub use pair::{PairFigure, PanelRowFigure};
pub use style::{hex_color, ColorScheme, Marker, PlotStyle, CONTROL_COLOR};
pub use table::TableFigure;
pub use violin::{
    draw_violin_panel, GroupedLayout, SignificanceBracket, ViolinPanel, ViolinSeries, ViolinShape, YAxis,
};

use crate::error::{AssayError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A figure that can be drawn on any plotters backend.
pub trait Figure {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);

    /// Draw onto `root`, which is already `size()` pixels.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Format implied by a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            _ => Err(AssayError::InvalidParameter(format!(
                "Unsupported figure format for {} (use .svg, .png or .jpeg)",
                path.display()
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Render `figure` to `path`.
pub fn save_figure<F: Figure, P: AsRef<Path>>(figure: &F, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let size = figure.size();
    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            figure.draw(&root)?;
            root.present()?;
        }
        OutputFormat::Png | OutputFormat::Jpeg => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            figure.draw(&root)?;
            root.present()?;
        }
    }
    tracing::info!(path = %path.display(), "wrote figure");
    Ok(())
}
