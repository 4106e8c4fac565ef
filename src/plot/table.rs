//! A titled table rendered as a figure page.

use crate::error::{AssayError, Result};
use crate::plot::Figure;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const ROW_HEIGHT: u32 = 30;
const TITLE_HEIGHT: u32 = 60;
const MARGIN: u32 = 30;
const WIDTH: u32 = 1200;

/// Rows of text under a bold header.
#[derive(Debug, Clone)]
pub struct TableFigure {
    title: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableFigure {
    /// Every row must have one cell per column.
    pub fn new(title: &str, columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(AssayError::InvalidParameter("a table needs columns".to_string()));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(AssayError::InvalidParameter(format!(
                "table row {} has {} cells, expected {}",
                i + 1,
                rows[i].len(),
                columns.len()
            )));
        }
        Ok(Self {
            title: title.to_string(),
            columns,
            rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Top-left pixel of a cell; row 0 is the header.
    fn cell_origin(&self, row: usize, col: usize) -> (i32, i32) {
        let col_width = (WIDTH - 2 * MARGIN) / self.columns.len() as u32;
        (
            (MARGIN + col as u32 * col_width) as i32,
            (TITLE_HEIGHT + row as u32 * ROW_HEIGHT) as i32,
        )
    }
}

impl Figure for TableFigure {
    fn size(&self) -> (u32, u32) {
        (WIDTH, TITLE_HEIGHT + (self.rows.len() as u32 + 1) * ROW_HEIGHT + MARGIN)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.draw(&Text::new(
            self.title.clone(),
            ((WIDTH / 2) as i32, (TITLE_HEIGHT / 2) as i32),
            ("sans-serif", 24, FontStyle::Bold)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;

        let col_width = ((WIDTH - 2 * MARGIN) / self.columns.len() as u32) as i32;
        let header = std::iter::once(&self.columns);
        for (row_idx, cells) in header.chain(&self.rows).enumerate() {
            let bold = row_idx == 0;
            for (col_idx, cell) in cells.iter().enumerate() {
                let (x, y) = self.cell_origin(row_idx, col_idx);
                let corner = (x + col_width, y + ROW_HEIGHT as i32);
                if bold {
                    root.draw(&Rectangle::new([(x, y), corner], RGBColor(0xEE, 0xEE, 0xEE).filled()))?;
                }
                root.draw(&Rectangle::new([(x, y), corner], BLACK.stroke_width(1)))?;

                let style = if bold {
                    ("sans-serif", 16, FontStyle::Bold).into_font()
                } else {
                    ("sans-serif", 15).into_font()
                };
                root.draw(&Text::new(
                    cell.clone(),
                    (x + col_width / 2, y + ROW_HEIGHT as i32 / 2),
                    style.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
                ))?;
            }
        }
        Ok(())
    }
}
