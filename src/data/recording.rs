//! Raw per-animal, per-bin rows of a locomotion CSV export.

use crate::data::metric::{Measures, Metric};
use crate::error::{AssayError, Result};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One exported row: an animal and its measurements for one time bin.
#[derive(Debug, Clone, PartialEq)]
pub struct BinRow {
    pub animal: String,
    pub measures: Measures,
}

/// The rows of one CSV export, in file order.
#[derive(Debug, Clone)]
pub struct Recording {
    source: Option<PathBuf>,
    rows: Vec<BinRow>,
}

impl Recording {
    /// Create a recording from rows.
    pub fn new(rows: Vec<BinRow>) -> Self {
        Self { source: None, rows }
    }

    /// Load a recording from a CSV file.
    ///
    /// The header must contain an `animal` column and the four metric columns
    /// (`smldur`, `smldist`, `lardur`, `lardist`); other columns are ignored.
    /// Only the first `max_rows` data rows are read, since exports carry
    /// trailing summary rows. A blank metric cell is read as NaN and the row
    /// is kept in place; extraction treats it as a missing bin.
    pub fn from_csv<P: AsRef<Path>>(path: P, max_rows: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut recording = Self::from_reader(file, max_rows)?;
        recording.source = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            rows = recording.n_rows(),
            animals = recording.animals().len(),
            "loaded recording"
        );
        Ok(recording)
    }

    /// Load a recording from any CSV reader.
    pub fn from_reader<R: Read>(reader: R, max_rows: Option<usize>) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| AssayError::MissingColumn(name.to_string()))
        };
        let animal_idx = find("animal")?;
        let metric_idx: Vec<(Metric, usize)> = Metric::ALL
            .iter()
            .map(|m| find(m.column()).map(|idx| (*m, idx)))
            .collect::<Result<_>>()?;

        let mut rows = Vec::new();
        for (row_idx, record) in csv_reader.records().enumerate() {
            if max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }
            let record = record?;
            let row = row_idx + 1;

            let animal = record
                .get(animal_idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AssayError::InvalidValue {
                    value: String::new(),
                    row,
                    column: "animal".to_string(),
                })?
                .to_string();

            let mut measures = Measures::default();
            for (metric, idx) in &metric_idx {
                let raw = record.get(*idx).unwrap_or("");
                if raw.is_empty() {
                    tracing::warn!(row, animal = %animal, column = metric.column(), "blank value");
                    measures.set(*metric, f64::NAN);
                    continue;
                }
                let value: f64 = raw.parse().map_err(|_| AssayError::InvalidValue {
                    value: raw.to_string(),
                    row,
                    column: metric.column().to_string(),
                })?;
                measures.set(*metric, value);
            }
            rows.push(BinRow { animal, measures });
        }

        if rows.is_empty() {
            return Err(AssayError::EmptyData("No data rows in recording".to_string()));
        }

        Ok(Self { source: None, rows })
    }

    /// File the recording was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[BinRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Unique animal IDs, sorted lexicographically.
    pub fn animals(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.animal.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "location,animal,start,end,smlct,smldur,smldist,larct,lardur,lardist";

    #[test]
    fn test_load_recording() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "c1,WT002,0,300,10,12.5,40.0,3,1.5,20.0").unwrap();
        writeln!(file, "c2,WT001,0,300,11,10.0,35.5,2,1.0,18.0").unwrap();
        file.flush().unwrap();

        let rec = Recording::from_csv(file.path(), None).unwrap();
        assert_eq!(rec.n_rows(), 2);
        assert_eq!(rec.animals(), vec!["WT001", "WT002"]);
        assert_eq!(rec.rows()[0].measures.get(Metric::SmlDist), 40.0);
        assert_eq!(rec.source(), Some(file.path()));
    }

    #[test]
    fn test_max_rows_skips_trailing_summary() {
        let data = format!(
            "{}\nc1,WT001,0,300,1,1,1,1,1,1\nc2,WT002,0,300,1,2,2,2,2,2\n,TOTAL,,,,n/a,,,,\n",
            HEADER
        );
        let rec = Recording::from_reader(data.as_bytes(), Some(2)).unwrap();
        assert_eq!(rec.n_rows(), 2);
    }

    #[test]
    fn test_missing_column() {
        let data = "animal,smldur,smldist,lardur\nWT001,1,2,3\n";
        let err = Recording::from_reader(data.as_bytes(), None).unwrap_err();
        assert!(matches!(err, AssayError::MissingColumn(ref c) if c == "lardist"));
    }

    #[test]
    fn test_invalid_value_reports_position() {
        let data = "animal,smldur,smldist,lardur,lardist\nWT001,1,2,3,4\nWT002,1,abc,3,4\n";
        let err = Recording::from_reader(data.as_bytes(), None).unwrap_err();
        match err {
            AssayError::InvalidValue { value, row, column } => {
                assert_eq!(value, "abc");
                assert_eq!(row, 2);
                assert_eq!(column, "smldist");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_value_is_nan() {
        let data = "animal,smldur,smldist,lardur,lardist\nWT001,1,,3,4\nWT002,1,2,3,4\n";
        let rec = Recording::from_reader(data.as_bytes(), None).unwrap();
        assert_eq!(rec.n_rows(), 2);
        assert!(rec.rows()[0].measures.get(Metric::SmlDist).is_nan());
        assert!(!rec.rows()[0].measures.is_finite());
        assert!(rec.rows()[1].measures.is_finite());
    }

    #[test]
    fn test_empty_recording() {
        let data = "animal,smldur,smldist,lardur,lardist\n";
        assert!(matches!(
            Recording::from_reader(data.as_bytes(), None),
            Err(AssayError::EmptyData(_))
        ));
    }
}
