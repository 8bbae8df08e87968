use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use latent_bench_core::{Cell, TargetColumn};
use ndarray::Array2;

use crate::error::{IoError, IoResult};

/// Field values treated as missing.
pub const MISSING_MARKERS: [&str; 8] = ["", "NA", "NaN", "nan", "N/A", "n/a", "NULL", "null"];

/// Tab-separated metadata table with one row per subject.
///
/// A column holding any non-numeric value is read entirely as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaTable {
    columns: Vec<String>,
    /// Column-major cells.
    cells: Vec<Vec<Cell>>,
    n_rows: usize,
}

fn parse_column(raw: Vec<String>) -> Vec<Cell> {
    let is_missing = |s: &str| MISSING_MARKERS.contains(&s);
    let numeric = raw
        .iter()
        .all(|s| is_missing(s) || s.parse::<f64>().is_ok());
    raw.into_iter()
        .map(|s| {
            if is_missing(&s) {
                Cell::Missing
            } else if numeric {
                s.parse::<f64>().map(Cell::Number).unwrap_or(Cell::Missing)
            } else {
                Cell::Text(s)
            }
        })
        .collect()
}

impl MetaTable {
    pub fn from_tsv(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        log::debug!(
            "{}: {} rows, columns {:?}",
            path.display(),
            table.n_rows,
            table.columns
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> IoResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); columns.len()];
        for record in rdr.records() {
            let record = record?;
            for (j, column) in raw.iter_mut().enumerate() {
                column.push(record.get(j).unwrap_or("").trim().to_string());
            }
        }
        let n_rows = raw.first().map(Vec::len).unwrap_or(0);
        let cells = raw.into_iter().map(parse_column).collect();
        Ok(MetaTable {
            columns,
            cells,
            n_rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sorted_columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn position(&self, name: &str) -> IoResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| IoError::UnknownColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> IoResult<TargetColumn> {
        let j = self.position(name)?;
        Ok(TargetColumn::new(name, self.cells[j].clone()))
    }
}

/// Boolean label matrix used to stratify splits.
///
/// Numeric columns give one label each (nonzero or missing is set); text
/// columns give one label per distinct value.
pub fn indicator_matrix(table: &MetaTable, columns: &[String]) -> IoResult<Array2<bool>> {
    let mut labels: Vec<Vec<bool>> = Vec::new();
    for name in columns {
        let j = table.position(name)?;
        let cells = &table.cells[j];
        let has_text = cells.iter().any(|c| matches!(c, Cell::Text(_)));
        if has_text {
            let values: BTreeSet<&str> = cells
                .iter()
                .filter_map(|c| match c {
                    Cell::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            for value in values {
                labels.push(
                    cells
                        .iter()
                        .map(|c| matches!(c, Cell::Text(s) if s == value))
                        .collect(),
                );
            }
        } else {
            labels.push(
                cells
                    .iter()
                    .map(|c| match c {
                        Cell::Number(v) => *v != 0.0,
                        _ => true,
                    })
                    .collect(),
            );
        }
    }
    let n_rows = table.n_rows();
    Ok(Array2::from_shape_fn((n_rows, labels.len()), |(i, l)| labels[l][i]))
}
