use std::cmp::Ordering;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// One metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Total order: missing first, then numbers ascending, then text.
    pub fn total_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Missing, Cell::Missing) => Ordering::Equal,
            (Cell::Missing, _) => Ordering::Less,
            (_, Cell::Missing) => Ordering::Greater,
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => write!(f, "NA"),
        }
    }
}

/// Whether a target is predicted by a classifier or a regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Categorical,
    Continuous,
}

/// A named metadata column used as a prediction target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetColumn {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl TargetColumn {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        TargetColumn {
            name: name.into(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row indices holding a value.
    pub fn present_rows(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_missing())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn select(&self, rows: &[usize]) -> TargetColumn {
        TargetColumn {
            name: self.name.clone(),
            cells: rows.iter().map(|&i| self.cells[i].clone()).collect(),
        }
    }

    /// Text, or integer-valued numbers, make a categorical target.
    pub fn kind(&self) -> BenchResult<TargetKind> {
        let mut present = self.cells.iter().filter(|c| !c.is_missing()).peekable();
        if present.peek().is_none() {
            return Err(BenchError::EmptyInput);
        }
        let mut all_integer = true;
        for cell in present {
            match cell {
                Cell::Text(_) => return Ok(TargetKind::Categorical),
                Cell::Number(v) => {
                    if v.fract() != 0.0 || !v.is_finite() {
                        all_integer = false;
                    }
                }
                Cell::Missing => {}
            }
        }
        Ok(if all_integer {
            TargetKind::Categorical
        } else {
            TargetKind::Continuous
        })
    }

    /// Numeric values of a fully present numeric column.
    pub fn to_f64(&self) -> BenchResult<Array1<f64>> {
        self.cells
            .iter()
            .map(|c| {
                c.as_f64().ok_or_else(|| {
                    BenchError::InvalidOperation(format!(
                        "column '{}' holds non-numeric value '{}'",
                        self.name, c
                    ))
                })
            })
            .collect::<BenchResult<Vec<f64>>>()
            .map(Array1::from)
    }
}
