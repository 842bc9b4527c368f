// ============================================================
// RESPONSE TABLE
// ============================================================
// Immutable rows x named columns handed to the pipeline

use serde::{Deserialize, Serialize};

/// A single heterogeneous table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Classify a raw string value: blank is empty, numeric is a number
    pub fn from_raw(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Cell::Number(number),
            _ => Cell::Text(value.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(number) => number.is_nan(),
        }
    }

    /// String form of a non-empty cell; integral numbers render without a fraction
    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        match self {
            Cell::Text(text) => Some(text.clone()),
            Cell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                Some(format!("{}", *number as i64))
            }
            Cell::Number(number) => Some(number.to_string()),
            Cell::Empty => None,
        }
    }

    /// Numeric coercion; non-numeric text yields `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(number) if number.is_finite() => Some(*number),
            Cell::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_raw(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Survey responses: ordered rows over named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTable {
    /// Column headers, in source order
    pub headers: Vec<String>,

    /// Rows; a short row reads as empty in its missing columns
    pub rows: Vec<Vec<Cell>>,
}

impl ResponseTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Build from raw strings, classifying each value with [`Cell::from_raw`]
    pub fn from_strings(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.iter().map(|value| Cell::from_raw(value)).collect())
            .collect();
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    /// Cells of one column in row order
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&EMPTY_CELL))
    }

    /// Non-empty values of one column as strings, in row order
    pub fn column_texts(&self, index: usize) -> Vec<String> {
        self.column(index).filter_map(Cell::as_text).collect()
    }

    /// Numeric-coercible values of one column, in row order
    pub fn column_numbers(&self, index: usize) -> Vec<f64> {
        self.column(index).filter_map(Cell::as_number).collect()
    }
}
