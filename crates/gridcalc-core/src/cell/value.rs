//! Cell value types

use std::fmt;

/// The raw value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the value, if it has one
    ///
    /// Text is parsed as a float after trimming. Unparseable text and the
    /// spelled-out non-finite forms (`inf`, `NaN`) are `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Empty => None,
        }
    }

    /// Coerce to a number for arithmetic: non-numeric text and empty cells are zero
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// A single grid cell
///
/// `formula` holds the raw formula text (starting with `=`) when the cell is a
/// formula cell; `value`, `display` and `error` then hold the last evaluation
/// result.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub value: CellValue,
    pub formula: Option<String>,
    pub display: String,
    pub error: Option<String>,
}

impl Cell {
    /// An empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain value cell whose display is the value's textual form
    pub fn with_value<V: Into<CellValue>>(value: V) -> Self {
        let value = value.into();
        Self {
            display: value.to_string(),
            value,
            formula: None,
            error: None,
        }
    }

    /// Check if the cell holds a formula
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Check if the cell carries an evaluation error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Reset to the empty state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
