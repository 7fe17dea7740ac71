//! Cell address and identifier types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Convert a zero-based column index to its letter label (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    // Bijective base 26: digits run 1..=26, so shift down before each division
    let mut digits = Vec::new();
    let mut rest = u64::from(col) + 1;
    while rest > 0 {
        rest -= 1;
        digits.push(b'A' + (rest % 26) as u8);
        rest /= 26;
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}

/// Convert a column letter label to its zero-based index (A = 0, Z = 25, AA = 26, etc.)
///
/// Letters are matched case-insensitively.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let label = letters.chars().try_fold(0u64, |acc, c| {
        let digit = match c.to_ascii_uppercase() {
            upper @ 'A'..='Z' => u64::from(upper as u8 - b'A') + 1,
            _ => {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )))
            }
        };
        match acc * 26 + digit {
            n if n > u64::from(u32::MAX) + 1 => Err(Error::InvalidAddress(format!(
                "column '{}' is too large",
                letters
            ))),
            n => Ok(n),
        }
    })?;

    Ok((label - 1) as u32)
}

/// A cell address in A1 notation (e.g., "A1", "AZ100")
///
/// Rows are 1-based in the textual form and 0-based in the struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("AB12").unwrap();
    /// assert_eq!(addr.row, 11);
    /// assert_eq!(addr.col, 27);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        if digits.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based externally, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self {
            row: row - 1,
            col: letters_to_column(letters)?,
        })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row as u64 + 1)
    }

    /// The engine key for this address
    pub fn id(&self) -> CellId {
        CellId::new(self.row, self.col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<CellId> for CellAddress {
    fn from(id: CellId) -> Self {
        Self::new(id.row, id.col)
    }
}

/// Key identifying a cell in the formula registry and dependency graph
///
/// The string form is `"{row}-{col}"` with zero-based indices, and parsing it
/// back always yields the original coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId {
    pub row: u32,
    pub col: u32,
}

impl CellId {
    /// Create a new cell id
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse the `row-col` string form
    pub fn parse(s: &str) -> Result<Self> {
        let (row, col) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidCellId(s.to_string()))?;

        let parse_part = |part: &str| -> Result<u32> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidCellId(s.to_string()));
            }
            part.parse()
                .map_err(|_| Error::InvalidCellId(s.to_string()))
        };

        Ok(Self::new(parse_part(row)?, parse_part(col)?))
    }

    /// A1-style label of this cell (e.g. `0-0` is `A1`)
    pub fn to_a1_string(&self) -> String {
        CellAddress::from(*self).to_a1_string()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for CellId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<CellAddress> for CellId {
    fn from(addr: CellAddress) -> Self {
        addr.id()
    }
}
