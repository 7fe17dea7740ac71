//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the types shared by the formula and engine crates:
//! - [`Cell`] and [`CellValue`] - What a grid cell holds (raw value, formula, display, error)
//! - [`CellId`] - The coordinate key used by the formula registry and dependency graph
//! - [`CellAddress`] - A1-style addressing on top of the bijective base-26 column codec
//! - [`Grid`] and [`CellAccess`] - Cell storage and the accessor the evaluator reads through
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAccess, CellAddress, CellValue, Grid};
//!
//! let mut grid = Grid::new(20, 20).unwrap();
//! let addr = CellAddress::parse("B3").unwrap();
//!
//! grid.set_value(addr.row, addr.col, 42.0).unwrap();
//! assert_eq!(grid.value(2, 1), CellValue::Number(42.0));
//! assert_eq!(grid.cell(2, 1).unwrap().display, "42");
//! ```

pub mod cell;
pub mod error;
pub mod grid;

pub use cell::{column_to_letters, letters_to_column, Cell, CellAddress, CellId, CellValue};
pub use error::{Error, Result};
pub use grid::{CellAccess, Grid};

/// Maximum number of rows a [`Grid`] may be sized to
pub const MAX_ROWS: u32 = 10_000;

/// Maximum number of columns a [`Grid`] may be sized to
pub const MAX_COLS: u32 = 1_000;
