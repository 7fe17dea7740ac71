//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Cell`] and [`CellValue`] - The contents of a grid cell
//! - [`CellAddress`] - A cell's A1-style location (e.g., "A1")
//! - [`CellId`] - The `row-col` key used to address cells in the engine

mod address;
mod value;

pub use address::{column_to_letters, letters_to_column, CellAddress, CellId};
pub use value::{Cell, CellValue};
