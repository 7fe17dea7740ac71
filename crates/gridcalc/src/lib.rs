//! # gridcalc
//!
//! A reactive formula engine for tabular data grids.
//!
//! Formulas typed into cells are parsed, evaluated, and re-evaluated whenever
//! a cell they read changes. Circular references are reported with the
//! `#CIRCULAR!` marker and every other failure with `#ERROR!`.
//!
//! ## Features
//!
//! - Arithmetic with `+ - * / ^` and parentheses
//! - A1-style cell references, evaluated recursively through formula cells
//! - `SUM`, `AVG`/`AVERAGE`, `MIN`, `MAX` and `COUNT` over the operand stack
//! - Dependency tracking with breadth-first or topological propagation
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(20, 20).unwrap();
//! let mut engine = FormulaEngine::new();
//!
//! engine.set_value(&mut grid, CellId::new(0, 0), 4.0);
//! engine.update_formula(&mut grid, CellId::new(1, 0), Some("=A1^2/3"));
//!
//! let cell = grid.cell(1, 0).unwrap();
//! assert_eq!(cell.display, "5.33");
//! ```

pub mod display;
pub mod engine;
pub mod prelude;

pub use display::{display_value, format_number, write_result};
pub use engine::{EngineOptions, FormulaEngine, RecalcOrder, RecalcStats};

// Re-export core types
pub use gridcalc_core::{
    column_to_letters, letters_to_column, Cell, CellAccess, CellAddress, CellId, CellValue,
    Error, Grid, Result, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{
    parse, parse_cell_reference, tokenize, DependencyGraph, EvaluationResult, Evaluator,
    EvaluatorOptions, FormulaError, FormulaResult, LexMode, ParsedFormula, Token, TokenKind,
    CIRCULAR_MARKER, ERROR_MARKER,
};
