//! # gridcalc-formula
//!
//! Formula tokenizer, parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Tokenizing (expression text → typed tokens)
//! - Parsing (formula text → tokens + direct cell references)
//! - Evaluation (tokens → postfix → number), resolving formula precedents recursively
//! - Aggregate functions (SUM, AVG/AVERAGE, MIN, MAX, COUNT)
//! - A dependency graph for incremental recalculation
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::Grid;
//! use gridcalc_formula::{EvaluationResult, Evaluator};
//!
//! let mut grid = Grid::new(10, 10).unwrap();
//! grid.set_value(0, 0, 2.0).unwrap();
//! grid.set_value(0, 1, 3.0).unwrap();
//!
//! let result = Evaluator::new(&grid).evaluate("=A1+B1*2", None);
//! assert_eq!(result, EvaluationResult::Value(8.0));
//! ```

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod token;

pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult, CIRCULAR_MARKER, ERROR_MARKER};
pub use evaluator::{
    to_postfix, ActiveCells, EvaluationResult, Evaluator, EvaluatorOptions, MAX_EVAL_DEPTH,
};
pub use parser::{parse, parse_cell_reference, parse_with, ParsedFormula};
pub use token::{tokenize, tokenize_strict, LexMode, Token, TokenKind};
