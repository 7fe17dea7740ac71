//! Formula error types

use gridcalc_core::CellId;
use thiserror::Error;

/// Display marker for circular references
pub const CIRCULAR_MARKER: &str = "#CIRCULAR!";

/// Display marker for every other evaluation failure
pub const ERROR_MARKER: &str = "#ERROR!";

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula text does not start with '='
    #[error("Formula must start with =")]
    MalformedFormula,

    /// Reference token that does not decode to a coordinate
    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),

    /// The cell is already being evaluated further up the chain
    #[error("Circular reference detected at {}", .0.to_a1_string())]
    CircularReference(CellId),

    /// Divisor is exactly zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Operator token with no arithmetic meaning
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Function name with no aggregate behind it
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Operand stack underflow, or not exactly one value left at the end
    #[error("Invalid expression")]
    InvalidExpression,

    /// Number token that is not a valid decimal (e.g. `1.2.3`)
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Reference chain nested past the evaluation depth limit
    #[error("Reference chain deeper than {0} cells")]
    DepthLimitExceeded(usize),

    /// Character the strict lexer does not recognise
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
}

impl FormulaError {
    /// The marker shown in place of a value when this error ends an evaluation
    pub fn marker(&self) -> &'static str {
        if self.is_circular() {
            CIRCULAR_MARKER
        } else {
            ERROR_MARKER
        }
    }

    /// Check if this is a circular reference
    pub fn is_circular(&self) -> bool {
        matches!(self, FormulaError::CircularReference(_))
    }

    /// Check if this error ends the whole evaluation chain
    ///
    /// Such errors pass through precedents even when other precedent failures
    /// would be read as zero.
    pub fn aborts_chain(&self) -> bool {
        matches!(
            self,
            FormulaError::CircularReference(_) | FormulaError::DepthLimitExceeded(_)
        )
    }
}
