//! Formula evaluator
//!
//! Converts a formula's tokens to postfix order and evaluates them on a single
//! numeric stack. References to formula cells are evaluated recursively; the
//! chain of cells currently being evaluated is carried through the recursion
//! so that a cell reached again inside its own chain is reported as a
//! circular reference.

use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::parser::{parse_cell_reference, parse_with};
use crate::token::{LexMode, Token, TokenKind};
use ahash::AHashSet;
use gridcalc_core::{CellAccess, CellId};
use std::fmt;
use tracing::trace;

/// Outcome of a top-level evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// Numeric result
    Value(f64),
    /// Failure, with the display marker and a human-readable message
    Error {
        marker: &'static str,
        message: String,
    },
}

impl EvaluationResult {
    /// The numeric value, if evaluation succeeded
    pub fn value(&self) -> Option<f64> {
        match self {
            EvaluationResult::Value(n) => Some(*n),
            EvaluationResult::Error { .. } => None,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationResult::Error { .. })
    }

    /// The error message, if evaluation failed
    pub fn message(&self) -> Option<&str> {
        match self {
            EvaluationResult::Error { message, .. } => Some(message.as_str()),
            EvaluationResult::Value(_) => None,
        }
    }

    /// The display marker, if evaluation failed
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            EvaluationResult::Error { marker, .. } => Some(*marker),
            EvaluationResult::Value(_) => None,
        }
    }
}

impl From<FormulaError> for EvaluationResult {
    fn from(err: FormulaError) -> Self {
        EvaluationResult::Error {
            marker: err.marker(),
            message: err.to_string(),
        }
    }
}

impl From<FormulaResult<f64>> for EvaluationResult {
    fn from(result: FormulaResult<f64>) -> Self {
        match result {
            Ok(n) => EvaluationResult::Value(n),
            Err(e) => e.into(),
        }
    }
}

/// Options for formula evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// How the tokenizer treats unrecognised characters
    pub lex_mode: LexMode,
    /// Propagate errors from precedent formula cells instead of reading them as zero
    ///
    /// Circular references always propagate.
    pub strict_precedents: bool,
}

/// Maximum number of formula cells nested in one evaluation chain
///
/// Each nested reference costs several stack frames, so chains are cut off
/// well before the default thread stack runs out.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Cells currently being evaluated in one top-level evaluation chain
#[derive(Debug, Default)]
pub struct ActiveCells {
    cells: AHashSet<CellId>,
}

impl ActiveCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` active
    ///
    /// Fails with `CircularReference` if it already is, or with
    /// `DepthLimitExceeded` once the chain holds [`MAX_EVAL_DEPTH`] cells.
    pub fn enter(&mut self, id: CellId) -> FormulaResult<()> {
        if self.cells.contains(&id) {
            return Err(FormulaError::CircularReference(id));
        }
        if self.cells.len() >= MAX_EVAL_DEPTH {
            return Err(FormulaError::DepthLimitExceeded(MAX_EVAL_DEPTH));
        }
        self.cells.insert(id);
        Ok(())
    }

    pub fn leave(&mut self, id: CellId) {
        self.cells.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Formula evaluator over a cell accessor
pub struct Evaluator<'a, C: CellAccess + ?Sized> {
    cells: &'a C,
    options: EvaluatorOptions,
}

impl<'a, C: CellAccess + ?Sized> Evaluator<'a, C> {
    /// Create an evaluator with default options
    pub fn new(cells: &'a C) -> Self {
        Self::with_options(cells, EvaluatorOptions::default())
    }

    /// Create an evaluator with the given options
    pub fn with_options(cells: &'a C, options: EvaluatorOptions) -> Self {
        Self { cells, options }
    }

    /// Evaluate a formula, converting any failure into an error result
    ///
    /// `origin` is the cell the formula belongs to, if any. It seeds the
    /// circular reference check.
    pub fn evaluate(&self, formula: &str, origin: Option<CellId>) -> EvaluationResult {
        self.try_evaluate(formula, origin).into()
    }

    /// Evaluate a formula, returning the error instead of an error result
    pub fn try_evaluate(&self, formula: &str, origin: Option<CellId>) -> FormulaResult<f64> {
        let mut active = ActiveCells::new();
        self.evaluate_in(formula, origin, &mut active)
    }

    /// Evaluate within an existing chain of active cells
    pub fn evaluate_in(
        &self,
        formula: &str,
        origin: Option<CellId>,
        active: &mut ActiveCells,
    ) -> FormulaResult<f64> {
        if let Some(id) = origin {
            active.enter(id)?;
        }

        let result = self.evaluate_body(formula, active);

        if let Some(id) = origin {
            active.leave(id);
        }
        result
    }

    fn evaluate_body(&self, formula: &str, active: &mut ActiveCells) -> FormulaResult<f64> {
        let parsed = parse_with(formula, self.options.lex_mode)?;
        let postfix = to_postfix(&parsed.tokens);
        self.evaluate_postfix(&postfix, active)
    }

    fn evaluate_postfix(&self, postfix: &[&Token], active: &mut ActiveCells) -> FormulaResult<f64> {
        let mut stack: Vec<f64> = Vec::new();

        for token in postfix {
            match token.kind {
                TokenKind::Number => stack.push(parse_number(&token.text)?),
                TokenKind::CellRef => {
                    let value = self.resolve_reference(&token.text, active)?;
                    stack.push(value);
                }
                TokenKind::Operator => {
                    let (b, a) = match (stack.pop(), stack.pop()) {
                        (Some(b), Some(a)) => (b, a),
                        _ => return Err(FormulaError::InvalidExpression),
                    };
                    stack.push(apply_operator(&token.text, a, b)?);
                }
                TokenKind::Function => {
                    let result = functions::apply(&token.text, &stack)?;
                    stack.clear();
                    stack.push(result);
                }
                // Unmatched parentheses survive conversion and carry no value
                TokenKind::LeftParen | TokenKind::RightParen => {}
            }
        }

        match stack.as_slice() {
            [value] => Ok(*value),
            _ => Err(FormulaError::InvalidExpression),
        }
    }

    fn resolve_reference(&self, reference: &str, active: &mut ActiveCells) -> FormulaResult<f64> {
        let id = parse_cell_reference(reference)
            .ok_or_else(|| FormulaError::InvalidCellReference(reference.to_string()))?;

        let cell = match self.cells.cell(id.row, id.col) {
            Some(cell) => cell,
            None => return Ok(0.0),
        };

        let formula = match &cell.formula {
            Some(formula) => formula,
            None => return Ok(cell.value.to_number()),
        };

        match self.evaluate_in(formula, Some(id), active) {
            Ok(value) => Ok(value),
            Err(e) if e.aborts_chain() || self.options.strict_precedents => Err(e),
            Err(e) => {
                trace!(cell = %reference, error = %e, "precedent failed, reading as zero");
                Ok(0.0)
            }
        }
    }
}

/// Operator precedence; `^` binds tightest
fn precedence(op: &str) -> u8 {
    match op {
        "+" | "-" => 1,
        "*" | "/" => 2,
        "^" => 3,
        _ => 0,
    }
}

/// Reorder tokens into postfix (reverse Polish) order
///
/// Equal-precedence operators associate left to right. Function tokens wait on
/// the operator stack until the end of input, and operators never pop past
/// them.
pub fn to_postfix(tokens: &[Token]) -> Vec<&Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<&Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Number | TokenKind::CellRef => output.push(token),
            TokenKind::Operator => {
                let prec = precedence(&token.text);
                while let Some(top) = stack.last() {
                    if !top.is_operator() || precedence(&top.text) < prec {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(token);
            }
            TokenKind::LeftParen | TokenKind::Function => stack.push(token),
            TokenKind::RightParen => {
                while let Some(top) = stack.pop() {
                    if top.kind == TokenKind::LeftParen {
                        break;
                    }
                    output.push(top);
                }
            }
        }
    }

    while let Some(top) = stack.pop() {
        output.push(top);
    }

    output
}

/// Parse a number token
///
/// The whole token must be a decimal literal: `1.2.3` or a lone `.` is
/// `InvalidNumber` rather than being read up to the first bad character.
fn parse_number(text: &str) -> FormulaResult<f64> {
    text.parse()
        .map_err(|_| FormulaError::InvalidNumber(text.to_string()))
}

fn apply_operator(op: &str, a: f64, b: f64) -> FormulaResult<f64> {
    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" => {
            if b == 0.0 {
                Err(FormulaError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        "^" => Ok(a.powf(b)),
        _ => Err(FormulaError::UnknownOperator(op.to_string())),
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationResult::Value(n) => write!(f, "{}", n),
            EvaluationResult::Error { marker, message } => write!(f, "{} ({})", marker, message),
        }
    }
}
