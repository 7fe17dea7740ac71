//! Formula parser
//!
//! Validates the leading `=`, tokenizes the expression and extracts the set of
//! cells the formula reads directly.

use crate::error::{FormulaError, FormulaResult};
use crate::token::{tokenize_with, LexMode, Token, TokenKind};
use gridcalc_core::{letters_to_column, CellId};
use lazy_regex::regex_captures;
use std::collections::BTreeSet;

/// A formula broken into its expression, tokens and direct references
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    /// Expression text without the leading `=`, trimmed
    pub expression: String,
    /// Tokens in source order
    pub tokens: Vec<Token>,
    /// Reference strings (e.g. `"A1"`) as written, duplicates collapsed
    pub dependencies: BTreeSet<String>,
}

impl ParsedFormula {
    /// Resolve the dependency strings to coordinates
    ///
    /// References that do not decode are returned in the second list so callers
    /// can report them without losing the ones that did.
    pub fn resolved_dependencies(&self) -> (Vec<CellId>, Vec<String>) {
        let mut resolved = Vec::with_capacity(self.dependencies.len());
        let mut invalid = Vec::new();
        for dep in &self.dependencies {
            match parse_cell_reference(dep) {
                Some(id) => resolved.push(id),
                None => invalid.push(dep.clone()),
            }
        }
        (resolved, invalid)
    }
}

/// Parse a formula with the permissive lexer
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse;
///
/// let parsed = parse("=A1 + SUM(B2, 3)").unwrap();
/// assert_eq!(parsed.expression, "A1 + SUM(B2, 3)");
/// assert!(parsed.dependencies.contains("B2"));
/// ```
pub fn parse(formula: &str) -> FormulaResult<ParsedFormula> {
    parse_with(formula, LexMode::Permissive)
}

/// Parse a formula with the given lexer mode
pub fn parse_with(formula: &str, mode: LexMode) -> FormulaResult<ParsedFormula> {
    let expression = formula
        .strip_prefix('=')
        .ok_or(FormulaError::MalformedFormula)?
        .trim();

    let tokens = tokenize_with(expression, mode)?;
    let dependencies = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::CellRef)
        .map(|t| t.text.clone())
        .collect();

    Ok(ParsedFormula {
        expression: expression.to_string(),
        tokens,
        dependencies,
    })
}

/// Decode an A1-style reference into a zero-based coordinate
///
/// Returns `None` when the text is not `[A-Z]+[0-9]+` or the row is not positive.
pub fn parse_cell_reference(reference: &str) -> Option<CellId> {
    let (_, letters, digits) = regex_captures!(r"^([A-Z]+)([0-9]+)$", reference)?;

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    let col = letters_to_column(letters).ok()?;

    Some(CellId::new(row - 1, col))
}
