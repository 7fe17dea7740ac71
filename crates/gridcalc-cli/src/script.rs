//! Sheet scripts
//!
//! One assignment per line:
//!
//! ```text
//! # comment
//! A1 = 10
//! B1 = =A1*2
//! A1 =
//! ```
//!
//! A right-hand side starting with `=` is a formula, an empty one clears the
//! cell, and anything else is stored as a number or as text.

use anyhow::{bail, Context, Result};
use gridcalc::{CellAddress, CellValue};

/// What a script line does to its cell
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Value(CellValue),
    Formula(String),
    Clear,
}

/// A parsed script line
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based line number in the script
    pub line: usize,
    pub address: CellAddress,
    pub action: Action,
}

/// Parse a whole script, skipping blank lines and comments
pub fn parse_script(source: &str) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        if let Some(statement) =
            parse_line(raw, line).with_context(|| format!("line {}: {}", line, raw.trim()))?
        {
            statements.push(statement);
        }
    }
    Ok(statements)
}

fn parse_line(raw: &str, line: usize) -> Result<Option<Statement>> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let Some((lhs, rhs)) = text.split_once('=') else {
        bail!("expected `<cell> = <value>`");
    };

    let address = CellAddress::parse(lhs.trim())?;
    let rhs = rhs.trim();
    let action = if rhs.is_empty() {
        Action::Clear
    } else if rhs.starts_with('=') {
        Action::Formula(rhs.to_string())
    } else {
        match rhs.parse::<f64>() {
            Ok(n) => Action::Value(CellValue::Number(n)),
            Err(_) => Action::Value(CellValue::text(rhs)),
        }
    };

    Ok(Some(Statement {
        line,
        address,
        action,
    }))
}
