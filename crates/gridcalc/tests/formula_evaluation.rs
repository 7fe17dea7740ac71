//! Integration tests for formula evaluation

use gridcalc::prelude::*;
use gridcalc::{parse, FormulaError, Token, CIRCULAR_MARKER, ERROR_MARKER};
use pretty_assertions::assert_eq;

fn id(a1: &str) -> CellId {
    CellAddress::parse(a1).unwrap().id()
}

fn cell<'g>(grid: &'g Grid, a1: &str) -> &'g Cell {
    let id = id(a1);
    grid.cell(id.row, id.col).unwrap()
}

/// Test that basic formulas parse and evaluate
#[test]
fn test_parse_and_evaluate_basic() {
    let parsed = parse("=1+2").unwrap();
    assert_eq!(
        parsed.tokens,
        vec![Token::number("1"), Token::operator('+'), Token::number("2")]
    );
    assert!(parsed.dependencies.is_empty());

    let grid = Grid::new(5, 5).unwrap();
    let engine = FormulaEngine::new();
    assert_eq!(
        engine.evaluate(&grid, "=1+2", None),
        EvaluationResult::Value(3.0)
    );
}

/// Test that formulas without a leading '=' are rejected
#[test]
fn test_malformed_formula() {
    assert_eq!(parse("1+2").unwrap_err(), FormulaError::MalformedFormula);

    let grid = Grid::new(1, 1).unwrap();
    let result = FormulaEngine::new().evaluate(&grid, "1+2", None);
    assert_eq!(result.marker(), Some(ERROR_MARKER));
    assert_eq!(result.message(), Some("Formula must start with ="));
}

/// Test operator precedence and associativity
#[test]
fn test_precedence() {
    let grid = Grid::new(1, 1).unwrap();
    let engine = FormulaEngine::new();

    let cases = [
        ("=2+3*4", 14.0),
        ("=(2+3)*4", 20.0),
        ("=10-4-3", 3.0),
        ("=100/10/5", 2.0),
        ("=2*3^2", 18.0),
        ("=1.5*4", 6.0),
    ];
    for (formula, expected) in cases {
        assert_eq!(
            engine.evaluate(&grid, formula, None),
            EvaluationResult::Value(expected),
            "{}",
            formula
        );
    }
}

/// Test evaluation of formulas with cell references
#[test]
fn test_evaluate_with_cell_references() {
    let mut grid = Grid::new(10, 10).unwrap();
    let mut engine = FormulaEngine::new();

    engine.set_value(&mut grid, id("A1"), 10.0);
    engine.set_value(&mut grid, id("A2"), 20.0);
    engine.set_value(&mut grid, id("B1"), "5");

    assert_eq!(
        engine.evaluate(&grid, "=A1+A2", None),
        EvaluationResult::Value(30.0)
    );
    assert_eq!(
        engine.evaluate(&grid, "=A1*B1", None),
        EvaluationResult::Value(50.0)
    );

    // Empty cells and non-numeric text read as 0
    engine.set_value(&mut grid, id("B2"), "abc");
    assert_eq!(
        engine.evaluate(&grid, "=A1+C9+B2", None),
        EvaluationResult::Value(10.0)
    );
}

/// Test that references are resolved through other formulas
#[test]
fn test_references_evaluate_precedent_formulas() {
    let mut grid = Grid::new(10, 10).unwrap();
    let mut engine = FormulaEngine::new();

    engine.set_value(&mut grid, id("A1"), 3.0);
    engine.update_formula(&mut grid, id("A2"), Some("=A1*2"));
    engine.update_formula(&mut grid, id("A3"), Some("=A2+A1"));

    assert_eq!(cell(&grid, "A3").display, "9");
    assert_eq!(cell(&grid, "A3").value, CellValue::Number(9.0));
}

/// Test the aggregate functions
#[test]
fn test_functions() {
    let grid = Grid::new(1, 1).unwrap();
    let engine = FormulaEngine::new();

    let cases = [
        ("=SUM(1,2,3)", 6.0),
        ("=AVG(2,4)", 3.0),
        ("=AVERAGE(1,2,3,4)", 2.5),
        ("=MIN(5,2,8)", 2.0),
        ("=MAX(5,2,8)", 8.0),
        ("=COUNT(7,7,7)", 3.0),
    ];
    for (formula, expected) in cases {
        assert_eq!(
            engine.evaluate(&grid, formula, None),
            EvaluationResult::Value(expected),
            "{}",
            formula
        );
    }
}

/// Test that a function consumes the whole operand stack
#[test]
fn test_functions_apply_to_whole_stack() {
    let grid = Grid::new(1, 1).unwrap();
    let engine = FormulaEngine::new();

    // SUM swallows the 10, leaving `+` with one operand
    let result = engine.evaluate(&grid, "=10+SUM(1,2)", None);
    assert_eq!(result.message(), Some("Invalid expression"));

    // `*` sits above SUM on the operator stack and runs first
    assert_eq!(
        engine.evaluate(&grid, "=SUM(1,2)*2", None),
        EvaluationResult::Value(5.0)
    );
}

/// Test unknown function names
#[test]
fn test_unknown_function() {
    let grid = Grid::new(1, 1).unwrap();
    let result = FormulaEngine::new().evaluate(&grid, "=FOO(1)", None);
    assert_eq!(result.message(), Some("Unknown function: FOO"));
}

/// Test error results and how they are written to cells
#[test]
fn test_error_results() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut engine = FormulaEngine::new();

    engine.update_formula(&mut grid, id("A1"), Some("=5/0"));
    let a1 = cell(&grid, "A1");
    assert_eq!(a1.display, ERROR_MARKER);
    assert_eq!(a1.value, CellValue::text(ERROR_MARKER));
    assert_eq!(a1.error.as_deref(), Some("Division by zero"));
    assert!(a1.is_error());

    // Fixing the formula clears the error
    engine.update_formula(&mut grid, id("A1"), Some("=5/2"));
    let a1 = cell(&grid, "A1");
    assert_eq!(a1.display, "2.5");
    assert_eq!(a1.error, None);
}

/// Test self references
#[test]
fn test_self_reference_is_circular() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut engine = FormulaEngine::new();

    engine.update_formula(&mut grid, id("A1"), Some("=A1+1"));
    let a1 = cell(&grid, "A1");
    assert_eq!(a1.display, CIRCULAR_MARKER);
    assert_eq!(
        a1.error.as_deref(),
        Some("Circular reference detected at A1")
    );
}

/// Test cycles through several cells
#[test]
fn test_indirect_cycle_is_circular() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut engine = FormulaEngine::new();

    engine.update_formula(&mut grid, id("A1"), Some("=B1+1"));
    assert_eq!(cell(&grid, "A1").display, "1");

    engine.update_formula(&mut grid, id("B1"), Some("=C1+1"));
    engine.update_formula(&mut grid, id("C1"), Some("=A1+1"));

    for a1 in ["A1", "B1", "C1"] {
        assert_eq!(cell(&grid, a1).display, CIRCULAR_MARKER, "{}", a1);
    }

    // A cell reading into the cycle sees the circular error too
    engine.update_formula(&mut grid, id("D1"), Some("=A1*2"));
    assert_eq!(cell(&grid, "D1").display, CIRCULAR_MARKER);

    // Breaking the cycle recovers every cell
    engine.set_value(&mut grid, id("C1"), 1.0);
    assert_eq!(cell(&grid, "C1").display, "1");
    assert_eq!(cell(&grid, "B1").display, "2");
    assert_eq!(cell(&grid, "A1").display, "3");
    assert_eq!(cell(&grid, "D1").display, "6");
}

/// Test how failing precedents are read
#[test]
fn test_precedent_errors() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut lenient = FormulaEngine::new();

    lenient.update_formula(&mut grid, id("A1"), Some("=1/0"));
    lenient.update_formula(&mut grid, id("B1"), Some("=A1+1"));
    assert_eq!(cell(&grid, "B1").display, "1");

    let mut grid = Grid::new(5, 5).unwrap();
    let mut strict = FormulaEngine::with_options(EngineOptions {
        strict_precedents: true,
        ..Default::default()
    });

    strict.update_formula(&mut grid, id("A1"), Some("=1/0"));
    strict.update_formula(&mut grid, id("B1"), Some("=A1+1"));
    assert_eq!(cell(&grid, "B1").display, ERROR_MARKER);
    assert_eq!(cell(&grid, "B1").error.as_deref(), Some("Division by zero"));
}

/// Test permissive and strict lexing
#[test]
fn test_lex_modes() {
    let grid = Grid::new(1, 1).unwrap();

    let permissive = FormulaEngine::new();
    assert_eq!(
        permissive.evaluate(&grid, "=1+2@", None),
        EvaluationResult::Value(3.0)
    );

    let strict = FormulaEngine::with_options(EngineOptions {
        lex_mode: LexMode::Strict,
        ..Default::default()
    });
    let result = strict.evaluate(&grid, "=1+2@", None);
    assert_eq!(result.marker(), Some(ERROR_MARKER));
    assert!(result
        .message()
        .unwrap()
        .starts_with("Unexpected character '@'"));
}

/// Test display formatting of results
#[test]
fn test_display_formatting() {
    let mut grid = Grid::new(5, 5).unwrap();
    let engine = FormulaEngine::new();

    let cases = [
        ("=10/4", "2.5"),
        ("=2/3", "0.67"),
        ("=6/3", "2"),
        ("=0-7/2", "-3.5"),
    ];
    for (formula, expected) in cases {
        engine.evaluate_formula(&mut grid, formula, 0, 0);
        assert_eq!(cell(&grid, "A1").display, expected, "{}", formula);
    }
}

/// Test that spelled-out non-finite text reads as zero
#[test]
fn test_non_finite_text_reads_as_zero() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut engine = FormulaEngine::new();

    engine.set_value(&mut grid, id("A1"), "inf");
    engine.set_value(&mut grid, id("B1"), "NaN");
    engine.set_value(&mut grid, id("C1"), "-infinity");

    for formula in ["=A1+1", "=B1+1", "=C1+1"] {
        assert_eq!(
            engine.evaluate(&grid, formula, None),
            EvaluationResult::Value(1.0),
            "{}",
            formula
        );
    }
}

/// Test that exact halves round away from zero in the display
#[test]
fn test_display_rounds_ties_up() {
    let mut grid = Grid::new(5, 5).unwrap();
    let mut engine = FormulaEngine::new();

    engine.update_formula(&mut grid, id("A1"), Some("=1/8"));
    engine.update_formula(&mut grid, id("A2"), Some("=3/8"));
    assert_eq!(cell(&grid, "A1").display, "0.13");
    assert_eq!(cell(&grid, "A2").display, "0.38");
    assert_eq!(cell(&grid, "A1").value, CellValue::Number(0.125));
}
