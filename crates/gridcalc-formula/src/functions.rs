//! Built-in aggregate functions
//!
//! Aggregates receive every value on the operand stack at the point the
//! function token is reached, not just a parenthesised argument list.

use crate::error::{FormulaError, FormulaResult};

/// Function implementation signature
pub type FunctionImpl = fn(&[f64]) -> f64;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Implementation
    pub implementation: FunctionImpl,
}

static FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "SUM",
        implementation: fn_sum,
    },
    FunctionDef {
        name: "AVG",
        implementation: fn_average,
    },
    FunctionDef {
        name: "AVERAGE",
        implementation: fn_average,
    },
    FunctionDef {
        name: "MIN",
        implementation: fn_min,
    },
    FunctionDef {
        name: "MAX",
        implementation: fn_max,
    },
    FunctionDef {
        name: "COUNT",
        implementation: fn_count,
    },
];

/// Look up a function by name (case-insensitive)
pub fn lookup(name: &str) -> Option<&'static FunctionDef> {
    FUNCTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Apply the named function to `values`
pub fn apply(name: &str, values: &[f64]) -> FormulaResult<f64> {
    let func = lookup(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
    Ok((func.implementation)(values))
}

/// SUM(values...) - Sum of all values, 0 when empty
pub fn fn_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// AVERAGE(values...) - Arithmetic mean, 0 when empty
pub fn fn_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    fn_sum(values) / values.len() as f64
}

/// MIN(values...) - Smallest value, 0 when empty
pub fn fn_min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// MAX(values...) - Largest value, 0 when empty
pub fn fn_max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// COUNT(values...) - Number of values
pub fn fn_count(values: &[f64]) -> f64 {
    values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(lookup("SUM").is_some());
        assert!(lookup("sum").is_some());
        assert!(lookup("Average").is_some());
        assert!(lookup("VLOOKUP").is_none());
        assert_eq!(FUNCTIONS.len(), 6);
    }

    #[test]
    fn test_aggregates() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(apply("SUM", &values).unwrap(), 12.0);
        assert_eq!(apply("AVG", &values).unwrap(), 4.0);
        assert_eq!(apply("AVERAGE", &values).unwrap(), 4.0);
        assert_eq!(apply("MIN", &values).unwrap(), 1.0);
        assert_eq!(apply("MAX", &values).unwrap(), 7.0);
        assert_eq!(apply("COUNT", &values).unwrap(), 3.0);
    }

    #[test]
    fn test_aggregates_on_empty_input() {
        for func in FUNCTIONS {
            assert_eq!(apply(func.name, &[]).unwrap(), 0.0, "{}", func.name);
        }
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            apply("FOO", &[1.0]),
            Err(FormulaError::UnknownFunction("FOO".into()))
        );
    }
}
