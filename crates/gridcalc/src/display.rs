//! Rendering evaluation results into cells

use gridcalc_core::{CellAccess, CellId, CellValue};
use gridcalc_formula::EvaluationResult;

/// Render a number with at most two decimals, dropping trailing zeros
///
/// Ties round away from zero, so `0.125` shows as `0.13`.
///
/// ```rust
/// use gridcalc::display::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(1.0 / 3.0), "0.33");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:.2}` alone rounds exact ties to even
    let rounded = (n * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", if rounded.is_finite() { rounded } else { n });
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Text shown for an evaluation result
pub fn display_value(result: &EvaluationResult) -> String {
    match result {
        EvaluationResult::Value(n) => format_number(*n),
        EvaluationResult::Error { marker, .. } => marker.to_string(),
    }
}

/// Store an evaluation result in the cell at `id`
///
/// Returns false if the grid has no such cell.
pub fn write_result<G: CellAccess + ?Sized>(
    grid: &mut G,
    id: CellId,
    result: &EvaluationResult,
) -> bool {
    let Some(cell) = grid.cell_mut(id.row, id.col) else {
        return false;
    };

    cell.display = display_value(result);
    match result {
        EvaluationResult::Value(n) => {
            cell.value = CellValue::Number(*n);
            cell.error = None;
        }
        EvaluationResult::Error { marker, message } => {
            cell.value = CellValue::text(*marker);
            cell.error = Some(message.clone());
        }
    }
    true
}
