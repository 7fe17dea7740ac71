//! Formula engine
//!
//! Owns the formula registry and dependency graph for one grid, and keeps
//! formula cells up to date as formulas and values change.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new(10, 10).unwrap();
//! let mut engine = FormulaEngine::new();
//!
//! let a1 = CellId::new(0, 0);
//! let b1 = CellId::new(0, 1);
//! let c1 = CellId::new(0, 2);
//!
//! engine.set_value(&mut grid, a1, 2.0);
//! engine.set_value(&mut grid, b1, 3.0);
//! engine.update_formula(&mut grid, c1, Some("=A1+B1"));
//! assert_eq!(grid.cell(0, 2).unwrap().display, "5");
//!
//! // Dependents follow their precedents
//! engine.set_value(&mut grid, a1, 10.0);
//! assert_eq!(grid.cell(0, 2).unwrap().display, "13");
//! ```

use crate::display::write_result;
use ahash::AHashMap;
use gridcalc_core::{Cell, CellAccess, CellId, CellValue};
use gridcalc_formula::{
    parse_with, DependencyGraph, EvaluationResult, Evaluator, EvaluatorOptions, LexMode,
    CIRCULAR_MARKER,
};
use tracing::{debug, trace, warn};

/// Order in which dependents are re-evaluated after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecalcOrder {
    /// Breadth-first walk, each reachable dependent evaluated once
    #[default]
    BreadthFirst,
    /// Precedents before dependents across the reachable subgraph
    Topological,
}

/// Options for the formula engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Propagation order for dependents
    pub recalc_order: RecalcOrder,
    /// How the tokenizer treats unrecognised characters
    pub lex_mode: LexMode,
    /// Surface precedent errors instead of reading failed precedents as zero
    pub strict_precedents: bool,
}

impl EngineOptions {
    fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            lex_mode: self.lex_mode,
            strict_precedents: self.strict_precedents,
        }
    }
}

/// Statistics from one engine operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcStats {
    /// Number of formula cells evaluated
    pub cells_evaluated: usize,
    /// Number of evaluations that produced an error marker
    pub errors: usize,
    /// Number of evaluations that hit a circular reference
    pub circular_references: usize,
}

impl RecalcStats {
    fn record(&mut self, result: &EvaluationResult) {
        self.cells_evaluated += 1;
        if let EvaluationResult::Error { marker, .. } = result {
            self.errors += 1;
            if *marker == CIRCULAR_MARKER {
                self.circular_references += 1;
            }
        }
    }

    /// Add another operation's counts to these
    pub fn merge(&mut self, other: RecalcStats) {
        self.cells_evaluated += other.cells_evaluated;
        self.errors += other.errors;
        self.circular_references += other.circular_references;
    }
}

/// Formula registry, dependency graph and recalculation for one grid
#[derive(Debug, Default, Clone)]
pub struct FormulaEngine {
    options: EngineOptions,
    /// Cell → formula text, for every cell currently holding a formula
    formulas: AHashMap<CellId, String>,
    /// Precedent → dependents
    graph: DependencyGraph,
}

impl FormulaEngine {
    /// Create an engine with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given options
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The formula registry
    pub fn formulas(&self) -> &AHashMap<CellId, String> {
        &self.formulas
    }

    /// The registered formula of a cell
    pub fn formula(&self, id: CellId) -> Option<&str> {
        self.formulas.get(&id).map(String::as_str)
    }

    /// The dependency graph
    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Set or clear the formula of a cell
    ///
    /// Text that does not start with `=` clears the formula, like `None`. When
    /// a formula is set, the cell is evaluated immediately; in both cases its
    /// dependents are re-evaluated afterwards.
    pub fn update_formula<G: CellAccess + ?Sized>(
        &mut self,
        grid: &mut G,
        id: CellId,
        formula: Option<&str>,
    ) -> RecalcStats {
        let Some(text) = formula.filter(|f| f.starts_with('=')) else {
            self.clear_formula(grid, id);
            return self.recalculate_dependents(grid, id);
        };

        let Some(cell) = grid.cell_mut(id.row, id.col) else {
            warn!(cell = %id.to_a1_string(), "ignoring formula for a cell outside the grid");
            return RecalcStats::default();
        };
        cell.formula = Some(text.to_string());

        self.graph.clear_dependencies(id);
        self.formulas.insert(id, text.to_string());
        self.record_dependencies(id, text);
        debug!(cell = %id.to_a1_string(), formula = text, "registered formula");

        let mut stats = RecalcStats::default();
        self.evaluate_cell(grid, id, text, &mut stats);
        stats.merge(self.recalculate_dependents(grid, id));
        stats
    }

    /// Write a plain value into a cell and re-evaluate its dependents
    ///
    /// Any formula the cell held is cleared first.
    pub fn set_value<G: CellAccess + ?Sized, V: Into<CellValue>>(
        &mut self,
        grid: &mut G,
        id: CellId,
        value: V,
    ) -> RecalcStats {
        self.clear_formula(grid, id);
        match grid.cell_mut(id.row, id.col) {
            Some(cell) => *cell = Cell::with_value(value),
            None => {
                warn!(cell = %id.to_a1_string(), "ignoring value for a cell outside the grid");
                return RecalcStats::default();
            }
        }
        self.recalculate_dependents(grid, id)
    }

    /// Re-evaluate every cell that depends on `id`, directly or transitively
    ///
    /// Cells without a registered formula are skipped.
    pub fn recalculate_dependents<G: CellAccess + ?Sized>(
        &self,
        grid: &mut G,
        id: CellId,
    ) -> RecalcStats {
        let order = match self.options.recalc_order {
            RecalcOrder::BreadthFirst => self.graph.breadth_first_dependents(id),
            RecalcOrder::Topological => self.graph.topological_dependents(id),
        };

        let mut stats = RecalcStats::default();
        for dependent in order {
            if let Some(formula) = self.formulas.get(&dependent) {
                self.evaluate_cell(grid, dependent, formula, &mut stats);
            }
        }

        if stats.cells_evaluated > 0 {
            debug!(
                cell = %id.to_a1_string(),
                evaluated = stats.cells_evaluated,
                errors = stats.errors,
                "recalculated dependents"
            );
        }
        stats
    }

    /// Re-evaluate every registered formula once, ignoring the dependency graph
    ///
    /// Use after bulk changes the incremental path does not see, such as a
    /// resize or paste. Registry entries whose cell no longer exists in the
    /// grid are dropped along with their edges.
    pub fn recalculate_all<G: CellAccess + ?Sized>(&mut self, grid: &mut G) -> RecalcStats {
        let mut ids: Vec<CellId> = self.formulas.keys().copied().collect();
        ids.sort_unstable();

        let mut stats = RecalcStats::default();
        for id in ids {
            if grid.cell(id.row, id.col).is_none() {
                debug!(cell = %id.to_a1_string(), "dropping formula for a cell outside the grid");
                self.formulas.remove(&id);
                self.graph.clear_dependencies(id);
                continue;
            }
            if let Some(formula) = self.formulas.get(&id) {
                self.evaluate_cell(grid, id, formula, &mut stats);
            }
        }

        debug!(
            evaluated = stats.cells_evaluated,
            errors = stats.errors,
            "recalculated all formulas"
        );
        stats
    }

    /// Evaluate `formula` as if it lived in (row, col) and store the result there
    ///
    /// The registry and dependency graph are left untouched.
    pub fn evaluate_formula<G: CellAccess + ?Sized>(
        &self,
        grid: &mut G,
        formula: &str,
        row: u32,
        col: u32,
    ) -> EvaluationResult {
        let id = CellId::new(row, col);
        let result = self.evaluate(&*grid, formula, Some(id));
        write_result(grid, id, &result);
        result
    }

    /// Evaluate `formula` without writing anything
    pub fn evaluate<G: CellAccess + ?Sized>(
        &self,
        grid: &G,
        formula: &str,
        origin: Option<CellId>,
    ) -> EvaluationResult {
        Evaluator::with_options(grid, self.options.evaluator_options()).evaluate(formula, origin)
    }

    /// Forget every formula and edge
    ///
    /// Cells keep their last values; only the engine's bookkeeping is reset.
    pub fn clear(&mut self) {
        self.formulas.clear();
        self.graph.clear();
    }

    fn clear_formula<G: CellAccess + ?Sized>(&mut self, grid: &mut G, id: CellId) {
        if self.formulas.remove(&id).is_some() {
            debug!(cell = %id.to_a1_string(), "cleared formula");
        }
        self.graph.clear_dependencies(id);
        if let Some(cell) = grid.cell_mut(id.row, id.col) {
            cell.formula = None;
        }
    }

    /// Add an edge from each reference in `formula` to `id`
    ///
    /// Failures are logged and leave the formula registered with whatever
    /// edges could be recorded.
    fn record_dependencies(&mut self, id: CellId, formula: &str) {
        let parsed = match parse_with(formula, self.options.lex_mode) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(cell = %id.to_a1_string(), error = %e, "failed to extract dependencies");
                return;
            }
        };

        let (resolved, invalid) = parsed.resolved_dependencies();
        for reference in invalid {
            warn!(cell = %id.to_a1_string(), reference = %reference, "skipping invalid reference");
        }
        for precedent in resolved {
            self.graph.add_dependency(precedent, id);
        }
    }

    fn evaluate_cell<G: CellAccess + ?Sized>(
        &self,
        grid: &mut G,
        id: CellId,
        formula: &str,
        stats: &mut RecalcStats,
    ) {
        let result = self.evaluate(&*grid, formula, Some(id));
        trace!(cell = %id.to_a1_string(), result = %result, "evaluated");
        stats.record(&result);
        write_result(grid, id, &result);
    }
}
