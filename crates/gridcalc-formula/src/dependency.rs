//! Dependency tracking for formula recalculation
//!
//! Edges run from a precedent to the cells whose formulas read it directly.
//! A reverse index (dependent → precedents) lets a cell's edges be replaced
//! without scanning the whole graph.

use ahash::{AHashMap, AHashSet};
use gridcalc_core::CellId;
use std::collections::VecDeque;

/// Dependency graph for formula cells
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: AHashMap<CellId, AHashSet<CellId>>,
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellId, AHashSet<CellId>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellId, dependent: CellId) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Remove every edge whose dependent end is `cell`
    ///
    /// Edges where `cell` is the precedent are kept: other formulas still read it.
    pub fn clear_dependencies(&mut self, cell: CellId) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Get cells that directly depend on the given cell
    pub fn dependents(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell directly depends on
    pub fn precedents(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Check for the edge precedent → dependent
    pub fn contains_edge(&self, precedent: CellId, dependent: CellId) -> bool {
        self.dependents
            .get(&precedent)
            .map_or(false, |set| set.contains(&dependent))
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(|set| set.len()).sum()
    }

    /// Check if the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// All edges as (precedent, dependent) pairs, sorted
    pub fn edges(&self) -> Vec<(CellId, CellId)> {
        let mut edges: Vec<_> = self
            .dependents
            .iter()
            .flat_map(|(&p, deps)| deps.iter().map(move |&d| (p, d)))
            .collect();
        edges.sort_unstable();
        edges
    }

    fn sorted_dependents(&self, cell: CellId) -> Vec<CellId> {
        let mut deps: Vec<_> = self.dependents(cell).collect();
        deps.sort_unstable();
        deps
    }

    /// Every cell reachable from `start` through dependent edges, breadth first
    ///
    /// Each cell appears once, at its shallowest depth. `start` itself is
    /// included only if a cycle leads back to it.
    pub fn breadth_first_dependents(&self, start: CellId) -> Vec<CellId> {
        let mut order = Vec::new();
        let mut visited = AHashSet::new();
        let mut queue: VecDeque<CellId> = self.sorted_dependents(start).into();

        while let Some(cell) = queue.pop_front() {
            if !visited.insert(cell) {
                continue;
            }
            order.push(cell);
            queue.extend(self.sorted_dependents(cell));
        }

        order
    }

    /// Every cell reachable from `start` through dependent edges, precedents first
    ///
    /// Cycles are broken at the edge that closes them; `start` is never included.
    pub fn topological_dependents(&self, start: CellId) -> Vec<CellId> {
        let mut finished = vec![];
        let mut done = AHashSet::new();
        let mut on_path = AHashSet::new();
        done.insert(start);

        for root in self.sorted_dependents(start) {
            if done.contains(&root) {
                continue;
            }
            on_path.insert(root);
            let mut path = vec![(root, self.sorted_dependents(root).into_iter())];

            while let Some((cell, pending)) = path.last_mut() {
                let cell = *cell;
                match pending.next() {
                    Some(next) => {
                        if !done.contains(&next) && on_path.insert(next) {
                            path.push((next, self.sorted_dependents(next).into_iter()));
                        }
                    }
                    None => {
                        path.pop();
                        on_path.remove(&cell);
                        done.insert(cell);
                        finished.push(cell);
                    }
                }
            }
        }

        // Cells finish after everything downstream of them
        finished.reverse();
        finished
    }

    /// Detect a cycle among the precedents reachable from `cell`
    pub fn has_circular_reference(&self, cell: CellId) -> bool {
        let precedents_of = |id: CellId| self.precedents(id).collect::<Vec<_>>().into_iter();

        let mut seen = AHashSet::new();
        let mut on_path = AHashSet::new();
        seen.insert(cell);
        on_path.insert(cell);
        let mut path = vec![(cell, precedents_of(cell))];

        while let Some((current, pending)) = path.last_mut() {
            let current = *current;
            match pending.next() {
                Some(next) if on_path.contains(&next) => return true,
                Some(next) => {
                    if seen.insert(next) {
                        on_path.insert(next);
                        path.push((next, precedents_of(next)));
                    }
                }
                None => {
                    path.pop();
                    on_path.remove(&current);
                }
            }
        }
        false
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}
