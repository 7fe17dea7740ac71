//! Grid storage and the cell accessor used by the formula engine

use crate::cell::{Cell, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Read/write access to cells by zero-based coordinate
///
/// The formula engine never owns cells; it reads precedents and writes results
/// through this trait. Coordinates outside the grid yield `None`.
pub trait CellAccess {
    /// Get the cell at (row, col)
    fn cell(&self, row: u32, col: u32) -> Option<&Cell>;

    /// Get the cell at (row, col) for writing
    fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell>;
}

/// A dense, row-major grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    cols: u32,
}

impl Grid {
    /// Create a grid of empty cells
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        check_dimensions(rows, cols)?;
        Ok(Self {
            cells: (0..rows)
                .map(|_| vec![Cell::new(); cols as usize])
                .collect(),
            cols,
        })
    }

    /// Number of rows
    pub fn row_count(&self) -> u32 {
        self.cells.len() as u32
    }

    /// Number of columns
    pub fn col_count(&self) -> u32 {
        self.cols
    }

    /// Resize the grid, keeping existing cells and filling new ones with empty cells
    pub fn resize(&mut self, rows: u32, cols: u32) -> Result<()> {
        check_dimensions(rows, cols)?;
        for row in &mut self.cells {
            row.resize(cols as usize, Cell::new());
        }
        self.cells
            .resize_with(rows as usize, || vec![Cell::new(); cols as usize]);
        self.cols = cols;
        Ok(())
    }

    /// Set a plain value, dropping any formula or error the cell held
    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        let cell = self.checked_cell_mut(row, col)?;
        *cell = Cell::with_value(value);
        Ok(())
    }

    /// Get a cell's raw value (empty for coordinates outside the grid)
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        self.cell(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Clear a cell back to the empty state
    pub fn clear_cell(&mut self, row: u32, col: u32) {
        if let Some(cell) = self.cell_mut(row, col) {
            cell.clear();
        }
    }

    /// Iterate over all cells with their coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (r as u32, c as u32, cell))
        })
    }

    fn checked_cell_mut(&mut self, row: u32, col: u32) -> Result<&mut Cell> {
        let rows = self.row_count();
        let cols = self.cols;
        if row >= rows {
            return Err(Error::RowOutOfBounds(row, rows.saturating_sub(1)));
        }
        if col >= cols {
            return Err(Error::ColumnOutOfBounds(col, cols.saturating_sub(1)));
        }
        Ok(&mut self.cells[row as usize][col as usize])
    }
}

impl CellAccess for Grid {
    fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(row as usize)?.get(col as usize)
    }

    fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.cells.get_mut(row as usize)?.get_mut(col as usize)
    }
}

fn check_dimensions(rows: u32, cols: u32) -> Result<()> {
    if rows > MAX_ROWS {
        return Err(Error::RowOutOfBounds(rows, MAX_ROWS));
    }
    if cols > MAX_COLS {
        return Err(Error::ColumnOutOfBounds(cols, MAX_COLS));
    }
    Ok(())
}
