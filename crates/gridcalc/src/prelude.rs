//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    // Grid access
    CellAccess,
    CellAddress,
    CellId,
    CellValue,
    // Engine types
    EngineOptions,
    EvaluationResult,
    FormulaEngine,
    Grid,
    LexMode,
    RecalcOrder,
    RecalcStats,
};
