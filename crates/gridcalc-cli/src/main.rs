//! gridcalc CLI - evaluate formulas and run sheet scripts

mod script;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gridcalc::prelude::*;
use gridcalc::display_value;
use script::{parse_script, Action};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Reactive formula engine for tabular grids")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single formula against an empty grid
    Eval {
        /// Formula text, starting with '='
        formula: String,

        /// Report unrecognised characters instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Apply a sheet script and print the resulting grid
    Run {
        /// Script file, one `<cell> = <value or formula>` per line
        script: PathBuf,

        /// Number of rows in the grid
        #[arg(long, default_value = "100")]
        rows: u32,

        /// Number of columns in the grid
        #[arg(long, default_value = "26")]
        cols: u32,

        /// Order in which dependents are recalculated
        #[arg(long, value_enum, default_value = "bfs")]
        order: OrderArg,

        /// Strict lexing and strict precedent errors
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Bfs,
    Topo,
}

impl From<OrderArg> for RecalcOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Bfs => RecalcOrder::BreadthFirst,
            OrderArg::Topo => RecalcOrder::Topological,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval { formula, strict } => eval(&formula, strict),
        Commands::Run {
            script,
            rows,
            cols,
            order,
            strict,
        } => run(
            &script,
            rows,
            cols,
            EngineOptions {
                recalc_order: order.into(),
                lex_mode: lex_mode(strict),
                strict_precedents: strict,
            },
        ),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(io::stderr)
        .init();
}

fn lex_mode(strict: bool) -> LexMode {
    if strict {
        LexMode::Strict
    } else {
        LexMode::Permissive
    }
}

fn eval(formula: &str, strict: bool) -> Result<()> {
    let grid = Grid::new(1, 1)?;
    let engine = FormulaEngine::with_options(EngineOptions {
        lex_mode: lex_mode(strict),
        ..Default::default()
    });

    let result = engine.evaluate(&grid, formula, None);
    match result.message() {
        Some(message) => Err(anyhow!("{}: {}", display_value(&result), message)),
        None => {
            println!("{}", display_value(&result));
            Ok(())
        }
    }
}

fn run(path: &Path, rows: u32, cols: u32, options: EngineOptions) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let statements = parse_script(&source)
        .with_context(|| format!("Failed to parse '{}'", path.display()))?;

    let mut grid = Grid::new(rows, cols).context("Failed to create grid")?;
    let mut engine = FormulaEngine::with_options(options);
    let mut total = RecalcStats::default();

    for statement in statements {
        let id = statement.address.id();
        if grid.cell(id.row, id.col).is_none() {
            bail!(
                "line {}: {} is outside the {}x{} grid",
                statement.line,
                statement.address,
                rows,
                cols
            );
        }

        let stats = match statement.action {
            Action::Value(value) => engine.set_value(&mut grid, id, value),
            Action::Formula(formula) => engine.update_formula(&mut grid, id, Some(&formula)),
            Action::Clear => engine.set_value(&mut grid, id, CellValue::Empty),
        };
        total.merge(stats);
    }

    info!(
        formulas = engine.formulas().len(),
        evaluated = total.cells_evaluated,
        "script applied"
    );
    eprintln!(
        "Evaluated {} formulas ({} errors, {} circular)",
        total.cells_evaluated, total.errors, total.circular_references
    );

    let table = render_table(&grid);
    io::stdout()
        .write_all(table.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

/// Render the used part of the grid as an aligned table of display values
fn render_table(grid: &Grid) -> String {
    let mut last_row = None;
    let mut last_col = None;
    for (row, col, cell) in grid.iter() {
        if !cell.display.is_empty() {
            last_row = last_row.max(Some(row));
            last_col = last_col.max(Some(col));
        }
    }
    let (Some(last_row), Some(last_col)) = (last_row, last_col) else {
        return String::new();
    };

    let display = |row: u32, col: u32| {
        grid.cell(row, col)
            .map(|cell| cell.display.as_str())
            .unwrap_or("")
    };

    let label_width = (last_row + 1).to_string().len();
    let widths: Vec<usize> = (0..=last_col)
        .map(|col| {
            (0..=last_row)
                .map(|row| display(row, col).len())
                .chain(std::iter::once(gridcalc::column_to_letters(col).len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(label_width));
    for (col, width) in widths.iter().enumerate() {
        let letters = gridcalc::column_to_letters(col as u32);
        out.push_str(&format!(" | {:<width$}", letters, width = width));
    }
    out.push('\n');

    for row in 0..=last_row {
        out.push_str(&format!("{:>width$}", row + 1, width = label_width));
        for (col, width) in widths.iter().enumerate() {
            out.push_str(&format!(
                " | {:>width$}",
                display(row, col as u32),
                width = width
            ));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_table() {
        let mut grid = Grid::new(5, 5).unwrap();
        let mut engine = FormulaEngine::new();
        engine.set_value(&mut grid, CellId::new(0, 0), 10.0);
        engine.update_formula(&mut grid, CellId::new(1, 1), Some("=A1/4"));

        assert_eq!(
            render_table(&grid),
            "  | A  | B  \n1 | 10 |    \n2 |    | 2.5\n"
        );
    }

    #[test]
    fn test_render_empty_grid() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(render_table(&grid), "");
    }
}
