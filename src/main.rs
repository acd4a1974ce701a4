//! resizer - Enter array formulas into an in-memory sheet and print the
//! settled results.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use log::{LevelFilter, info};
use resizer::settings::{Settings, load_settings};
use resizer::{MemoryHost, Session};
use resizer_engine::engine::{CellRange, CellRef, format_value};

#[derive(Debug, Parser)]
#[command(
    name = "resizer",
    version,
    about = "Resize array formulas to fit their results"
)]
struct Args {
    /// Formulas to enter, one below the other's result.
    #[arg(required = true, value_name = "FORMULA")]
    formulas: Vec<String>,

    /// Settings file (defaults to resizer.toml in the user config dir).
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore any settings file.
    #[arg(long)]
    no_config: bool,

    /// Name of the sheet to work on.
    #[arg(long, default_value = "Sheet1")]
    sheet: String,

    /// Cell the first formula is entered into.
    #[arg(long, default_value = "A1", value_parser = parse_cell)]
    at: CellRef,

    /// Largest block of the sheet to print, as ROWSxCOLS.
    #[arg(long, default_value = "20x8", value_parser = parse_extent)]
    show: (u32, u32),

    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_cell(text: &str) -> Result<CellRef, String> {
    CellRef::from_str(text).ok_or_else(|| format!("not a cell reference: {text}"))
}

fn parse_extent(text: &str) -> Result<(u32, u32), String> {
    let (rows, cols) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got {text}"))?;
    let rows: u32 = rows.trim().parse().map_err(|_| format!("bad row count: {rows}"))?;
    let cols: u32 = cols.trim().parse().map_err(|_| format!("bad column count: {cols}"))?;
    if rows == 0 || cols == 0 {
        return Err("extent must be at least 1x1".to_string());
    }
    Ok((rows, cols))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = if args.no_config {
        Settings::default()
    } else {
        let (settings, warnings) = load_settings(args.config.as_deref());
        for warning in warnings {
            eprintln!("Warning: {}", warning);
        }
        settings
    };

    let host = Arc::new(MemoryHost::new(&[args.sheet.as_str()], settings.sheet.limits()));
    let sheet = host.sheet_id(&args.sheet)?;
    let limits = settings.sheet.limits();
    let session = Session::new(Arc::clone(&host), settings.resizer);

    let mut cell = args.at;
    for formula in &args.formulas {
        if cell.row >= limits.max_rows {
            bail!("no room left on {} for {}", args.sheet, formula);
        }
        session
            .enter_formula(sheet, cell, formula)
            .with_context(|| format!("entering {} at {}", formula, cell))?;
        let rounds = session.settle();
        let block = host.formula_block(sheet, cell);
        info!("{} settled into {} after {} rounds", formula, block.to_a1(), rounds);
        cell = CellRef::new(cell.col, block.row_last + 1);
    }

    for alert in host.alerts() {
        eprintln!("alert: {}", alert);
    }

    if let Some(used) = host.used_range(sheet) {
        let (rows, cols) = args.show;
        let limit = used.first_cell().resized(rows, cols);
        let shown = CellRange::new(
            sheet,
            used.row_first,
            used.row_last.min(limit.row_last),
            used.col_first,
            used.col_last.min(limit.col_last),
        );
        for row in shown.row_first..=shown.row_last {
            let line: Vec<String> = (shown.col_first..=shown.col_last)
                .map(|col| format_value(&host.value(sheet, CellRef::new(col, row))))
                .collect();
            println!("{}", line.join("\t"));
        }
    }

    Ok(())
}
