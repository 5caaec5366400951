//! Pnflow - Pore Network Transport Solver
//!
//! Solves steady-state transport on a pore network described in a text file.
//!
//! # Usage
//!
//! ```bash
//! pnflow -v network.pn
//! pnflow --solver bicgstab --no-field network.pn
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::SetLoggerError;
use pnflow_core::{
    dsl::{self, SolverDef},
    error::Result,
    Model, SolverKind,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Pore network transport solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the network description file (.pn)
    #[arg(value_name = "NETWORK_FILE")]
    network_file: PathBuf,

    /// Solver override (lu, bicgstab, cg)
    #[arg(short, long)]
    solver: Option<SolverKind>,

    /// Only print rates and the effective property
    #[arg(long)]
    no_field: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Fails if a logger is already set.
fn init_logging(verbose: u8) -> std::result::Result<(), SetLoggerError> {
    TermLogger::init(
        log_level(verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }

    // Parse the network file
    let mut ast = dsl::parse_file(&args.network_file)?;

    if let Some(kind) = args.solver {
        let solver = ast.solver.get_or_insert(SolverDef {
            kind,
            tolerance: None,
            max_iterations: None,
            line: 0,
        });
        solver.kind = kind;
    }

    // Build and run
    let mut model = Model::from_ast(ast)?;
    let report = model.run()?;

    if !args.no_field {
        println!("# pore {}", report.quantity);
        for (pore, value) in report.values.iter().enumerate() {
            println!("{} {:.10e}", pore, value);
        }
    }

    for rate in &report.rates {
        let values: Vec<String> = rate.values.iter().map(|v| format!("{:.10e}", v)).collect();
        println!("rate {} ({}): {}", rate.target, rate.mode, values.join(" "));
    }

    if let Some(coefficient) = report.effective_property {
        println!("effective property: {:.10e}", coefficient);
    }

    Ok(())
}
