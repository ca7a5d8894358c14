//! nodal-calc - run the nodal engine on a JSON inputs file
//!
//! ```bash
//! nodal-calc --inputs nodal.json
//! ```
//!
//! Prints the `NodalResult` as JSON on stdout. On an engine error prints
//! `{"error": {...}}` and exits 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use completion_analyzer::physics_engine;
use completion_analyzer::pipeline::load_overrides;

#[derive(Parser, Debug)]
#[command(name = "nodal-calc", about = "Single-point nodal analysis from a JSON inputs file")]
struct CliArgs {
    /// Nodal inputs JSON (same keys as --nodal-json)
    #[arg(long, value_name = "FILE")]
    inputs: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let inputs = load_overrides(&args.inputs)
        .with_context(|| format!("reading {}", args.inputs.display()))?;

    match physics_engine::compute(&inputs) {
        Ok(result) => {
            info!(bhp_bar = result.bottomhole_pressure_bar, regime = %result.flow_regime, "Computed");
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Nodal computation failed");
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "error": e }))?);
            std::process::exit(1);
        }
    }
}
