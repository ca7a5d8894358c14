//! completion-analyzer - completion/workover report analysis CLI
//!
//! # Usage
//!
//! ```bash
//! # Analyse one report, outputs land next to the working directory
//! completion-analyzer --input report.txt
//!
//! # Several reports, caller-supplied nodal inputs, JSON logs
//! completion-analyzer --input a.txt --input b.txt --outdir out \
//!     --nodal-json nodal.json --log-json
//! ```
//!
//! Writes `<stem>.analysis.json` and `<stem>.analysis.md` per input and exits
//! with the worst run exit code (0 ok, 1 stage failed or skipped, 2 aborted).
//!
//! # Environment Variables
//!
//! - `COMPLETION_ANALYZER_CONFIG`: config TOML used when `--config` is absent
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use completion_analyzer::config::validation::validate_typical_ranges;
use completion_analyzer::pipeline::{load_overrides, PlainTextSource};
use completion_analyzer::{AnalysisConfig, AnalysisContext, Orchestrator};

#[derive(Parser, Debug)]
#[command(name = "completion-analyzer")]
#[command(about = "Completion report parameter extraction and nodal analysis")]
#[command(version)]
struct CliArgs {
    /// Report text file (repeatable)
    #[arg(long = "input", short, required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Directory for the .analysis.json / .analysis.md outputs
    #[arg(long, default_value = ".")]
    outdir: PathBuf,

    /// Nodal inputs JSON overriding extracted values
    #[arg(long, value_name = "FILE")]
    nodal_json: Option<PathBuf>,

    /// Analysis config TOML (default: env var, ./analysis_config.toml, built-ins)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "COMPLETION_ANALYZER_LOG_JSON")]
    log_json: bool,
}

fn init_logging(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = match args.config {
        Some(ref path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };
    for w in validate_typical_ranges(&config) {
        warn!("{}", w);
    }
    let overrides = args
        .nodal_json
        .as_deref()
        .map(load_overrides)
        .transpose()
        .context("loading nodal inputs")?;

    let context = Arc::new(AnalysisContext::new(config).context("compiling extraction patterns")?);
    let decimals = context.config.report.decimals;

    std::fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating output directory {}", args.outdir.display()))?;

    let orchestrator = Orchestrator::new(Arc::clone(&context));
    let mut worst = 0;

    for (path, outcome) in orchestrator.run_files(&PlainTextSource, &args.inputs, overrides.as_ref()) {
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Skipping unreadable input");
                worst = worst.max(2);
                continue;
            }
        };

        let stem = path
            .file_stem()
            .map_or_else(|| "report".to_string(), |s| s.to_string_lossy().into_owned());

        let json_path = args.outdir.join(format!("{stem}.analysis.json"));
        let json = result.to_json_pretty().context("serializing analysis result")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("writing {}", json_path.display()))?;

        let md_path = args.outdir.join(format!("{stem}.analysis.md"));
        std::fs::write(&md_path, result.to_markdown(decimals))
            .with_context(|| format!("writing {}", md_path.display()))?;

        info!(
            input = %path.display(),
            json = %json_path.display(),
            markdown = %md_path.display(),
            state = %result.state(),
            exit_code = result.exit_code(),
            "Wrote analysis"
        );
        worst = worst.max(result.exit_code());
    }

    if worst != 0 {
        std::process::exit(worst);
    }
    Ok(())
}
