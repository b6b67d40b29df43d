#![forbid(unsafe_code)]

mod batch;
mod cmd;
mod config;
mod export;
mod ingest;
mod output;
mod walk;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LoadedConfig, load_run_config};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hostrank: host centrality from network flow captures",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ./hostrank.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format for summaries.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Alpha-centrality attenuation factor, in (0, 1).
    #[arg(long, global = true, value_name = "ALPHA")]
    alpha: Option<f64>,

    /// PageRank damping factor, in (0, 1).
    #[arg(long, global = true, value_name = "D")]
    damping: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    /// Fold global flag overrides into the loaded configuration.
    fn apply_overrides(&self, loaded: &mut LoadedConfig) {
        let analysis = &mut loaded.config.analysis;
        if let Some(alpha) = self.alpha {
            analysis.alpha.alpha = alpha;
        }
        if let Some(damping) = self.damping {
            analysis.pagerank.damping = damping;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Analyze flow capture files",
        long_about = "Build the host graph for each file and write its centrality attributes.",
        after_help = "EXAMPLES:\n    # Write capture.binetflow_attributes.csv next to the capture\n    hostrank analyze capture.binetflow\n\n    # Print the attribute table instead\n    hostrank analyze capture.binetflow --stdout"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Analyze every capture under a dataset directory",
        long_about = "Walk a dataset directory, analyze each matching capture independently, and report per-file outcomes.",
        after_help = "EXAMPLES:\n    # Scenario 5 captures only, four at a time\n    hostrank batch ./CTU-13 --subdir 5 --jobs 4\n\n    # Emit machine-readable output\n    hostrank batch ./CTU-13 --format json"
    )]
    Batch(cmd::batch::BatchArgs),

    #[command(
        next_help_heading = "Configuration",
        about = "Inspect configuration",
        after_help = "EXAMPLES:\n    # Show the effective configuration\n    hostrank config show\n\n    # With a flag override\n    hostrank --alpha 0.05 config show --format json"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Configuration",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    hostrank completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HOSTRANK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "hostrank=debug,info"
        } else {
            "hostrank=info,warn"
        })
    });

    let format = env::var("HOSTRANK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        cmd::completions::run_completions(args.shell, &mut command)?;
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = env::current_dir()?;
    let mut loaded = load_run_config(cli.config.as_deref(), &cwd)?;
    cli.apply_overrides(&mut loaded);
    debug!(source = ?loaded.source, "configuration loaded");

    let failed = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, &loaded.config, output)?,
        Commands::Batch(args) => cmd::batch::run_batch_cmd(args, &loaded.config, output)?,
        Commands::Config(args) => {
            cmd::config::run_config(args, &loaded, output)?;
            false
        }
        Commands::Completions(_) => false,
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
