use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::Path;

use crate::config::{LoadedConfig, RunConfig};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the effective configuration (file values plus CLI overrides)
    Show,
}

#[derive(Serialize)]
struct ShowJson<'a> {
    source: Option<&'a Path>,
    config: &'a RunConfig,
}

pub fn run_config(args: &ConfigArgs, loaded: &LoadedConfig, output: OutputMode) -> Result<()> {
    match args.command {
        ConfigCommand::Show => run_show(loaded, output),
    }
}

fn run_show(loaded: &LoadedConfig, output: OutputMode) -> Result<()> {
    if output.is_json() {
        let payload = ShowJson {
            source: loaded.source.as_deref(),
            config: &loaded.config,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match &loaded.source {
        Some(path) => println!("# source: {}", path.display()),
        None => println!("# source: built-in defaults"),
    }
    let rendered =
        toml::to_string_pretty(&loaded.config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
