//! Command definitions and dispatch.

use crate::config::CliConfig;
use crate::output;
use crate::scenario::{Scenario, ScenarioRunner};
use crate::telemetry;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Ledgerflow CLI.
#[derive(Parser, Debug)]
#[command(name = "ledgerflow")]
#[command(about = "Ledgerflow - run DAO workflows against a simulated clock and bank")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Log filter, overrides the config file
    #[arg(short, long, global = true, env = "LEDGERFLOW_LOG")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario file against a fresh engine
    Simulate {
        /// Scenario file
        #[arg(short, long, value_name = "FILE")]
        scenario: PathBuf,

        /// Config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration
    InitConfig {
        /// Output path
        #[arg(short, long, value_name = "FILE", default_value = "ledgerflow.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Load the config file if given and apply command-line overrides.
pub fn load_config(cli: &Cli, path: Option<&Path>) -> anyhow::Result<CliConfig> {
    let mut config = match path {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    config.validate()?;
    Ok(config)
}

/// Execute the parsed command.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Simulate { scenario, config, json } => {
            let config = load_config(&cli, config.as_deref())?;
            telemetry::init(&config.logging)?;
            simulate(scenario, config, *json)
        }
        Commands::InitConfig { output, force } => {
            let config = load_config(&cli, None)?;
            telemetry::init(&config.logging)?;
            init_config(output, *force)
        }
    }
}

fn simulate(path: &Path, config: CliConfig, json: bool) -> anyhow::Result<()> {
    let scenario = Scenario::from_file(path)?;
    info!("Loaded scenario from {:?} ({} steps)", path, scenario.steps.len());

    let mut runner = ScenarioRunner::new(&scenario, config.dao)?;
    if !json {
        output::print_info(&format!("Running {} steps", scenario.steps.len()));
    }

    for (i, step) in scenario.steps.iter().enumerate() {
        let report = runner.run_step(i + 1, step)?;
        if !json {
            output::print_step(&report);
        }
    }

    let summary = runner.summary()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_summary(&summary);
        output::print_success("Scenario completed");
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    CliConfig::default().to_file(path)?;
    output::print_success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}
