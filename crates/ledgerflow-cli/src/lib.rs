//! Ledgerflow CLI - scenario runner for the DAO engine.

pub mod commands;
pub mod config;
pub mod output;
pub mod scenario;
pub mod telemetry;

pub use commands::{Cli, Commands};
pub use config::{CliConfig, LoggingConfig};
pub use scenario::{Action, Outcome, Scenario, ScenarioError, ScenarioRunner, Step, StepReport, Summary};
