//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OrthoEvidence CLI - derive evidence tables from clinical research and
/// score orthodontic treatment necessity.
#[derive(Debug, Parser)]
#[command(name = "ortho")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize the evidence store and seed the reference issues
    Init(InitArgs),

    /// Classify all stored papers against the dental issues
    Classify,

    /// Run one aggregation batch over the research findings
    Aggregate,

    /// Run the background aggregation worker until Ctrl+C
    Worker(WorkerArgs),

    /// Score a patient's treatment necessity
    Score(ScoreArgs),

    /// Show a derived evidence table
    Evidence(EvidenceArgs),

    /// List logged scoring reports
    Reports,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Skip seeding the built-in reference issues and keywords
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for the worker command.
#[derive(Debug, Parser)]
pub struct WorkerArgs {
    /// Minutes between aggregation cycles (overrides the config file)
    #[arg(short, long)]
    pub interval_minutes: Option<u64>,
}

/// Arguments for the score command.
#[derive(Debug, Parser)]
pub struct ScoreArgs {
    /// Patient age in years
    #[arg(short, long)]
    pub age: u8,

    /// Selected issues: comma-separated codes or numeric ids
    #[arg(short, long, value_delimiter = ',')]
    pub issues: Vec<String>,

    /// Append the result to the audit log
    #[arg(long)]
    pub log_report: bool,

    /// Free-text notes stored with the logged report
    #[arg(long)]
    pub notes: Option<String>,
}

/// Which derived table to display.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EvidenceTable {
    /// Age-risk profiles
    AgeRisk,
    /// Issue-treatment effects
    Effects,
    /// Age-timing benefits
    Timing,
    /// Future scenarios
    Scenarios,
    /// Economic impacts
    Economics,
}

/// Arguments for the evidence command.
#[derive(Debug, Parser)]
pub struct EvidenceArgs {
    /// The table to display
    #[arg(value_enum)]
    pub table: EvidenceTable,

    /// Issue code filter (effects table)
    #[arg(long)]
    pub issue: Option<String>,

    /// Age filter (scenarios and economics tables)
    #[arg(long)]
    pub age: Option<u8>,
}
