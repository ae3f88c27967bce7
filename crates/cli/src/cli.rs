use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Credit insight engine.
///
/// Evaluates a rule set against a batch of normalized credit records and
/// writes the resulting insights as a JSON report.
#[derive(Parser, Debug)]
#[command(name = "credit-insights", version, about = "Rule-driven credit report insights")]
pub struct CliArgs {
    /// Engine config file (TOML). Env vars and flags override it.
    #[arg(long, global = true, env = "CREDIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a record batch and write the insight report.
    Run(RunArgs),
    /// Load and lint a rule set without evaluating anything.
    Check(CheckArgs),
    /// Evaluate one condition against one record and print diagnostics.
    TestCondition(TestConditionArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Rule file or directory of rule files.
    #[arg(long, env = "CREDIT_RULES", default_value = "data/rules")]
    pub rules: PathBuf,

    /// Batch input JSON. `-` reads stdin.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Report destination. Defaults to stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub engine: EngineOverrides,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rule file or directory of rule files.
    #[arg(long, env = "CREDIT_RULES", default_value = "data/rules")]
    pub rules: PathBuf,

    /// Treat lint warnings as failures.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct TestConditionArgs {
    /// Condition expression, e.g. `creditutilizationratio > 80`.
    pub condition: String,

    /// Record as a JSON object.
    #[arg(long, default_value = "{}")]
    pub record: String,

    #[command(flatten)]
    pub engine: EngineOverrides,
}

/// Command-line overrides for [`credit_core::EngineConfig`].
#[derive(Args, Debug, Default, Clone)]
pub struct EngineOverrides {
    /// Evaluate records in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Per-condition evaluation budget in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Per-condition operation budget.
    #[arg(long)]
    pub max_ops: Option<usize>,

    /// Prefix for the `currency` template filter.
    #[arg(long)]
    pub currency_symbol: Option<String>,
}
