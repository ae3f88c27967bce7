mod cli;
mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use credit_core::{NormalizedBatch, Record};
use credit_rules::loader::LoadStatus;
use credit_rules::{InsightEngine, RuleRepository, SandboxEvaluator};

use crate::cli::{CheckArgs, CliArgs, Command, EngineOverrides, RunArgs, TestConditionArgs};

fn main() -> Result<()> {
    credit_core::config::load_dotenv();

    // Logs go to stderr; stdout is reserved for reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    match args.command {
        Command::Run(run) => run_batch(args.config.as_deref(), run),
        Command::Check(check) => check_rules(args.config.as_deref(), check),
        Command::TestCondition(test) => test_condition(args.config.as_deref(), test),
    }
}

// ── run ─────────────────────────────────────────────────────────────

fn run_batch(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let config = config::resolve(config_path, &args.engine)?;
    config.log_summary();

    let rules = RuleRepository::load_with_config(&args.rules, &config)
        .with_context(|| format!("failed to load rules from {}", args.rules.display()))?;
    let batch = read_batch(&args.input)?;

    let engine = InsightEngine::new(Arc::new(rules), config);
    let output = engine.run(&batch);
    let report = output.report();

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize insight report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json.as_bytes())
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), insights = report.total_insights, "report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json).context("failed to write report to stdout")?;
        }
    }
    Ok(())
}

fn read_batch(input: &Path) -> Result<NormalizedBatch> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read batch from stdin")?;
        return NormalizedBatch::from_json_str(&buf).context("invalid batch on stdin");
    }
    NormalizedBatch::from_path(input)
        .with_context(|| format!("failed to read batch from {}", input.display()))
}

// ── check ───────────────────────────────────────────────────────────

fn check_rules(config_path: Option<&Path>, args: CheckArgs) -> Result<()> {
    let config = config::resolve(config_path, &EngineOverrides::default())?;
    let rules = RuleRepository::load_with_config(&args.rules, &config)
        .with_context(|| format!("failed to load rules from {}", args.rules.display()))?;

    let mut stdout = io::stdout().lock();
    for warning in rules.warnings() {
        writeln!(stdout, "warning: {}", warning)?;
    }
    let files = rules
        .sources()
        .iter()
        .filter(|s| matches!(s.status, LoadStatus::Loaded { .. }))
        .count();
    writeln!(
        stdout,
        "{} rule(s) loaded from {} file(s), {} warning(s)",
        rules.len(),
        files,
        rules.warnings().len()
    )?;

    if args.strict && !rules.warnings().is_empty() {
        bail!("{} lint warning(s) in strict mode", rules.warnings().len());
    }
    Ok(())
}

// ── test-condition ──────────────────────────────────────────────────

fn test_condition(config_path: Option<&Path>, args: TestConditionArgs) -> Result<()> {
    let config = config::resolve(config_path, &args.engine)?;
    let record: Record = serde_json::from_str(&args.record).context("--record must be a JSON object")?;

    let evaluator = SandboxEvaluator::new(&config);
    let diagnostics = evaluator.test_condition(&args.condition, &record);
    if let Some(error) = &diagnostics.error {
        warn!(condition = %args.condition, error = %error, "condition did not evaluate");
    }

    let json = serde_json::to_string_pretty(&diagnostics).context("failed to serialize diagnostics")?;
    writeln!(io::stdout().lock(), "{}", json)?;
    Ok(())
}
