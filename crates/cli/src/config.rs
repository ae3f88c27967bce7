use std::path::Path;

use anyhow::{Context, Result};
use credit_core::EngineConfig;
use tracing::debug;

use crate::cli::EngineOverrides;

/// Resolve the engine config: file (if any), then `CREDIT_*` env vars,
/// then command-line flags.
pub fn resolve(path: Option<&Path>, overrides: &EngineOverrides) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(path).with_context(|| match path {
        Some(p) => format!("failed to load engine config from {}", p.display()),
        None => "failed to read engine config from environment".to_string(),
    })?;
    apply_overrides(&mut config, overrides);
    debug!(?config, "resolved engine config");
    Ok(config)
}

fn apply_overrides(config: &mut EngineConfig, overrides: &EngineOverrides) {
    if overrides.parallel {
        config.parallel = true;
    }
    if let Some(ms) = overrides.timeout_ms {
        config.eval_timeout_ms = ms;
    }
    if let Some(ops) = overrides.max_ops {
        config.max_eval_ops = ops;
    }
    if let Some(symbol) = &overrides.currency_symbol {
        config.currency_symbol = symbol.clone();
    }
}
