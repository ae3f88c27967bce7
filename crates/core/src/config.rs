use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env_opt(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnv {
                key: key.to_string(),
                value: raw,
            }),
        },
        None => Ok(None),
    }
}

// ── Engine config ─────────────────────────────────────────────

/// Tunables for one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock budget per condition evaluation, in milliseconds.
    pub eval_timeout_ms: u64,
    /// Maximum AST node visits per condition evaluation.
    pub max_eval_ops: usize,
    /// Maximum expression nesting depth accepted by the parser.
    pub max_expression_depth: usize,
    /// Evaluate records on a rayon pool instead of sequentially.
    pub parallel: bool,
    /// Prefix used by the `currency` template filter.
    pub currency_symbol: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eval_timeout_ms: 100,
            max_eval_ops: 10_000,
            max_expression_depth: 64,
            parallel: false,
            currency_symbol: "RM".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from an optional TOML file, then apply env overrides.
    ///
    /// A missing `path` means "defaults + env".
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading engine config");
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `CREDIT_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("CREDIT_EVAL_TIMEOUT_MS")? {
            self.eval_timeout_ms = v;
        }
        if let Some(v) = env_parse("CREDIT_MAX_EVAL_OPS")? {
            self.max_eval_ops = v;
        }
        if let Some(v) = env_parse("CREDIT_MAX_EXPRESSION_DEPTH")? {
            self.max_expression_depth = v;
        }
        if let Some(v) = env_bool("CREDIT_PARALLEL")? {
            self.parallel = v;
        }
        if let Some(v) = env_opt("CREDIT_CURRENCY_SYMBOL") {
            self.currency_symbol = v;
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            eval_timeout_ms = self.eval_timeout_ms,
            max_eval_ops = self.max_eval_ops,
            max_expression_depth = self.max_expression_depth,
            parallel = self.parallel,
            currency = %self.currency_symbol,
            "engine config loaded"
        );
    }
}
