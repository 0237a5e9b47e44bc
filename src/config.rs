//! Process configuration
//!
//! Read once at startup from environment variables. Invalid numeric values
//! fall back to their defaults with a warning.

use crate::llm::LlmConfig;
use crate::runtime::TurnConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default CORS origin for the local frontend
pub const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Extra allowed CORS origin
    pub frontend_url: Option<String>,
    /// JSON menu file; the built-in menu is used when unset
    pub menu_path: Option<PathBuf>,
    pub tax_rate_bps: u32,
    pub max_tool_rounds: u32,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            frontend_url: None,
            menu_path: None,
            tax_rate_bps: 800,
            max_tool_rounds: 8,
            session_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            frontend_url: non_empty("FRONTEND_URL").map(|url| url.trim_end_matches('/').to_string()),
            menu_path: non_empty("BARISTA_MENU_PATH").map(PathBuf::from),
            tax_rate_bps: parse_or(&lookup, "BARISTA_TAX_RATE_BPS", defaults.tax_rate_bps),
            max_tool_rounds: positive_or(
                parse_or(&lookup, "BARISTA_MAX_TOOL_ROUNDS", defaults.max_tool_rounds),
                "BARISTA_MAX_TOOL_ROUNDS",
                defaults.max_tool_rounds,
            ),
            session_ttl: Duration::from_secs(positive_or(
                parse_or(&lookup, "BARISTA_SESSION_TTL_SECS", defaults.session_ttl.as_secs()),
                "BARISTA_SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )),
            sweep_interval: Duration::from_secs(positive_or(
                parse_or(
                    &lookup,
                    "BARISTA_SWEEP_INTERVAL_SECS",
                    defaults.sweep_interval.as_secs(),
                ),
                "BARISTA_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval.as_secs(),
            )),
            llm: LlmConfig::from_lookup(&lookup),
        }
    }

    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            max_tool_rounds: self.max_tool_rounds,
            model_timeout: self.llm.request_timeout,
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse() {
        value
    } else {
        tracing::warn!(key, value = %raw, default = %default, "Invalid value, using default");
        default
    }
}

fn positive_or<T>(value: T, key: &str, default: T) -> T
where
    T: PartialOrd + Default + Copy + std::fmt::Display,
{
    if value > T::default() {
        value
    } else {
        tracing::warn!(key, default = %default, "Value must be positive, using default");
        default
    }
}
