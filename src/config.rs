// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::AppError;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_POLL_SECS: u64 = 15;
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub state_file: String,
    pub debounce: Duration,
    pub poll_interval: Duration,
    pub per_page: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_env_with(None)
    }

    /// Reads the environment, with `api_url` (e.g. from `--api-url`) taking
    /// the place of `EVALUATOR_API_URL` when given.
    pub fn from_env_with(api_url: Option<String>) -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(api_url, |name| env::var(name).ok())
    }

    fn from_lookup<F>(api_url: Option<String>, var: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = api_url
            .or_else(|| var("EVALUATOR_API_URL"))
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::Config("EVALUATOR_API_URL must be set".to_string()))?;

        let api_token = var("EVALUATOR_API_TOKEN").filter(|t| !t.trim().is_empty());

        let state_file =
            var("EVALUATOR_STATE_FILE").unwrap_or_else(|| ".evaluator-state.json".to_string());

        let debounce_ms: u64 = parse_var(&var, "EVALUATOR_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;
        let poll_secs: u64 = parse_var(&var, "EVALUATOR_POLL_SECS", DEFAULT_POLL_SECS)?;
        let per_page: u32 = parse_var(&var, "EVALUATOR_PER_PAGE", DEFAULT_PER_PAGE)?;

        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            api_url,
            api_token,
            state_file,
            debounce: Duration::from_millis(debounce_ms),
            poll_interval: Duration::from_secs(poll_secs.max(1)),
            per_page: per_page.max(1),
            rust_log,
        })
    }

    /// Configuration with defaults for everything but the backend URL.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            state_file: ".evaluator-state.json".to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            per_page: DEFAULT_PER_PAGE,
            rust_log: "info".to_string(),
        }
    }
}

fn parse_var<T, F>(var: &F, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        None => Ok(default),
    }
}
