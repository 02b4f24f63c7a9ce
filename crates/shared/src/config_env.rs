use std::env;

use url::Url;

use crate::config::ConfigError;

pub(crate) fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_trimmed_env(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

pub(crate) fn parse_u32_env(key: &str, default: u32) -> Result<u32, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_f64_env(key: &str, default: f64) -> Result<f64, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ConfigError::ParseFloat(key.to_string())),
        None => Ok(default),
    }
}

/// Comma-separated list. A variable that is set but blank yields an empty list;
/// only an unset variable falls back to `default`.
pub(crate) fn parse_list_env(key: &str, default: &[&str]) -> Vec<String> {
    split_list(env::var(key).ok().as_deref(), default)
}

fn split_list(raw: Option<&str>, default: &[&str]) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect(),
        None => default.iter().map(|item| (*item).to_string()).collect(),
    }
}

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Validates an http(s) base URL and strips any trailing slash so paths can be
/// appended with `format!("{base}/api/...")`.
pub(crate) fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| {
        ConfigError::InvalidConfiguration(format!("{key} is not a valid URL: '{raw}'"))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{key} must start with http:// or https://"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
