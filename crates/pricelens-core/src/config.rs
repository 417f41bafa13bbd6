use crate::app_config::{AppConfig, FetchMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the delay bounds
/// are inconsistent.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or the delay bounds
/// are inconsistent.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
///
/// Every variable has a default; an unset environment yields a working
/// configuration pointed at a local sink.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value.is_sign_negative() || !value.is_finite() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be a non-negative finite number, got {raw}"),
            });
        }
        Ok(value)
    };

    let sink_endpoint = or_default("PRICELENS_SINK_ENDPOINT", "http://localhost:3000/scrape");
    let log_level = or_default("PRICELENS_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default("PRICELENS_OUTPUT_PATH", "scrape-output.json"));

    let fetch_mode = parse_fetch_mode(&or_default("PRICELENS_FETCH_MODE", "static"))?;

    let request_timeout_secs = parse_u64("PRICELENS_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("PRICELENS_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_f64("PRICELENS_RETRY_BACKOFF_BASE_SECS", "2.0")?;
    let retry_backoff_cap_secs = parse_f64("PRICELENS_RETRY_BACKOFF_CAP_SECS", "10.0")?;
    let min_request_delay_secs = parse_f64("PRICELENS_MIN_REQUEST_DELAY_SECS", "2.0")?;
    let max_request_delay_secs = parse_f64("PRICELENS_MAX_REQUEST_DELAY_SECS", "5.0")?;
    let render_timeout_secs = parse_u64("PRICELENS_RENDER_TIMEOUT_SECS", "30")?;
    let render_wait_selector = lookup("PRICELENS_RENDER_WAIT_SELECTOR")
        .ok()
        .filter(|s| !s.trim().is_empty());

    if min_request_delay_secs > max_request_delay_secs {
        return Err(ConfigError::Validation(format!(
            "PRICELENS_MIN_REQUEST_DELAY_SECS ({min_request_delay_secs}) must not exceed \
             PRICELENS_MAX_REQUEST_DELAY_SECS ({max_request_delay_secs})"
        )));
    }

    let proxies = parse_proxies(&or_default("PRICELENS_PROXIES", ""));

    Ok(AppConfig {
        sink_endpoint,
        log_level,
        output_path,
        fetch_mode,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
        retry_backoff_cap_secs,
        min_request_delay_secs,
        max_request_delay_secs,
        render_timeout_secs,
        render_wait_selector,
        proxies,
    })
}

fn parse_fetch_mode(s: &str) -> Result<FetchMode, ConfigError> {
    match s {
        "static" => Ok(FetchMode::Static),
        "rendered" => Ok(FetchMode::Rendered),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICELENS_FETCH_MODE".to_string(),
            reason: format!("expected \"static\" or \"rendered\", got {other:?}"),
        }),
    }
}

/// Split a comma-separated proxy list, dropping empty entries.
fn parse_proxies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
