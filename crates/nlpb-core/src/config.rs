use std::path::PathBuf;

use crate::app_config::{AppConfig, DatasetConfig, Environment, VectorBackend};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the dataset settings, for commands that never contact a model.
///
/// # Errors
///
/// Returns `ConfigError` if `NLPB_MAX_ROWS` is invalid.
pub fn load_dataset_config() -> Result<DatasetConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_dataset_config(|key| std::env::var(key))
}

/// Build the dataset settings using the provided env-var lookup function.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if `NLPB_MAX_ROWS` is not a number.
pub fn build_dataset_config<F>(lookup: F) -> Result<DatasetConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };
    let max_rows = or_default("NLPB_MAX_ROWS", "500")
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "NLPB_MAX_ROWS".to_string(),
            reason: e.to_string(),
        })?;

    Ok(DatasetConfig {
        log_level: or_default("NLPB_LOG_LEVEL", "info"),
        dataset_path: PathBuf::from(or_default("NLPB_DATASET_PATH", "./data/dataset.csv")),
        max_rows,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
///
/// # Errors
///
/// Returns [`ConfigError`] if a required variable is missing or a value is invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let tei_url = require("NLPB_TEI_URL")?;
    let sentiment_url = require("NLPB_SENTIMENT_URL")?;
    let zero_shot_url = require("NLPB_ZERO_SHOT_URL")?;

    let env = parse_environment(&or_default("NLPB_ENV", "development"))?;
    let vector_backend = parse_vector_backend(&or_default("NLPB_VECTOR_BACKEND", "qdrant"))?;

    let bind_addr = parse_addr("NLPB_BIND_ADDR", "0.0.0.0:8000")?;
    let DatasetConfig {
        log_level,
        dataset_path,
        max_rows,
    } = build_dataset_config(&lookup)?;
    let default_top_k = positive(
        "NLPB_DEFAULT_TOP_K",
        parse_usize("NLPB_DEFAULT_TOP_K", "5")?,
    )?;
    let inference_api_key = lookup("NLPB_INFERENCE_API_KEY").ok();

    let qdrant_url = or_default("NLPB_QDRANT_URL", "http://localhost:6333");
    let qdrant_collection = or_default("NLPB_QDRANT_COLLECTION", "textos_dataset");
    let qdrant_api_key = lookup("NLPB_QDRANT_API_KEY").ok();
    let vector_dim = parse_u64("NLPB_VECTOR_DIM", "384")?;
    let local_index_path =
        PathBuf::from(or_default("NLPB_LOCAL_INDEX_PATH", "./data/index.json"));

    let model_timeout_secs = positive(
        "NLPB_MODEL_TIMEOUT_SECS",
        parse_u64("NLPB_MODEL_TIMEOUT_SECS", "30")?,
    )?;
    let model_queue_depth = positive(
        "NLPB_MODEL_QUEUE_DEPTH",
        parse_usize("NLPB_MODEL_QUEUE_DEPTH", "32")?,
    )?;
    let request_timeout_secs = positive(
        "NLPB_REQUEST_TIMEOUT_SECS",
        parse_u64("NLPB_REQUEST_TIMEOUT_SECS", "60")?,
    )?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        dataset_path,
        max_rows,
        default_top_k,
        tei_url,
        sentiment_url,
        zero_shot_url,
        inference_api_key,
        vector_backend,
        qdrant_url,
        qdrant_collection,
        qdrant_api_key,
        vector_dim,
        local_index_path,
        model_timeout_secs,
        model_queue_depth,
        request_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
/// Rejects zero for counts and durations where zero would disable the feature.
fn positive<T: Default + PartialEq>(var: &str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NLPB_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

fn parse_vector_backend(s: &str) -> Result<VectorBackend, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "qdrant" => Ok(VectorBackend::Qdrant),
        "local" => Ok(VectorBackend::Local),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NLPB_VECTOR_BACKEND".to_string(),
            reason: format!("expected `qdrant` or `local`, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
