//! Shared configuration for the NLPB workspace.

pub mod app_config;
pub mod config;

use thiserror::Error;

pub use app_config::{AppConfig, DatasetConfig, Environment, VectorBackend};
pub use config::{
    build_app_config, build_dataset_config, load_app_config, load_app_config_from_env,
    load_dataset_config,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
