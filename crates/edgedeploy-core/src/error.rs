// crates/edgedeploy-core/src/error.rs

use std::path::PathBuf;

use edgedeploy_registry::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("failed to read deployment descriptor {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deployment descriptor {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("deployment descriptor is missing required field '{key}' (at {path})")]
    MissingField { key: String, path: String },

    #[error("registry rejected credentials: {0}")]
    Auth(String),

    #[error("configuration '{id}' already exists in the registry")]
    Conflict { id: String },

    #[error("transient registry failure: {0}")]
    Transient(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("registry request failed: {0}")]
    Registry(#[source] RegistryError),

    #[error("failed to write console output: {0}")]
    Output(#[from] std::io::Error),
}

impl From<RegistryError> for DeployError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Auth(message) => DeployError::Auth(message),
            RegistryError::Conflict { id } => DeployError::Conflict { id },
            RegistryError::Transient(message) => DeployError::Transient(message),
            RegistryError::InvalidConnectionString(_) | RegistryError::Configuration(_) => {
                DeployError::Config(err.to_string())
            }
            other => DeployError::Registry(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
