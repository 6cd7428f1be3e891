// crates/edgedeploy-core/src/config.rs

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use edgedeploy_registry::ConnectionString;

use crate::builder::{ConfigurationBuilder, DEFAULT_CUSTOM_MODULE, TARGET_ALL_DEVICES};
use crate::error::{DeployError, Result};
use crate::loader::DEFAULT_DESCRIPTOR_PATH;

pub const CONNECTION_STRING_VAR: &str = "IOTHUB_CONN_STRING";
pub const CONNECTION_STRING_FALLBACK_VAR: &str = "IOTHUB_CONN_STRING_CSHARP";
pub const CONFIG_ID_VAR: &str = "CONFIG_ID";
pub const MODULE_NAME_VAR: &str = "EDGE_MODULE_NAME";
pub const DESCRIPTOR_PATH_VAR: &str = "DEPLOYMENT_PATH";
pub const TARGET_CONDITION_VAR: &str = "TARGET_CONDITION";
pub const LIST_COUNT_VAR: &str = "LIST_COUNT";
pub const PRINT_DELAY_VAR: &str = "PRINT_DELAY_MS";
pub const ENDPOINT_VAR: &str = "IOTHUB_ENDPOINT";

const DEFAULT_LIST_COUNT: usize = 1;
const DEFAULT_PRINT_DELAY_MS: u64 = 1000;
const MAX_CONFIGURATION_ID_LEN: usize = 128;
const CONFIGURATION_ID_SYMBOLS: &str = "-:+%_#*?!(),=@;$'";

/// Values given on the command line; each one wins over its environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub configuration_id: Option<String>,
    pub custom_module: Option<String>,
    pub descriptor_path: Option<PathBuf>,
    pub target_condition: Option<String>,
    pub list_count: Option<usize>,
    pub print_delay_ms: Option<u64>,
    pub endpoint: Option<String>,
}

/// Everything the deployment flow needs from its environment, read once at startup.
///
/// The connection string is kept raw and only parsed by [`AppConfig::connection`],
/// so commands that never reach the hub do not depend on it.
#[derive(Clone)]
pub struct AppConfig {
    pub connection_string: Option<String>,
    pub configuration_id: Option<String>,
    pub custom_module: String,
    pub descriptor_path: PathBuf,
    pub target_condition: String,
    pub list_count: usize,
    pub print_delay: Duration,
    pub endpoint: Option<String>,
}

impl AppConfig {
    /// Loads `.env` (if any), reads the process environment and applies `overrides`.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    pub fn from_lookup<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let connection_string =
            var(CONNECTION_STRING_VAR).or_else(|| var(CONNECTION_STRING_FALLBACK_VAR));

        let list_count = match overrides.list_count {
            Some(count) => count,
            None => parse_var(LIST_COUNT_VAR, var(LIST_COUNT_VAR))?.unwrap_or(DEFAULT_LIST_COUNT),
        };
        let print_delay_ms = match overrides.print_delay_ms {
            Some(delay) => delay,
            None => parse_var(PRINT_DELAY_VAR, var(PRINT_DELAY_VAR))?
                .unwrap_or(DEFAULT_PRINT_DELAY_MS),
        };

        let config = Self {
            connection_string,
            configuration_id: overrides.configuration_id.or_else(|| var(CONFIG_ID_VAR)),
            custom_module: overrides
                .custom_module
                .or_else(|| var(MODULE_NAME_VAR))
                .unwrap_or_else(|| DEFAULT_CUSTOM_MODULE.to_string()),
            descriptor_path: overrides
                .descriptor_path
                .or_else(|| var(DESCRIPTOR_PATH_VAR).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR_PATH)),
            target_condition: overrides
                .target_condition
                .or_else(|| var(TARGET_CONDITION_VAR))
                .unwrap_or_else(|| TARGET_ALL_DEVICES.to_string()),
            list_count,
            print_delay: Duration::from_millis(print_delay_ms),
            endpoint: overrides.endpoint.or_else(|| var(ENDPOINT_VAR)),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(id) = &self.configuration_id {
            validate_configuration_id(id)?;
        }
        self.builder().validate()
    }

    pub fn connection(&self) -> Result<ConnectionString> {
        let raw = self.connection_string.as_deref().ok_or_else(|| {
            DeployError::Config(format!(
                "{CONNECTION_STRING_VAR} (or {CONNECTION_STRING_FALLBACK_VAR}) must be set"
            ))
        })?;
        Ok(raw.parse::<ConnectionString>()?)
    }

    pub fn configuration_id(&self) -> Result<&str> {
        self.configuration_id
            .as_deref()
            .ok_or_else(|| DeployError::Config(format!("{CONFIG_ID_VAR} must be set")))
    }

    pub fn builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder::new(self.custom_module.clone())
            .with_target_condition(self.target_condition.clone())
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("configuration_id", &self.configuration_id)
            .field("custom_module", &self.custom_module)
            .field("descriptor_path", &self.descriptor_path)
            .field("target_condition", &self.target_condition)
            .field("list_count", &self.list_count)
            .field("print_delay", &self.print_delay)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Registry ids: at most 128 ASCII alphanumerics or `-:+%_#*?!(),=@;$'`.
pub fn validate_configuration_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(DeployError::Config("configuration id cannot be empty".into()));
    }
    if id.len() > MAX_CONFIGURATION_ID_LEN {
        return Err(DeployError::Config(format!(
            "configuration id is {} characters long; the limit is {MAX_CONFIGURATION_ID_LEN}",
            id.len()
        )));
    }
    if let Some(invalid) = id
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !CONFIGURATION_ID_SYMBOLS.contains(*c))
    {
        return Err(DeployError::Config(format!(
            "configuration id '{id}' contains invalid character '{invalid}'"
        )));
    }
    Ok(())
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|_| {
            DeployError::Config(format!("{key} must be a non-negative integer, got '{value}'"))
        })
    })
    .transpose()
}
