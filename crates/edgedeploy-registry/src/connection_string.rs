use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::RegistryError;

const HOST_NAME: &str = "HostName";
const SHARED_ACCESS_KEY_NAME: &str = "SharedAccessKeyName";
const SHARED_ACCESS_KEY: &str = "SharedAccessKey";

/// Service connection string of the form
/// `HostName=<hub>;SharedAccessKeyName=<policy>;SharedAccessKey=<base64 key>`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    host_name: String,
    shared_access_key_name: String,
    shared_access_key: Vec<u8>,
}

impl ConnectionString {
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn shared_access_key_name(&self) -> &str {
        &self.shared_access_key_name
    }

    pub(crate) fn shared_access_key(&self) -> &[u8] {
        &self.shared_access_key
    }
}

impl FromStr for ConnectionString {
    type Err = RegistryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut host_name = None;
        let mut key_name = None;
        let mut key = None;

        for segment in raw.trim().split(';').filter(|s| !s.trim().is_empty()) {
            let (name, value) = segment.split_once('=').ok_or_else(|| {
                RegistryError::InvalidConnectionString(format!(
                    "segment '{}' is not a key=value pair",
                    segment.trim()
                ))
            })?;
            let name = name.trim();
            let value = value.trim();

            if name.eq_ignore_ascii_case(HOST_NAME) {
                host_name = Some(value.to_string());
            } else if name.eq_ignore_ascii_case(SHARED_ACCESS_KEY_NAME) {
                key_name = Some(value.to_string());
            } else if name.eq_ignore_ascii_case(SHARED_ACCESS_KEY) {
                key = Some(value.to_string());
            }
        }

        let host_name = require(HOST_NAME, host_name)?;
        let shared_access_key_name = require(SHARED_ACCESS_KEY_NAME, key_name)?;
        let encoded_key = require(SHARED_ACCESS_KEY, key)?;
        let shared_access_key = STANDARD.decode(encoded_key.as_bytes()).map_err(|err| {
            RegistryError::InvalidConnectionString(format!(
                "{SHARED_ACCESS_KEY} is not valid base64: {err}"
            ))
        })?;

        Ok(Self {
            host_name,
            shared_access_key_name,
            shared_access_key,
        })
    }
}

fn require(name: &str, value: Option<String>) -> Result<String, RegistryError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RegistryError::InvalidConnectionString(format!(
            "missing {name}"
        ))),
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host_name", &self.host_name)
            .field("shared_access_key_name", &self.shared_access_key_name)
            .field("shared_access_key", &"<redacted>")
            .finish()
    }
}
