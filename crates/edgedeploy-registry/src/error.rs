use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("registry client configuration error: {0}")]
    Configuration(String),

    #[error("registry rejected credentials: {0}")]
    Auth(String),

    #[error("configuration '{id}' already exists")]
    Conflict { id: String },

    #[error("transient registry failure: {0}")]
    Transient(String),

    #[error("registry returned status {status}: {body}")]
    Unexpected { status: u16, body: String },

    #[error("failed to decode registry payload: {0}")]
    Decode(String),
}

impl RegistryError {
    /// Whether a caller-level retry could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
