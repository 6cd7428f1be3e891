//! Abstractions over the device registry that stores edge deployment configurations.

use async_trait::async_trait;

pub mod connection_string;
pub mod error;
pub mod http;
pub mod memory;
pub mod model;
pub mod sas;

pub use connection_string::ConnectionString;
pub use error::RegistryError;
pub use http::{HttpRegistryClient, HttpRegistryConfig, DEFAULT_API_VERSION};
pub use memory::InMemoryRegistry;
pub use model::{Configuration, ConfigurationContent, ModuleContent, PROPERTIES_DESIRED};

/// The two registry operations the deployment flow relies on.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Persists a new configuration and returns the stored copy with server metadata.
    async fn create_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<Configuration, RegistryError>;

    /// Returns at most `max_count` stored configurations in registry order.
    async fn list_configurations(
        &self,
        max_count: usize,
    ) -> Result<Vec<Configuration>, RegistryError>;
}
