pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod flow;
pub mod loader;
pub mod printer;

pub use builder::{build, ConfigurationBuilder};
pub use config::{AppConfig, ConfigOverrides};
pub use document::DeploymentDescriptor;
pub use error::{DeployError, Result};
