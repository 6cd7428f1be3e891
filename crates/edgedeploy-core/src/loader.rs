use std::fs;
use std::path::Path;

use tracing::debug;

use crate::document::DeploymentDescriptor;
use crate::error::{DeployError, Result};

pub const DEFAULT_DESCRIPTOR_PATH: &str = "deployment.json";

/// Reads and parses the deployment descriptor at `path`.
///
/// Only well-formedness is checked here; missing modules surface when the
/// configuration is built.
pub fn load(path: impl AsRef<Path>) -> Result<DeploymentDescriptor> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let descriptor = text
        .parse::<DeploymentDescriptor>()
        .map_err(|source| DeployError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = text.len(), "loaded deployment descriptor");
    Ok(descriptor)
}
