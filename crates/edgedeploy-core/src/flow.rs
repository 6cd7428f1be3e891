//! The end-to-end deployment run: register the descriptor, then list what the
//! registry holds.
//!
//! Steps run strictly one after another and the first error aborts the run.
//! Nothing is retried.

use std::io::Write;
use std::time::Duration;

use edgedeploy_registry::{Configuration, RegistryClient};
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::{loader, printer};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub created: Configuration,
    pub listed: Vec<Configuration>,
}

pub async fn run<W: Write>(
    config: &AppConfig,
    registry: &dyn RegistryClient,
    out: &mut W,
) -> Result<RunSummary> {
    let configuration_id = config.configuration_id()?;

    writeln!(out, "Create configurations")?;
    let created = add_configuration(config, registry, configuration_id, out).await?;

    writeln!(out, "List existing configurations")?;
    let listed = print_configurations(registry, config.list_count, config.print_delay, out).await?;

    Ok(RunSummary { created, listed })
}

/// Loads the descriptor, builds the configuration and submits it.
pub async fn add_configuration<W: Write>(
    config: &AppConfig,
    registry: &dyn RegistryClient,
    configuration_id: &str,
    out: &mut W,
) -> Result<Configuration> {
    let descriptor = loader::load(&config.descriptor_path)?;
    let configuration = config.builder().build(&descriptor, configuration_id)?;

    let created = registry.create_configuration(&configuration).await?;
    info!(
        configuration_id,
        etag = created.etag.as_deref().unwrap_or_default(),
        "configuration added"
    );
    writeln!(out, "Configuration added, id: {configuration_id}")?;
    Ok(created)
}

/// Lists up to `count` configurations and prints a report for each, pausing
/// `delay` between reports.
pub async fn print_configurations<W: Write>(
    registry: &dyn RegistryClient,
    count: usize,
    delay: Duration,
    out: &mut W,
) -> Result<Vec<Configuration>> {
    let configurations = registry.list_configurations(count).await?;
    info!(requested = count, received = configurations.len(), "configurations listed");

    for (index, configuration) in configurations.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        write!(out, "{}", printer::format_configuration(configuration))?;
        out.flush()?;
    }

    writeln!(out, "Configurations received")?;
    Ok(configurations)
}
