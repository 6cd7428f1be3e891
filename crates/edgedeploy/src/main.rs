use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgedeploy_core::config::{AppConfig, ConfigOverrides};
use edgedeploy_core::{flow, loader, printer, DeployError};
use edgedeploy_registry::{HttpRegistryClient, HttpRegistryConfig, InMemoryRegistry, RegistryClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Registers edge deployment descriptors as hub configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the deployment descriptor as a configuration, then list configurations
    Run(RunArgs),
    /// Build the configuration payload locally and print it as JSON
    Build(DescriptorArgs),
    /// List configurations stored in the registry
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
struct DescriptorArgs {
    /// Path to the deployment descriptor (default: deployment.json)
    #[arg(long)]
    descriptor: Option<PathBuf>,
    /// Configuration id to register (overrides CONFIG_ID)
    #[arg(long)]
    config_id: Option<String>,
    /// Workload module copied next to $edgeAgent and $edgeHub (overrides EDGE_MODULE_NAME)
    #[arg(long)]
    module: Option<String>,
    /// Device twin query selecting target devices (overrides TARGET_CONDITION)
    #[arg(long)]
    target_condition: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ListingArgs {
    /// Maximum number of configurations to list (overrides LIST_COUNT)
    #[arg(long)]
    count: Option<usize>,
    /// Pause between printed configurations in milliseconds (overrides PRINT_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Registry base URL, e.g. a local emulator (overrides IOTHUB_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    descriptor: DescriptorArgs,
    #[command(flatten)]
    listing: ListingArgs,
    /// Use a throwaway in-process registry instead of the hub
    #[arg(long)]
    offline: bool,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    #[command(flatten)]
    listing: ListingArgs,
    /// Print a summary table instead of full reports
    #[arg(long)]
    table: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args).await,
        Command::Build(args) => handle_build(args),
        Command::List(args) => handle_list(args).await,
    }
}

async fn handle_run(args: RunArgs) -> Result<()> {
    let config = AppConfig::load(overrides(args.descriptor, args.listing))
        .context("failed to load configuration")?;
    let registry: Box<dyn RegistryClient> = if args.offline {
        info!("using in-memory registry");
        Box::new(InMemoryRegistry::new())
    } else {
        Box::new(connect_registry(&config)?)
    };

    let summary = flow::run(&config, registry.as_ref(), &mut io::stdout()).await?;
    info!(
        configuration_id = %summary.created.id,
        listed = summary.listed.len(),
        "deployment run finished"
    );
    Ok(())
}

fn handle_build(args: DescriptorArgs) -> Result<()> {
    let config = AppConfig::load(overrides(args, ListingArgs::default()))
        .context("failed to load configuration")?;
    let configuration_id = config.configuration_id()?;

    let descriptor = loader::load(&config.descriptor_path)?;
    let configuration = config.builder().build(&descriptor, configuration_id)?;
    println!("{}", serde_json::to_string_pretty(&configuration)?);
    Ok(())
}

async fn handle_list(args: ListArgs) -> Result<()> {
    let config = AppConfig::load(overrides(DescriptorArgs::default(), args.listing))
        .context("failed to load configuration")?;
    let registry = connect_registry(&config)?;

    if args.table {
        let configurations = registry
            .list_configurations(config.list_count)
            .await
            .map_err(DeployError::from)?;
        println!("{}", printer::format_table(&configurations));
    } else {
        flow::print_configurations(
            &registry,
            config.list_count,
            config.print_delay,
            &mut io::stdout(),
        )
        .await?;
    }
    Ok(())
}

fn overrides(descriptor: DescriptorArgs, listing: ListingArgs) -> ConfigOverrides {
    ConfigOverrides {
        configuration_id: descriptor.config_id,
        custom_module: descriptor.module,
        descriptor_path: descriptor.descriptor,
        target_condition: descriptor.target_condition,
        list_count: listing.count,
        print_delay_ms: listing.delay_ms,
        endpoint: listing.endpoint,
    }
}

fn connect_registry(config: &AppConfig) -> Result<HttpRegistryClient> {
    let mut registry_config = HttpRegistryConfig::new(config.connection()?);
    registry_config.endpoint = config.endpoint.clone();

    let client = HttpRegistryClient::new(registry_config)
        .map_err(DeployError::from)
        .context("failed to configure registry client")?;
    info!(registry = %client.base_url(), "registry client ready");
    Ok(client)
}
