//! Teardown CLI - delete a Compute Engine VM and its reserved static IP.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use teardown_cloud::Gcp;

/// Tear down a Compute Engine VM and, optionally, its static IP.
#[derive(Parser)]
#[command(name = "teardown")]
#[command(about = "Delete a Compute Engine instance and its reserved static IP")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// `OAuth2` access token (or set `GCP_ACCESS_TOKEN` env var).
    #[arg(long, env = "GCP_ACCESS_TOKEN")]
    access_token: String,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only config and progress
    // notices, so the output stays scriptable.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(&cli.config)?;
    tracing::debug!(path = %cli.config.display(), "Loaded configuration");
    print!("{}", config.to_yaml()?);

    let gcp = Gcp::new(&config.basic.project_id, &cli.access_token)
        .context("Failed to create Compute Engine client")?;

    delete_instance(&gcp, &config.basic.zone, &config.basic.vm_name).await?;

    if config.network.static_ip {
        delete_static_ip(&gcp, &config.basic.region, &config.basic.vm_name).await?;
    }

    Ok(())
}

/// Delete the instance and block until the operation settles.
async fn delete_instance(gcp: &Gcp, zone: &str, vm_name: &str) -> Result<()> {
    println!("Deleting {vm_name} from {zone}...");
    gcp.delete_instance(zone, vm_name)
        .await
        .context("Instance deletion failed")?;
    println!("Instance {vm_name} deleted.");
    Ok(())
}

/// Delete the reserved address named after the VM.
async fn delete_static_ip(gcp: &Gcp, region: &str, address_name: &str) -> Result<()> {
    gcp.delete_address(region, address_name)
        .await
        .context("Static IP deletion failed")?;
    println!("Deleted static IP address: {address_name}");
    Ok(())
}
