//! CLI bridge: log in and dump the monitor list as pretty JSON.

use anyhow::Context;
use clap::Parser;
use smartgen_sdk::{SmartGenClient, SmartGenConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smartgen-bridge", about = "SmartGen Cloud Plus bridge")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = SmartGenConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let mut client = SmartGenClient::new(config)?;

    let login = client.login().await.context("login failed")?;
    println!("Login response:");
    println!("{}", serde_json::to_string_pretty(&login)?);

    let monitors = client
        .get_monitor_list()
        .await
        .context("monitor list failed")?;
    println!("\nMonitor list:");
    println!("{}", serde_json::to_string_pretty(&monitors)?);

    Ok(())
}
