//! Dispatch messages across ranked delivery providers
//!
//! Without a subcommand every message listed in the configuration is
//! dispatched; `send` dispatches a single message given on the command line.
//! The resulting status ledger is printed as RON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier::controller::Courier;
use courier_common::Message;

#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Dispatch messages across ranked delivery providers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single message instead of the configured ones
    Send {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut courier = match find_config_file(cli.config)? {
        Some(path) => Courier::load(&path)?,
        None => Courier::default(),
    };

    if let Some(Commands::Send {
        recipient,
        subject,
        body,
    }) = cli.command
    {
        courier = courier.with_messages(vec![Message::new(recipient, subject, body)]);
    }

    let total = courier.messages().len();
    let report = courier.run().await?;

    println!("{}", report.to_ron()?);

    if !report.all_delivered() {
        anyhow::bail!("{} of {total} messages were not delivered", report.failed);
    }

    Ok(())
}

/// Find the configuration file using the following precedence:
/// 1. `--config` command line flag
/// 2. `COURIER_CONFIG` environment variable
/// 3. ./courier.config.ron (current working directory)
/// 4. /etc/courier/courier.config.ron (system-wide config)
///
/// With none of these present the built-in configuration is used.
fn find_config_file(explicit: Option<PathBuf>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!("--config points to non-existent file: {}", path.display());
    }

    if let Ok(env_path) = std::env::var("COURIER_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!(
            "COURIER_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./courier.config.ron"),
        PathBuf::from("/etc/courier/courier.config.ron"),
    ];

    Ok(default_paths.into_iter().find(|path| path.exists()))
}
