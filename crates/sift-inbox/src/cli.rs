//! Command line interface: run JSON list requests against a JSON store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use sift::CompilerConfig;
use tracing::{debug, info};

use crate::inbox::{GetNotifications, Inbox};
use crate::notification::Notification;

#[derive(Debug, Parser)]
#[command(name = "sift-inbox")]
#[command(about = "Filter, sort and page notifications with JSON requests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More logging (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a request file against a notifications file
    Query {
        /// JSON array of notifications
        #[arg(long, short)]
        records: PathBuf,

        /// JSON request: recipientId, filter, sort, page, include
        #[arg(long, short)]
        query: PathBuf,

        /// Compiler limits, YAML or JSON
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// List the fields requests can filter and sort on
    Fields,
}

/// Log level for the given number of `-v` flags.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Runs a parsed command and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Query {
            records,
            query,
            config,
            pretty,
        } => {
            let config = match config {
                Some(path) => load_config(path)?,
                None => CompilerConfig::default(),
            };
            let notifications: Vec<Notification> = read_json(records)?;
            let request: GetNotifications = read_json(query)?;
            info!(records = notifications.len(), "loaded notifications");

            let inbox = Inbox::with_config(notifications, config);
            let result = inbox
                .query(&request)
                .with_context(|| format!("bad request in {}", query.display()))?;

            let out = if *pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            Ok(out)
        }
        Command::Fields => {
            let inbox = Inbox::new(Vec::new());
            let lines: Vec<String> = inbox
                .fields()
                .fields()
                .map(|(id, ty)| format!("{id}\t{ty}"))
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

/// Loads compiler limits, picking the format from the file extension.
pub fn load_config(path: &Path) -> Result<CompilerConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    debug!(path = %path.display(), ext, "loading config");

    let config = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML config {}", path.display()))?,
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON config {}", path.display()))?,
        other => bail!(
            "unsupported config format '{other}' for {}, expected .yaml, .yml or .json",
            path.display()
        ),
    };
    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}
