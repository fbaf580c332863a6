use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use toolbelt::config::ToolbeltConfig;
use toolbelt::format::{format_now, format_time};
use toolbelt::storage::{FileCookieJar, FileStore, LocalStorage};
use toolbelt::{decode_utf8, decode_utf8_to_string, HostEnvironment};

#[derive(Debug, Parser)]
#[command(name = "toolbelt", version, about = "Browser-style helper utilities")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode UTF-8 bytes, replacing malformed sequences with U+FFFD
    Decode {
        /// Bytes as hex, e.g. "e2 82 ac"
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,

        /// Read bytes from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print UTF-16 code units instead of text
        #[arg(long)]
        units: bool,
    },

    /// Format a playback position in seconds
    FormatTime { seconds: f64 },

    /// Format the current local time
    FormatDate {
        /// Pattern such as "yyyy-MM-dd hh:mm:ss.i"
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Read or write a persisted value
    Storage {
        /// Store file (defaults to the configured store path)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Cookie jar file used when the store is unusable
        #[arg(long)]
        cookies: Option<PathBuf>,

        #[command(subcommand)]
        action: StorageAction,
    },

    /// Print the detected host environment
    Env,
}

#[derive(Debug, Subcommand)]
enum StorageAction {
    /// Print the value of a key
    Get { key: String },
    /// Set a key
    Set { key: String, value: String },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ToolbeltConfig::from_file(path)?,
        None => ToolbeltConfig::default(),
    };
    info!(version = env!("CARGO_PKG_VERSION"), "Configuration loaded");

    match cli.command {
        Command::Decode { hex, file, units } => {
            let bytes = match (hex, file) {
                (Some(hex), _) => parse_hex(&hex)?,
                (None, Some(path)) => std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Pass --hex or --file"),
            };

            if units {
                let rendered: Vec<String> = decode_utf8(&bytes)
                    .iter()
                    .map(|unit| format!("{:04X}", unit))
                    .collect();
                println!("{}", rendered.join(" "));
            } else {
                println!("{}", decode_utf8_to_string(&bytes));
            }
        }
        Command::FormatTime { seconds } => println!("{}", format_time(seconds)),
        Command::FormatDate { pattern } => {
            let pattern = pattern.unwrap_or(config.format.date_pattern);
            println!("{}", format_now(Some(&pattern)));
        }
        Command::Storage {
            store,
            cookies,
            action,
        } => {
            let store_path = store
                .or(config.storage.store_path.clone())
                .context("Pass --store or set storage.store_path")?;
            let cookie_path = cookies.unwrap_or_else(|| store_path.with_extension("cookies"));

            let storage = LocalStorage::from_config(
                FileStore::new(&store_path),
                FileCookieJar::new(&cookie_path),
                &config.storage,
            );

            match action {
                StorageAction::Get { key } => {
                    if let Some(value) = storage.get(&key) {
                        println!("{}", value);
                    }
                }
                StorageAction::Set { key, value } => storage.set(&key, &value),
            }
        }
        Command::Env => println!("{}", HostEnvironment::detect()),
    }

    Ok(())
}

/// Parse whitespace-separated or contiguous hex byte pairs.
fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() {
        bail!("Hex input must be ASCII");
    }
    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits");
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}
