//! chianet - Chia peer protocol codec tool
//!
//! Decodes, encodes and inspects streamable protocol messages.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chianet")]
#[command(about = "Decode, encode and inspect Chia peer protocol messages")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "CHIANET_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an envelope and its payload
    Decode {
        /// Envelope as hex (or @file to read raw bytes from file)
        input: String,
    },

    /// Encode a payload into an envelope
    Encode {
        /// Payload JSON, e.g. {"type":"request_peers","data":{}} (or @file.json)
        payload: String,

        /// Request/response ID
        #[arg(short, long)]
        id: Option<u16>,
    },

    /// Build the handshake described by the configuration
    Handshake {
        /// Request/response ID
        #[arg(short, long)]
        id: Option<u16>,
    },

    /// Show the wire layout of a record
    Describe {
        /// Record name (message, handshake, capability, request_peers,
        /// respond_peers, timestamped_peer_info)
        record: String,
    },

    /// List message types with a known schema
    Kinds,

    /// Write the effective configuration to a YAML file
    InitConfig {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    };

    match commands::execute(cli.command, &config, cli.json) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
