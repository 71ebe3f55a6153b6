//! # Craftdex
//!
//! Command-line entry point for recipe lookup.
//!
//! Ties together:
//! - Config: `craftdex.toml` with service tuning
//! - Catalog: JSON snapshot of items, recipes, and brewing rules
//! - Core: the matching and brewing service

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use clap::Parser;
use craftdex_engine::cli::Cli;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("craftdex=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("Craftdex starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let response = cli.run()?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
