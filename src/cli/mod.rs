//! Command line entry points
//!
//! - `serve`: run the HTTP API
//! - `generate`: produce one deck and write it to disk

pub mod generate;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Slide Generator - turn a topic into a PowerPoint deck
#[derive(Parser)]
#[command(name = "slide-generator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Generate a single presentation and save it
    Generate(generate::GenerateArgs),
}

/// Read `.env`, load layered configuration and install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
