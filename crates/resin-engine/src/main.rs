//! # Resin Planner
//!
//! Command-line entry point for the resin investment optimizer.
//!
//! Usage: `resin-planner [config-path]`. Without a path the platform config
//! directory is searched; a missing file means defaults.
//!
//! This binary ties together:
//! - Combat: catalog, multiplier tables, combo evaluation
//! - Sim: equipment generation, material drops, the optimizer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod planner;
mod report;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::PlannerConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("resin=info".parse()?))
        .init();

    info!("Resin planner starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match std::env::args().nth(1) {
        Some(path) => PlannerConfig::load_from(PathBuf::from(path)),
        None => PlannerConfig::load(),
    };
    config.validate();

    let plan = planner::execute(&config)?;
    println!("{}", report::render(&plan, config.output)?);

    info!("Resin planner finished");
    Ok(())
}
