//! Main entry point for the gus-browse command-line tool.
//!
//! Loads the catalogue and sample metadata snapshots once and runs a single
//! browse query against them:
//! 1. `table` - column filters and free-text search over the catalogue.
//! 2. `cross-ref` - metadata filter projected onto abundance columns.
//! 3. `tree` - taxonomy aggregation.
//! 4. `genus` - drill-down into one genus.
//! 5. `suggest` - pick-list values for the metadata filters.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{run_cli, Cli};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Run CLI
    run_cli(cli)
}
