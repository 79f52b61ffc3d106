//! Deployhash CLI: hash a deploy directory and print the manifest report as JSON.

use anyhow::Result;
use clap::Parser;
use deployhash::engine::arg_parser::Cli;
use deployhash::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
