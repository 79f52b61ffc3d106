//! CLI command handler: build options (defaults → `.deployhash.toml` → flags), run, print report.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{create_counter, progress_hook, refresh_bar};
use crate::utils::deploy_toml::{apply_file_to_opts, load_deploy_toml};
use crate::utils::setup_logging;
use crate::{DeployOpts, DeployReport, prepare_deploy};

/// Layer config file then CLI flags over the defaults.
pub fn build_opts(cli: &Cli) -> Result<DeployOpts> {
    let mut opts = DeployOpts {
        dir: cli.dir.clone(),
        ..DeployOpts::default()
    };
    if let Some(file) = load_deploy_toml(&cli.dir) {
        apply_file_to_opts(&file, &cli.dir, &mut opts)?;
    }
    if let Some(ref dir) = cli.functions {
        opts.functions_dir = Some(dir.clone());
    }
    if let Some(ref id) = cli.hash_algorithm {
        opts.hash_algorithm = id.parse()?;
    }
    if let Some(ref id) = cli.fn_hash_algorithm {
        opts.fn_hash_algorithm = id.parse()?;
    }
    if cli.concurrent_stat.is_some() {
        opts.concurrent_stat = cli.concurrent_stat;
    }
    if cli.concurrent_hash.is_some() {
        opts.concurrent_hash = cli.concurrent_hash;
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    Ok(opts)
}

/// Run the pipeline over the CLI's directories and write the JSON report.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(cli)?;
    setup_logging(opts.verbose);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let bar = opts.verbose.then(|| {
        let b = create_counter("Hashing");
        refresh_bar(&b);
        b
    });

    debug!("Hashing deploy directory {}", opts.dir.display());
    let deploy = prepare_deploy(&opts, Some(Arc::clone(&cancel_requested)), progress_hook(&bar))
        .with_context(|| format!("prepare deploy for {}", opts.dir.display()))?;
    if cancel_requested.load(Ordering::Relaxed) {
        warn!("Ctrl+C arrived after hashing finished; writing the complete report");
    }

    let report = DeployReport::from(&deploy);
    debug!("{} distinct contents to upload", report.upload_count());
    let json = serde_json::to_string_pretty(&report).context("serialize deploy report")?;
    match &cli.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("write report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
