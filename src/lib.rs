//! Deployhash: concurrent deploy preparation. Stats, hashes and normalizes files into a
//! deploy manifest (logical path → digest) and a digest index (digest → every file with that
//! content) so identical content is uploaded once.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use engine::hashing::HashAlgorithm;
pub use error::PipelineError;
pub use pipeline::{PipelineContext, PipelineStats};
pub use types::*;

use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::pipeline::{
    DiscoverOpts, Discoverer, Hasher, HasherOpts, ManifestCollector, Normalizer, NormalizerOpts,
    OnCollected,
};
use crate::utils::config::WorkerThreadLimits;
use crate::utils::fd_limit::cap_workers_by_fd_limit;

/// Result alias used by the public deployhash API
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Shared progress hook; invoked with the number of descriptors just collected.
pub type ProgressHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Returns `(concurrent_stat, concurrent_hash)` for `opts`: explicit values win, otherwise
/// derived from available threads (hash workers capped by the FD limit).
pub fn resolve_concurrency(opts: &DeployOpts) -> (usize, usize) {
    let limits = WorkerThreadLimits::current();
    let stat = opts.concurrent_stat.unwrap_or_else(|| limits.stat_workers());
    let hash = opts
        .concurrent_hash
        .unwrap_or_else(|| cap_workers_by_fd_limit(limits.hash_workers()));
    (stat, hash)
}

fn progress_box(hook: &Option<ProgressHook>) -> OnCollected {
    hook.as_ref().map(|f| {
        let f = Arc::clone(f);
        Box::new(move |n: usize| f(n)) as Box<dyn Fn(usize) + Send>
    })
}

/// Single entry point: hash every deployable file under `opts.dir` and, when set, every
/// function bundle at the top level of `opts.functions_dir`.
///
/// - **`cancel`**: when the flag is set (e.g. from a Ctrl+C handler), no new items are admitted
///   and the run fails with [`PipelineError::Cancelled`].
/// - **`on_collected`**: progress hook, called from the collecting thread.
///
/// All stages are validated before any file is touched, so a bad option returns
/// [`PipelineError::Config`] with nothing processed. On any other error, partial results are
/// dropped.
pub fn prepare_deploy(
    opts: &DeployOpts,
    cancel: Option<Arc<AtomicBool>>,
    on_collected: Option<ProgressHook>,
) -> Result<Deploy> {
    let (concurrent_stat, concurrent_hash) = resolve_concurrency(opts);
    debug!(
        "{} CONFIG:{:#?} (concurrent_stat={}, concurrent_hash={})",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts,
        concurrent_stat,
        concurrent_hash
    );

    let file_hasher = Hasher::new(HasherOpts {
        concurrent_hash,
        hash_algorithm: opts.hash_algorithm,
    })?;
    let file_normalizer = Normalizer::file(NormalizerOpts {
        asset_type: opts.file_asset_type.clone(),
    });
    let fn_stages = match &opts.functions_dir {
        Some(dir) => Some((
            Discoverer::new(DiscoverOpts {
                root: Some(std::path::absolute(dir).unwrap_or_else(|_| dir.clone())),
                concurrent_stat,
            })?,
            Hasher::new(HasherOpts {
                concurrent_hash,
                hash_algorithm: opts.fn_hash_algorithm,
            })?,
            Normalizer::function(NormalizerOpts {
                asset_type: opts.function_asset_type.clone(),
            }),
        )),
        None => None,
    };

    let dir = std::path::absolute(&opts.dir).map_err(|e| PipelineError::io(&opts.dir, e))?;
    let cancel = cancel.unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
    let mut deploy = Deploy::default();

    let files_stats = {
        let ctx = PipelineContext::with_cancel_flag(Arc::clone(&cancel));
        let mut collector = ManifestCollector::new(&mut deploy.files, &mut deploy.files_index);
        pipeline::run_file_pipeline(
            pipeline::walk_tree(&dir, opts.follow_links),
            &file_hasher,
            &file_normalizer,
            &mut collector,
            &ctx,
            progress_box(&on_collected),
        )?
    };
    info!(
        "Hashed {} files ({} distinct), skipped {}",
        files_stats.collected,
        deploy.files_index.len(),
        files_stats.skipped
    );

    if let Some((discoverer, fn_hasher, fn_normalizer)) = fn_stages {
        let names = pipeline::list_names(discoverer.root())?;
        let ctx = PipelineContext::with_cancel_flag(Arc::clone(&cancel));
        let mut collector =
            ManifestCollector::new(&mut deploy.functions, &mut deploy.functions_index);
        let fn_stats = pipeline::run_function_pipeline(
            names,
            &discoverer,
            &fn_hasher,
            &fn_normalizer,
            &mut collector,
            &ctx,
            progress_box(&on_collected),
        )?;
        info!(
            "Hashed {} functions, skipped {}",
            fn_stats.collected, fn_stats.skipped
        );
    }

    Ok(deploy)
}
