use crossbeam_channel::Receiver;
use log::debug;
use std::thread::JoinHandle;

use crate::{FileDescriptor, PipelineError, Result};

use super::collector::ManifestCollector;
use super::context::{PipelineContext, PipelineStats, stage_channel};
use super::discover::Discoverer;
use super::hasher::Hasher;
use super::normalize::Normalizer;
use super::walk::{spawn_file_feed, spawn_name_feed};

/// Called with the number of descriptors just collected (progress display).
pub type OnCollected = Option<Box<dyn Fn(usize) + Send>>;

/// Function entry point: names → Discoverer pool → Hasher pool → normalize + collect.
/// The calling thread is the single consumer that writes the collector's containers.
/// Stages are constructed (and validated) by the caller before anything runs.
pub fn run_function_pipeline<I>(
    names: I,
    discoverer: &Discoverer,
    hasher: &Hasher,
    normalizer: &Normalizer,
    collector: &mut ManifestCollector<'_>,
    ctx: &PipelineContext,
    on_collected: OnCollected,
) -> Result<PipelineStats>
where
    I: IntoIterator<Item = String> + Send + 'static,
    I::IntoIter: Send,
{
    let (name_tx, name_rx) = stage_channel::<String>(discoverer.concurrent_stat());
    let (desc_tx, desc_rx) = stage_channel::<FileDescriptor>(hasher.concurrent_hash());
    let (hashed_tx, hashed_rx) = stage_channel::<FileDescriptor>(hasher.concurrent_hash());

    let feed_handle = spawn_name_feed(names, name_tx, ctx);
    let stat_handles = discoverer.spawn(name_rx, &desc_tx, ctx);
    // Dropping the last sender closes the channel so the next pool exits.
    drop(desc_tx);
    let hash_handles = hasher.spawn(desc_rx, &hashed_tx, ctx);
    drop(hashed_tx);

    let collected =
        drain_into_collector(hashed_rx, normalizer, collector, ctx, on_collected.as_deref());

    let admitted = join_feed(feed_handle)?;
    join_stage("stat", stat_handles)?;
    join_stage("hash", hash_handles)?;
    debug!(
        "function pipeline drained: {} admitted, {} collected",
        admitted, collected
    );
    ctx.finish(collected)
}

/// File-tree entry point: descriptors → FileFilter → Hasher pool → normalize + collect.
pub fn run_file_pipeline<I>(
    files: I,
    hasher: &Hasher,
    normalizer: &Normalizer,
    collector: &mut ManifestCollector<'_>,
    ctx: &PipelineContext,
    on_collected: OnCollected,
) -> Result<PipelineStats>
where
    I: IntoIterator<Item = Result<FileDescriptor>> + Send + 'static,
    I::IntoIter: Send,
{
    let (desc_tx, desc_rx) = stage_channel::<FileDescriptor>(hasher.concurrent_hash());
    let (hashed_tx, hashed_rx) = stage_channel::<FileDescriptor>(hasher.concurrent_hash());

    let feed_handle = spawn_file_feed(files, desc_tx, ctx);
    let hash_handles = hasher.spawn(desc_rx, &hashed_tx, ctx);
    drop(hashed_tx);

    let collected =
        drain_into_collector(hashed_rx, normalizer, collector, ctx, on_collected.as_deref());

    let admitted = join_feed(feed_handle)?;
    join_stage("hash", hash_handles)?;
    debug!(
        "file pipeline drained: {} admitted, {} collected",
        admitted, collected
    );
    ctx.finish(collected)
}

/// Consume hashed descriptors until every hash worker is gone. Stops writing once the run
/// stops; returning drops the receiver so blocked producers see the channel close.
fn drain_into_collector(
    hashed_rx: Receiver<FileDescriptor>,
    normalizer: &Normalizer,
    collector: &mut ManifestCollector<'_>,
    ctx: &PipelineContext,
    on_collected: Option<&(dyn Fn(usize) + Send)>,
) -> usize {
    let mut collected = 0_usize;
    while let Ok(desc) = hashed_rx.recv() {
        if ctx.is_stopped() {
            break;
        }
        match normalizer
            .normalize(desc)
            .and_then(|desc| collector.collect(desc))
        {
            Ok(()) => {
                collected += 1;
                if let Some(f) = on_collected {
                    f(1);
                }
            }
            Err(err) => {
                ctx.fail(err);
                break;
            }
        }
    }
    collected
}

fn join_feed(handle: JoinHandle<usize>) -> Result<usize> {
    handle
        .join()
        .map_err(|_| PipelineError::WorkerPanicked { stage: "feed" })
}

/// Join every worker of a stage, even after one has panicked.
fn join_stage(stage: &'static str, handles: Vec<JoinHandle<()>>) -> Result<()> {
    let mut panicked = false;
    for h in handles {
        panicked |= h.join().is_err();
    }
    if panicked {
        return Err(PipelineError::WorkerPanicked { stage });
    }
    Ok(())
}
