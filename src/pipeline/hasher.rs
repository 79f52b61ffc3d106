//! Hasher: digest each descriptor's content with a bounded, unordered worker pool.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread::{self, JoinHandle};

use crate::engine::hashing::{HashAlgorithm, hash_file};
use crate::{FileDescriptor, PipelineError, Result};

use super::context::PipelineContext;

/// Options for [`Hasher::new`]. `concurrent_hash` is required and must be positive.
#[derive(Clone, Copy, Debug, Default)]
pub struct HasherOpts {
    pub concurrent_hash: usize,
    pub hash_algorithm: HashAlgorithm,
}

#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    concurrent_hash: usize,
    algorithm: HashAlgorithm,
}

impl Hasher {
    pub fn new(opts: HasherOpts) -> Result<Self> {
        if opts.concurrent_hash == 0 {
            return Err(PipelineError::config(
                "hasher requires a positive concurrent_hash",
            ));
        }
        Ok(Hasher {
            concurrent_hash: opts.concurrent_hash,
            algorithm: opts.hash_algorithm,
        })
    }

    pub fn concurrent_hash(&self) -> usize {
        self.concurrent_hash
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Read the whole file at `filepath` and attach its hex digest. The source is not modified.
    /// A byte count differing from the stat size means the file changed underneath us.
    pub fn hash(&self, mut desc: FileDescriptor) -> Result<FileDescriptor> {
        let (digest, digested) = hash_file(&desc.filepath, desc.stat.size, self.algorithm)?;
        if digested != desc.stat.size {
            return Err(PipelineError::Hash {
                path: desc.filepath,
                reason: format!(
                    "read {} bytes but stat reported {}; file changed while hashing",
                    digested, desc.stat.size
                ),
            });
        }
        desc.hash = Some(digest);
        Ok(desc)
    }

    /// Spawn `concurrent_hash` workers draining `desc_rx` into `hashed_tx`. Completion order
    /// is unordered: a small file queued after a large one may come out first.
    pub fn spawn(
        &self,
        desc_rx: Receiver<FileDescriptor>,
        hashed_tx: &Sender<FileDescriptor>,
        ctx: &PipelineContext,
    ) -> Vec<JoinHandle<()>> {
        debug!(
            "Spawning {} {} hash workers",
            self.concurrent_hash, self.algorithm
        );
        (0..self.concurrent_hash)
            .map(|_| {
                let this = *self;
                let desc_rx = desc_rx.clone();
                let hashed_tx = hashed_tx.clone();
                let ctx = ctx.clone();
                thread::spawn(move || this.worker_loop(desc_rx, hashed_tx, ctx))
            })
            .collect()
    }

    fn worker_loop(
        &self,
        desc_rx: Receiver<FileDescriptor>,
        hashed_tx: Sender<FileDescriptor>,
        ctx: PipelineContext,
    ) {
        while let Ok(desc) = desc_rx.recv() {
            if ctx.is_stopped() {
                break;
            }
            match self.hash(desc) {
                Ok(hashed) => {
                    if hashed_tx.send(hashed).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    ctx.fail(err);
                    break;
                }
            }
        }
    }
}
