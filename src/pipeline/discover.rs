//! Discoverer: stat candidate names under a root and keep recognized function bundles.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::tools::{is_executable, path_relative_to};
use crate::utils::config::SCRIPT_EXTENSIONS;
use crate::{FileDescriptor, PipelineError, Result, Runtime};

use super::context::PipelineContext;

/// Options for [`Discoverer::new`]. Both fields are required.
#[derive(Clone, Debug, Default)]
pub struct DiscoverOpts {
    pub root: Option<PathBuf>,
    pub concurrent_stat: usize,
}

/// Stats names relative to `root` with a bounded pool and tags the runtime kind.
/// Directories, other entries and unsupported files are dropped silently; a failed stat is fatal.
#[derive(Clone, Debug)]
pub struct Discoverer {
    root: Arc<Path>,
    concurrent_stat: usize,
}

impl Discoverer {
    pub fn new(opts: DiscoverOpts) -> Result<Self> {
        let root = match opts.root {
            Some(root) if !root.as_os_str().is_empty() => root,
            _ => return Err(PipelineError::config("discoverer requires a root directory")),
        };
        if opts.concurrent_stat == 0 {
            return Err(PipelineError::config(
                "discoverer requires a positive concurrent_stat",
            ));
        }
        Ok(Discoverer {
            root: Arc::from(root),
            concurrent_stat: opts.concurrent_stat,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn concurrent_stat(&self) -> usize {
        self.concurrent_stat
    }

    /// Stat one name. `Ok(None)` is a silent drop.
    pub fn discover(&self, name: &str) -> Result<Option<FileDescriptor>> {
        let filepath = self.root.join(name);
        let meta = std::fs::metadata(&filepath).map_err(|e| PipelineError::io(&filepath, e))?;
        let relname = path_relative_to(&filepath, &self.root)
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let mut desc = FileDescriptor::at(Arc::clone(&self.root), filepath, relname, &meta);

        if !desc.is_file() {
            return Ok(None);
        }
        desc.runtime = classify_runtime(&desc);
        Ok(desc.runtime.map(|_| desc))
    }

    /// Spawn `concurrent_stat` workers draining `name_rx` into `desc_tx`, unordered.
    /// Workers exit when the input closes, the output is dropped, or the run stops.
    pub fn spawn(
        &self,
        name_rx: Receiver<String>,
        desc_tx: &Sender<FileDescriptor>,
        ctx: &PipelineContext,
    ) -> Vec<JoinHandle<()>> {
        debug!("Spawning {} stat workers", self.concurrent_stat);
        (0..self.concurrent_stat)
            .map(|_| {
                let this = self.clone();
                let name_rx = name_rx.clone();
                let desc_tx = desc_tx.clone();
                let ctx = ctx.clone();
                thread::spawn(move || this.worker_loop(name_rx, desc_tx, ctx))
            })
            .collect()
    }

    fn worker_loop(
        &self,
        name_rx: Receiver<String>,
        desc_tx: Sender<FileDescriptor>,
        ctx: PipelineContext,
    ) {
        while let Ok(name) = name_rx.recv() {
            if ctx.is_stopped() {
                break;
            }
            match self.discover(&name) {
                Ok(Some(desc)) => {
                    if desc_tx.send(desc).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("skipping {}: not a deployable function", name);
                    ctx.note_skipped();
                }
                Err(err) => {
                    ctx.fail(err);
                    break;
                }
            }
        }
    }
}

/// Script/archive extension → `Js`; executable bits → `Go`; anything else is unsupported.
pub fn classify_runtime(desc: &FileDescriptor) -> Option<Runtime> {
    if SCRIPT_EXTENSIONS.contains(&desc.extname.as_str()) {
        Some(Runtime::Js)
    } else if is_executable(&desc.stat) {
        Some(Runtime::Go)
    } else {
        None
    }
}
