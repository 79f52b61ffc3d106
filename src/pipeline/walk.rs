//! Input side of the pipeline: directory walks that produce candidates, and the feed threads
//! that push them into the first bounded channel.

use crossbeam_channel::Sender;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::tools::{path_relative_to, path_to_slash_string};
use crate::{FileDescriptor, PipelineError, Result};

use super::context::PipelineContext;
use super::filter::FileFilter;

/// Convert a walkdir result into a descriptor for the file-tree entry point.
pub fn to_descriptor_walkdir(
    root: &Arc<Path>,
    r: std::result::Result<walkdir::DirEntry, walkdir::Error>,
) -> Result<FileDescriptor> {
    match r {
        Ok(entry) => {
            let meta = entry
                .metadata()
                .map_err(|e| walk_error(e, Some(entry.path())))?;
            let rel = path_relative_to(entry.path(), root)
                .unwrap_or_else(|| entry.path().to_path_buf());
            Ok(FileDescriptor::at(
                Arc::clone(root),
                entry.path().to_path_buf(),
                path_to_slash_string(&rel),
                &meta,
            ))
        }
        Err(err) => {
            let path = err.path().map(Path::to_path_buf);
            Err(walk_error(err, path.as_deref()))
        }
    }
}

fn walk_error(err: walkdir::Error, path: Option<&Path>) -> PipelineError {
    let path = path.map(PathBuf::from).unwrap_or_default();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    PipelineError::io(path, source)
}

/// Walk every entry under `root` (root itself excluded). Lazy; directories are yielded too and
/// left for the filter stage to drop.
pub fn walk_tree(
    root: &Path,
    follow_links: bool,
) -> impl Iterator<Item = Result<FileDescriptor>> + Send + use<> {
    let shared: Arc<Path> = Arc::from(root);
    walkdir::WalkDir::new(root)
        .follow_links(follow_links)
        .min_depth(1)
        .into_iter()
        .map(move |r| to_descriptor_walkdir(&shared, r))
}

/// Top-level entry names of a functions directory, sorted. Each is a candidate for the discoverer.
pub fn list_names(dir: &Path) -> Result<Vec<String>> {
    let read = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Feed names into the discoverer's channel. Returns how many were admitted.
pub fn spawn_name_feed<I>(
    names: I,
    name_tx: Sender<String>,
    ctx: &PipelineContext,
) -> JoinHandle<usize>
where
    I: IntoIterator<Item = String> + Send + 'static,
    I::IntoIter: Send,
{
    let ctx = ctx.clone();
    thread::spawn(move || {
        let mut count = 0_usize;
        for name in names {
            if ctx.is_stopped() || name_tx.send(name).is_err() {
                break;
            }
            count += 1;
        }
        debug!("name feed done: {} admitted", count);
        count
    })
}

/// Run the file filter over a pre-enumerated sequence and feed survivors to the hasher's channel.
/// An `Err` item (e.g. an unreadable directory during the walk) is fatal. Returns how many were admitted.
pub fn spawn_file_feed<I>(
    files: I,
    desc_tx: Sender<FileDescriptor>,
    ctx: &PipelineContext,
) -> JoinHandle<usize>
where
    I: IntoIterator<Item = Result<FileDescriptor>> + Send + 'static,
    I::IntoIter: Send,
{
    let ctx = ctx.clone();
    thread::spawn(move || {
        let mut count = 0_usize;
        for item in files {
            if ctx.is_stopped() {
                break;
            }
            let desc = match item {
                Ok(desc) => desc,
                Err(err) => {
                    ctx.fail(err);
                    break;
                }
            };
            if !FileFilter::keep(&desc) {
                if desc.is_file() {
                    debug!("skipping hidden path {}", desc.relname);
                    ctx.note_skipped();
                }
                continue;
            }
            if desc_tx.send(desc).is_err() {
                break;
            }
            count += 1;
        }
        debug!("file feed done: {} admitted", count);
        count
    })
}
