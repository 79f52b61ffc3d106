//! Public types for the deploy pipeline: descriptors, manifests, options and results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::hashing::HashAlgorithm;
use crate::engine::tools::component_ext;

/// Filesystem entry kind. Only `File` survives past the filter / discovery stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Other,
}

impl EntryType {
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        if meta.is_file() {
            EntryType::File
        } else if meta.is_dir() {
            EntryType::Directory
        } else {
            EntryType::Other
        }
    }
}

/// Runtime kind for a deployable function bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Packaged archive or interpreted script (`.zip`, `.js`).
    Js,
    /// Executable binary, recognized by mode bits.
    Go,
}

/// Metadata captured at stat time (size, mode, mtime, owner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub size: u64,
    /// Unix permission bits. 0 on platforms without them.
    pub mode: u32,
    pub mtime_ns: i64,
    pub uid: u32,
    pub gid: u32,
}

impl FileStat {
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        let mtime_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        let (mode, uid, gid) = owner_and_mode(meta);
        FileStat {
            size: meta.len(),
            mode,
            mtime_ns,
            uid,
            gid,
        }
    }
}

#[cfg(unix)]
fn owner_and_mode(meta: &std::fs::Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (meta.mode(), meta.uid(), meta.gid())
}

#[cfg(not(unix))]
fn owner_and_mode(_meta: &std::fs::Metadata) -> (u32, u32, u32) {
    (0, 0, 0)
}

/// The unit flowing through the pipeline. Stages add `hash`, `asset_type` and
/// `normalized_path` as it moves downstream.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Base directory the walk started from. Shared by every descriptor of a run.
    pub root: Arc<Path>,
    /// Absolute path on disk.
    pub filepath: PathBuf,
    /// Path relative to `root`.
    pub relname: String,
    pub basename: String,
    /// Extension including the leading dot (`.js`), or empty.
    pub extname: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub runtime: Option<Runtime>,
    pub stat: FileStat,
    pub asset_type: Option<String>,
    pub normalized_path: Option<String>,
    pub hash: Option<String>,
}

impl FileDescriptor {
    /// Build a descriptor for `relname` under `root` from already-read metadata.
    pub fn new(root: Arc<Path>, relname: &str, meta: &std::fs::Metadata) -> Self {
        let filepath = root.join(relname);
        Self::at(root, filepath, relname.to_string(), meta)
    }

    /// Build a descriptor for the entry that was actually stat'd at `filepath`. Base name and
    /// extension come from its last component, so a backslash stays part of a unix file name.
    pub fn at(
        root: Arc<Path>,
        filepath: PathBuf,
        relname: String,
        meta: &std::fs::Metadata,
    ) -> Self {
        let basename = filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        FileDescriptor {
            extname: component_ext(&basename).to_string(),
            basename,
            relname,
            filepath,
            root,
            entry_type: EntryType::from_metadata(meta),
            runtime: None,
            stat: FileStat::from_metadata(meta),
            asset_type: None,
            normalized_path: None,
            hash: None,
        }
    }

    /// Stat `root/relname` and build a descriptor (following symlinks, like `stat(2)`).
    pub fn stat(root: Arc<Path>, relname: &str) -> crate::Result<Self> {
        let filepath = root.join(relname);
        let meta =
            std::fs::metadata(&filepath).map_err(|e| crate::PipelineError::io(&filepath, e))?;
        Ok(Self::new(root, relname, &meta))
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }
}

/// Logical path → content digest. Last writer wins on a repeated logical path.
pub type Manifest = BTreeMap<String, String>;

/// Content digest → every descriptor sharing that content.
pub type HashIndex = BTreeMap<String, Vec<FileDescriptor>>;

/// Library options for [`prepare_deploy`](crate::prepare_deploy).
#[derive(Clone, Debug)]
pub struct DeployOpts {
    /// Directory of static files to deploy.
    pub dir: PathBuf,
    /// Directory whose top-level entries are candidate function bundles.
    pub functions_dir: Option<PathBuf>,
    /// Max concurrent stats. When None, derived from available threads.
    pub concurrent_stat: Option<usize>,
    /// Max concurrent digests. When None, derived from available threads and the FD limit.
    pub concurrent_hash: Option<usize>,
    /// Digest used for static files.
    pub hash_algorithm: HashAlgorithm,
    /// Digest used for function bundles.
    pub fn_hash_algorithm: HashAlgorithm,
    pub file_asset_type: Option<String>,
    pub function_asset_type: Option<String>,
    pub follow_links: bool,
    /// Show a progress counter (CLI).
    pub verbose: bool,
}

impl Default for DeployOpts {
    fn default() -> Self {
        DeployOpts {
            dir: PathBuf::from("."),
            functions_dir: None,
            concurrent_stat: None,
            concurrent_hash: None,
            hash_algorithm: HashAlgorithm::Sha1,
            fn_hash_algorithm: HashAlgorithm::Sha256,
            file_asset_type: None,
            function_asset_type: None,
            follow_links: false,
            verbose: false,
        }
    }
}

/// Manifests and digest indexes for one deploy run.
#[derive(Clone, Debug, Default)]
pub struct Deploy {
    pub files: Manifest,
    pub files_index: HashIndex,
    pub functions: Manifest,
    pub functions_index: HashIndex,
}

/// Serializable summary of a [`Deploy`]: manifests plus digest → relative names.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub files: Manifest,
    pub functions: Manifest,
    pub sha_map: BTreeMap<String, Vec<String>>,
    pub fn_sha_map: BTreeMap<String, Vec<String>>,
}

impl DeployReport {
    /// Number of distinct contents an uploader would send.
    pub fn upload_count(&self) -> usize {
        self.sha_map.len() + self.fn_sha_map.len()
    }
}

fn relnames_by_hash(index: &HashIndex) -> BTreeMap<String, Vec<String>> {
    index
        .iter()
        .map(|(hash, descs)| {
            let mut names: Vec<String> = descs.iter().map(|d| d.relname.clone()).collect();
            names.sort();
            (hash.clone(), names)
        })
        .collect()
}

impl From<&Deploy> for DeployReport {
    fn from(d: &Deploy) -> Self {
        DeployReport {
            files: d.files.clone(),
            functions: d.functions.clone(),
            sha_map: relnames_by_hash(&d.files_index),
            fn_sha_map: relnames_by_hash(&d.functions_index),
        }
    }
}
