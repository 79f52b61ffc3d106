//! ManifestCollector: the single writer for a run's manifest and digest index.

use log::debug;

use crate::{FileDescriptor, HashIndex, Manifest, PipelineError, Result};

/// Terminal sink. Borrows the caller's containers mutably for the whole run, so only one
/// collector (on one thread) can write them.
pub struct ManifestCollector<'a> {
    manifest: &'a mut Manifest,
    hash_index: &'a mut HashIndex,
    collected: usize,
}

impl<'a> ManifestCollector<'a> {
    pub fn new(manifest: &'a mut Manifest, hash_index: &'a mut HashIndex) -> Self {
        ManifestCollector {
            manifest,
            hash_index,
            collected: 0,
        }
    }

    /// Write `manifest[normalized_path] = hash` (last writer wins) and append the descriptor
    /// to `hash_index[hash]`.
    pub fn collect(&mut self, desc: FileDescriptor) -> Result<()> {
        let (Some(logical), Some(hash)) = (desc.normalized_path.clone(), desc.hash.clone()) else {
            return Err(PipelineError::Incomplete(desc.filepath));
        };
        if let Some(previous) = self.manifest.insert(logical, hash.clone())
            && previous != hash
        {
            debug!(
                "{} replaced an earlier entry for the same logical path",
                desc.relname
            );
        }
        self.hash_index.entry(hash).or_default().push(desc);
        self.collected += 1;
        Ok(())
    }

    pub fn collected(&self) -> usize {
        self.collected
    }
}
