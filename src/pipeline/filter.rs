//! FileFilter: keep regular, non-hidden files from a pre-enumerated tree.

use crate::FileDescriptor;
use crate::engine::tools::is_hidden_path;

/// Stateless, order-preserving predicate stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFilter;

impl FileFilter {
    /// True iff the descriptor is a regular file whose relative path has no dot-prefixed
    /// segment and no macOS resource-fork directory.
    pub fn keep(desc: &FileDescriptor) -> bool {
        desc.is_file() && !is_hidden_path(&desc.relname)
    }

    /// Lazily filter a descriptor sequence, preserving order.
    pub fn apply<I>(files: I) -> impl Iterator<Item = FileDescriptor>
    where
        I: IntoIterator<Item = FileDescriptor>,
    {
        files.into_iter().filter(Self::keep)
    }
}
