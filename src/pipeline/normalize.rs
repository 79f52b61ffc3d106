//! Normalizers: assign the asset type and the logical path used as the manifest key.

use crate::engine::tools::normalize_path;
use crate::utils::config::{DEFAULT_FILE_ASSET_TYPE, DEFAULT_FUNCTION_ASSET_TYPE};
use crate::{FileDescriptor, Result};

#[derive(Clone, Debug, Default)]
pub struct NormalizerOpts {
    /// Overrides the variant's default asset type.
    pub asset_type: Option<String>,
}

/// One-to-one, order-preserving transform. Runs on the collector's thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalizer {
    /// Logical path is the base name without extension: one function per base name,
    /// whatever its packaging (`hello.js` and `hello.zip` both map to `hello`).
    Function { asset_type: String },
    /// Logical path is the normalized relative path.
    File { asset_type: String },
}

impl Normalizer {
    pub fn function(opts: NormalizerOpts) -> Self {
        Normalizer::Function {
            asset_type: opts
                .asset_type
                .unwrap_or_else(|| DEFAULT_FUNCTION_ASSET_TYPE.to_string()),
        }
    }

    pub fn file(opts: NormalizerOpts) -> Self {
        Normalizer::File {
            asset_type: opts
                .asset_type
                .unwrap_or_else(|| DEFAULT_FILE_ASSET_TYPE.to_string()),
        }
    }

    pub fn asset_type(&self) -> &str {
        match self {
            Normalizer::Function { asset_type } | Normalizer::File { asset_type } => asset_type,
        }
    }

    /// Logical path this variant derives for `desc`.
    pub fn logical_path(&self, desc: &FileDescriptor) -> Result<String> {
        match self {
            Normalizer::Function { .. } => Ok(desc
                .basename
                .strip_suffix(desc.extname.as_str())
                .unwrap_or(&desc.basename)
                .to_string()),
            Normalizer::File { .. } => normalize_path(&desc.relname),
        }
    }

    pub fn normalize(&self, mut desc: FileDescriptor) -> Result<FileDescriptor> {
        desc.normalized_path = Some(self.logical_path(&desc)?);
        desc.asset_type = Some(self.asset_type().to_string());
        Ok(desc)
    }
}
