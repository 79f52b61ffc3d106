//! Load `.deployhash.toml` from the deploy directory (CLI only). Lib callers pass [`DeployOpts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{DeployOpts, PipelineError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeployToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    functions_dir: Option<String>,
    concurrent_stat: Option<usize>,
    concurrent_hash: Option<usize>,
    hash_algorithm: Option<String>,
    fn_hash_algorithm: Option<String>,
    file_asset_type: Option<String>,
    function_asset_type: Option<String>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if file missing or unreadable.
pub(crate) fn load_deploy_toml(dir: &Path) -> Option<DeployToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_deploy_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_deploy_toml(s: &str) -> Result<DeployToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($set:expr, $opts:expr, $set_field:ident => $opts_field:ident) => {
        if let Some(v) = $set.$set_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
/// A relative `functions_dir` is resolved against `dir`.
pub(crate) fn apply_file_to_opts(
    file: &DeployToml,
    dir: &Path,
    opts: &mut DeployOpts,
) -> Result<(), PipelineError> {
    let set = &file.settings;
    if let Some(ref p) = set.functions_dir {
        opts.functions_dir = Some(dir.join(PathBuf::from(p)));
    }
    if set.concurrent_stat.is_some() {
        opts.concurrent_stat = set.concurrent_stat;
    }
    if set.concurrent_hash.is_some() {
        opts.concurrent_hash = set.concurrent_hash;
    }
    if let Some(ref id) = set.hash_algorithm {
        opts.hash_algorithm = id.parse()?;
    }
    if let Some(ref id) = set.fn_hash_algorithm {
        opts.fn_hash_algorithm = id.parse()?;
    }
    if set.file_asset_type.is_some() {
        opts.file_asset_type = set.file_asset_type.clone();
    }
    if set.function_asset_type.is_some() {
        opts.function_asset_type = set.function_asset_type.clone();
    }
    apply_file_opt!(set, opts, follow_links => follow_links);
    apply_file_opt!(set, opts, verbose => verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashAlgorithm;

    #[test]
    fn settings_override_defaults() {
        let file = parse_deploy_toml(
            r#"
            [settings]
            functions_dir = "functions"
            concurrent_hash = 4
            hash_algorithm = "blake3"
            follow_links = true
            "#,
        )
        .unwrap();
        let mut opts = DeployOpts::default();
        apply_file_to_opts(&file, Path::new("/site"), &mut opts).unwrap();
        assert_eq!(opts.functions_dir, Some(PathBuf::from("/site/functions")));
        assert_eq!(opts.concurrent_hash, Some(4));
        assert_eq!(opts.concurrent_stat, None);
        assert_eq!(opts.hash_algorithm, HashAlgorithm::Blake3);
        assert_eq!(opts.fn_hash_algorithm, HashAlgorithm::Sha256);
        assert!(opts.follow_links);
    }

    #[test]
    fn unknown_algorithm_is_config_error() {
        let file = parse_deploy_toml("[settings]\nhash_algorithm = \"crc32\"\n").unwrap();
        let mut opts = DeployOpts::default();
        let err = apply_file_to_opts(&file, Path::new("."), &mut opts).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn missing_section_is_empty() {
        let file = parse_deploy_toml("").unwrap();
        let mut opts = DeployOpts::default();
        apply_file_to_opts(&file, Path::new("."), &mut opts).unwrap();
        assert_eq!(opts.functions_dir, None);
    }
}
