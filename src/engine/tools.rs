//! Path, name and permission utilities

use std::path::{Path, PathBuf};

use crate::FileStat;
use crate::PipelineError;

/// Directory name macOS archivers use for resource forks.
pub const MACOS_RESOURCE_FORK_DIR: &str = "__MACOSX";

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Relative path as a string with forward slashes.
pub fn path_to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Last segment of a slash- or backslash-separated name.
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

/// Extension of the last segment including its dot (`.js`). A leading dot alone
/// (`.env`) is not an extension.
pub fn ext_name(name: &str) -> &str {
    component_ext(base_name(name))
}

/// Extension of a single path component, taken as-is (no separator splitting).
pub fn component_ext(component: &str) -> &str {
    match component.rfind('.') {
        Some(0) | None => "",
        Some(i) => &component[i..],
    }
}

/// True when a relative path has a hidden (dot-prefixed) segment or a macOS resource-fork dir.
pub fn is_hidden_path(relname: &str) -> bool {
    relname
        .split(['/', '\\'])
        .filter(|seg| !seg.is_empty())
        .any(|seg| seg.starts_with('.') || seg == MACOS_RESOURCE_FORK_DIR)
}

/// Canonical logical path for a relative name: forward slashes, no leading `./` or `/`,
/// no empty segments. Names containing `#` or `?` cannot be deployed.
pub fn normalize_path(relname: &str) -> Result<String, PipelineError> {
    if relname.contains('#') || relname.contains('?') {
        return Err(PipelineError::InvalidPath(relname.to_string()));
    }
    let segments: Vec<&str> = relname
        .split(['/', '\\'])
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    Ok(segments.join("/"))
}

/// Whether a file counts as executable: any execute bit for others, or the group/user bit
/// when the file belongs to the current group/user.
#[cfg(unix)]
pub fn is_executable(stat: &FileStat) -> bool {
    let is_group = stat.gid == 0 || stat.gid == unsafe { libc::getgid() };
    let is_user = stat.uid == 0 || stat.uid == unsafe { libc::getuid() };
    stat.mode & 0o001 != 0
        || (stat.mode & 0o010 != 0 && is_group)
        || (stat.mode & 0o100 != 0 && is_user)
}

/// No mode bits to inspect; every file is treated as executable.
#[cfg(not(unix))]
pub fn is_executable(_stat: &FileStat) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_name_matches_last_dot() {
        assert_eq!(ext_name("main.js"), ".js");
        assert_eq!(ext_name("dir.d/archive.tar.gz"), ".gz");
        assert_eq!(ext_name(".env"), "");
        assert_eq!(ext_name("binary"), "");
    }

    #[test]
    fn component_ext_keeps_backslashes() {
        assert_eq!(component_ext("a\\b.js"), ".js");
        assert_eq!(component_ext("v1.d\\run"), ".d\\run");
        assert_eq!(ext_name("v1.d\\run"), "");
    }

    #[cfg(unix)]
    #[test]
    fn owner_bits_count_for_owner() {
        let stat = FileStat {
            mode: 0o100,
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
            ..FileStat::default()
        };
        assert!(is_executable(&stat));
        let plain = FileStat {
            mode: 0o644,
            ..stat
        };
        assert!(!is_executable(&plain));
    }
}
