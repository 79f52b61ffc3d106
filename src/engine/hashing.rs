//! File hashing utilities

use memmap2::Mmap;
use serde::Serialize;
use sha2::Digest;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use crate::PipelineError;
use crate::utils::config::HashingConsts;

/// Digest used for content addressing. Hex-encoded in manifests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hex digest of an in-memory buffer.
    pub fn digest_bytes(self, bytes: &[u8]) -> String {
        let mut state = DigestState::new(self);
        state.update(bytes);
        state.finalize_hex()
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(PipelineError::config(format!(
                "unsupported hash algorithm '{other}' (expected sha1, sha256 or blake3)"
            ))),
        }
    }
}

enum DigestState {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => DigestState::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => DigestState::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            DigestState::Sha1(h) => h.update(bytes),
            DigestState::Sha256(h) => h.update(bytes),
            DigestState::Blake3(h) => {
                h.update(bytes);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            DigestState::Sha1(h) => format!("{:x}", h.finalize()),
            DigestState::Sha256(h) => format!("{:x}", h.finalize()),
            DigestState::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Hash a file. Uses memory-mapped I/O for files above threshold, chunked reading otherwise.
/// Returns the hex digest and the number of bytes digested.
pub fn hash_file(
    path: &Path,
    size: u64,
    algorithm: HashAlgorithm,
) -> Result<(String, u64), PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut state = DigestState::new(algorithm);
    let mut digested = 0_u64;

    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // The source tree is not modified while a deploy is prepared.
        let mmap = unsafe { Mmap::map(&file).map_err(|e| PipelineError::io(path, e))? };
        state.update(&mmap);
        digested = mmap.len() as u64;
    } else {
        use std::io::Read;
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| PipelineError::io(path, e))?;
            if n == 0 {
                break;
            }
            state.update(&buffer[..n]);
            digested += n as u64;
        }
    }

    Ok((state.finalize_hex(), digested))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_known_inputs() {
        assert_eq!(
            HashAlgorithm::Sha1.digest_bytes(b""),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            HashAlgorithm::Sha1.digest_bytes(b"X"),
            "c032adc1ff629c9b66f22749ad667e6beadf144b"
        );
    }

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            HashAlgorithm::Sha256.digest_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn blake3_hex_is_64_chars() {
        let h = HashAlgorithm::Blake3.digest_bytes(b"hello");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_algorithm_ids() {
        assert_eq!("sha1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!("md5".parse::<HashAlgorithm>().unwrap_err().is_config());
    }
}
