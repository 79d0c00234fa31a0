//! Streamed file digests.

use crate::model::{Status, TestResult};
use md5::Md5;
use serde::Deserialize;
use serde_json::json;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

pub const CHECKSUM: &str = "Checksum Validation";

/// Bytes read per `update` call; memory use is constant in file size.
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
#[error("unsupported hash algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnsupportedAlgorithm;

    /// Accepts `md5`, `sha1`, `sha256`, `sha512` in any case, with or
    /// without dashes (`SHA-256`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_algorithm() -> String {
    "md5".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksumParams {
    pub path: PathBuf,
    pub expected_hash: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

/// Lower-case hex digest of the file at `path`, read in fixed-size chunks.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
    let file = File::open(path)?;
    match algorithm {
        HashAlgorithm::Md5 => digest_reader::<Md5, _>(file),
        HashAlgorithm::Sha1 => digest_reader::<Sha1, _>(file),
        HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(file),
        HashAlgorithm::Sha512 => digest_reader::<Sha512, _>(file),
    }
}

/// Pass when the file digest equals `expected_hash` (hex, case-insensitive).
pub fn checksum(params: &ChecksumParams) -> TestResult {
    let started = Instant::now();
    let path = params.path.display().to_string();

    let algorithm = match params.algorithm.parse::<HashAlgorithm>() {
        Ok(algorithm) => algorithm,
        Err(e) => {
            return TestResult::error(CHECKSUM, started, e.to_string())
                .with_details(json!({ "path": path, "algorithm": params.algorithm }));
        }
    };

    let actual = match hash_file(&params.path, algorithm) {
        Ok(actual) => actual,
        Err(e) => {
            return TestResult::error(CHECKSUM, started, format!("Cannot hash {path}: {e}"))
                .with_details(json!({ "path": path, "algorithm": algorithm.as_str() }));
        }
    };

    let matches = actual.eq_ignore_ascii_case(params.expected_hash.trim());

    TestResult::since(
        CHECKSUM,
        if matches { Status::Passed } else { Status::Failed },
        started,
        format!("Hash {}", if matches { "matches" } else { "mismatch" }),
    )
    .with_details(json!({
        "path": path,
        "expected": params.expected_hash,
        "actual": actual,
        "algorithm": algorithm.as_str(),
    }))
}
