use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{Error, IoResultExt, Result};

/// read size used when streaming a file through a digest
pub const BLOCK_SIZE: usize = 8192;

/// digest kinds the repository recognizes, keyed by hex length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
}

impl HashKind {
    /// length of the hex encoding
    pub fn hex_len(self) -> usize {
        match self {
            HashKind::Md5 => 32,
            HashKind::Sha1 => 40,
            HashKind::Sha256 => 64,
        }
    }

    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(HashKind::Md5),
            40 => Some(HashKind::Sha1),
            64 => Some(HashKind::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKind::Md5 => write!(f, "md5"),
            HashKind::Sha1 => write!(f, "sha1"),
            HashKind::Sha256 => write!(f, "sha256"),
        }
    }
}

/// check whether `s` is a well-formed hash
///
/// with `api_key` set only the 64 character form is accepted, which is also
/// the shape of an api key. matching is anchored and case-insensitive.
pub fn is_valid_hash(s: &str, api_key: bool) -> bool {
    let kind = match HashKind::from_hex_len(s.len()) {
        Some(kind) => kind,
        None => return false,
    };
    if api_key && kind != HashKind::Sha256 {
        return false;
    }
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// MD5 of the file at `path`, lowercase hex
pub fn compute_file_hash(path: &Path) -> Result<String> {
    compute_file_hash_with(path, HashKind::Md5, BLOCK_SIZE)
}

/// digest of the file at `path` using any recognized kind
pub fn compute_file_hash_with(path: &Path, kind: HashKind, block_size: usize) -> Result<String> {
    let file = File::open(path).with_path(path)?;
    hash_reader(file, kind, block_size).with_path(path)
}

/// fold a reader into a digest block by block
///
/// the block size only affects throughput, never the result.
pub fn hash_reader<R: Read>(
    reader: R,
    kind: HashKind,
    block_size: usize,
) -> std::io::Result<String> {
    match kind {
        HashKind::Md5 => digest_blocks::<Md5, R>(reader, block_size),
        HashKind::Sha1 => digest_blocks::<Sha1, R>(reader, block_size),
        HashKind::Sha256 => digest_blocks::<Sha256, R>(reader, block_size),
    }
}

fn digest_blocks<D: Digest, R: Read>(mut reader: R, block_size: usize) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; block_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// a validated file identity (md5, sha1 or sha256 hex)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FileHash(String);

impl FileHash {
    /// validate and wrap a hash string
    pub fn parse(s: &str) -> Result<Self> {
        if !is_valid_hash(s, false) {
            return Err(Error::InvalidIdentity(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// hash the file at `path` with MD5
    pub fn of_file(path: &Path) -> Result<Self> {
        compute_file_hash(path).map(Self)
    }

    /// MD5 of bytes already in memory
    pub fn of_bytes(content: &[u8]) -> Self {
        Self(hex::encode(Md5::digest(content)))
    }

    pub fn kind(&self) -> HashKind {
        // length was checked in parse
        HashKind::from_hex_len(self.0.len()).unwrap_or(HashKind::Sha256)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FileHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileHash({}:{})", self.kind(), &self.0[..12])
    }
}

impl AsRef<str> for FileHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for FileHash {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FileHash {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
