// src/info_hash.rs

use std::fmt;

use thiserror::Error;

/// Errors from decoding an [`InfoHash`] out of its hex form.
#[derive(Debug, Error, PartialEq)]
pub enum InfoHashError {
    #[error("expected 40 hex characters, got {0}")]
    BadLength(usize),
    #[error("invalid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

/// 20-byte SHA-1 info hash naming a torrent.
///
/// This is the key of every map in the crate: a descriptor file and a magnet
/// reference that describe the same torrent resolve to the same `InfoHash`,
/// no matter which form it was discovered through.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    pub const fn new(bytes: [u8; 20]) -> Self {
        InfoHash(bytes)
    }

    /// Decode the canonical 40-character hex form, either case.
    pub fn from_hex(s: &str) -> Result<Self, InfoHashError> {
        if s.len() != 40 {
            return Err(InfoHashError::BadLength(s.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(InfoHash(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for InfoHash {
    fn from(bytes: [u8; 20]) -> Self {
        InfoHash(bytes)
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}
