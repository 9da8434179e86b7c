// src/metainfo.rs

//! Identity extraction from bencoded `.torrent` files.
//!
//! Only the info hash matters here, so instead of decoding the whole
//! metainfo structure this module walks the top-level bencode dictionary,
//! finds the raw byte span of the `info` value and hashes it with SHA-1.
//! That span is exactly what trackers and magnet links hash, so the result
//! matches the identity used everywhere else in the BitTorrent ecosystem.

use std::fs;
use std::io;
use std::path::Path;

use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::info_hash::InfoHash;

#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("reading torrent file: {0}")]
    Io(#[from] io::Error),
    #[error("torrent file is not a bencoded dictionary")]
    NotADictionary,
    #[error("malformed bencode at byte {0}")]
    Malformed(usize),
    #[error("torrent file has no info dictionary")]
    MissingInfo,
}

/// Info hash of the torrent described by the file at `path`.
pub fn file_info_hash(path: impl AsRef<Path>) -> Result<InfoHash, MetainfoError> {
    let data = fs::read(path)?;
    info_hash(&data)
}

/// Info hash of a bencoded metainfo document.
pub fn info_hash(data: &[u8]) -> Result<InfoHash, MetainfoError> {
    if data.first() != Some(&b'd') {
        return Err(MetainfoError::NotADictionary);
    }
    let mut at = 1;
    while at < data.len() {
        if data[at] == b'e' {
            return Err(MetainfoError::MissingInfo);
        }
        let (key, value_at) = parse_string(data, at)?;
        let value_end = skip_value(data, value_at)?;
        if key == b"info" {
            let digest: [u8; 20] = Sha1::digest(&data[value_at..value_end]).into();
            return Ok(InfoHash::new(digest));
        }
        at = value_end;
    }
    Err(MetainfoError::Malformed(at))
}

/// Parse the length-prefixed byte string starting at `at`, returning its
/// contents and the index one past its final byte.
fn parse_string(data: &[u8], at: usize) -> Result<(&[u8], usize), MetainfoError> {
    if !data.get(at).is_some_and(u8::is_ascii_digit) {
        return Err(MetainfoError::Malformed(at));
    }
    let mut cursor = at;
    let mut len: usize = 0;
    while let Some(&b) = data.get(cursor) {
        match b {
            b'0'..=b'9' => {
                len = len
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(usize::from(b - b'0')))
                    .ok_or(MetainfoError::Malformed(at))?;
                cursor += 1;
            }
            b':' => {
                let start = cursor + 1;
                let end = start.checked_add(len).ok_or(MetainfoError::Malformed(at))?;
                if end > data.len() {
                    return Err(MetainfoError::Malformed(at));
                }
                return Ok((&data[start..end], end));
            }
            _ => return Err(MetainfoError::Malformed(cursor)),
        }
    }
    Err(MetainfoError::Malformed(at))
}

/// Skip one bencode value starting at `at`, returning the index one past it.
///
/// Containers are tracked with a depth counter rather than recursion, so a
/// pathologically nested file cannot blow the stack.
fn skip_value(data: &[u8], at: usize) -> Result<usize, MetainfoError> {
    let mut cursor = at;
    let mut depth = 0usize;
    loop {
        match data.get(cursor) {
            Some(b'i') => {
                cursor += 1;
                while data.get(cursor).is_some_and(|&b| b != b'e') {
                    cursor += 1;
                }
                if cursor >= data.len() {
                    return Err(MetainfoError::Malformed(at));
                }
                cursor += 1;
            }
            Some(b'0'..=b'9') => {
                let (_, end) = parse_string(data, cursor)?;
                cursor = end;
            }
            Some(b'l' | b'd') => {
                depth += 1;
                cursor += 1;
            }
            Some(b'e') if depth > 0 => {
                depth -= 1;
                cursor += 1;
            }
            _ => return Err(MetainfoError::Malformed(cursor)),
        }
        if depth == 0 {
            return Ok(cursor);
        }
    }
}
