// src/magnet.rs

//! Magnet link parsing.
//!
//! Extracts the fields this crate cares about: the `btih` info hash (the
//! identity), plus display name and tracker list for consumers that want
//! them. Errors are scoped to a single reference string, so a caller
//! iterating over many candidates can skip failures individually.

use data_encoding::BASE32;
use thiserror::Error;
use url::Url;

use crate::info_hash::InfoHash;

/// Prefix of the exact-topic parameter carrying a BitTorrent v1 info hash.
const BTIH_PREFIX: &str = "urn:btih:";

#[derive(Debug, Error)]
pub enum MagnetError {
    #[error("invalid URI: {0}")]
    Uri(#[from] url::ParseError),
    #[error("not a magnet URI (scheme {0:?})")]
    NotMagnet(String),
    #[error("magnet URI has no {BTIH_PREFIX} exact topic")]
    MissingInfoHash,
    #[error("invalid info hash {0:?}: expected 40 hex or 32 base32 characters")]
    InvalidInfoHash(String),
}

/// Decoded form of a magnet reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    pub info_hash: InfoHash,
    pub display_name: Option<String>,
    pub trackers: Vec<String>,
}

impl MagnetLink {
    /// Parse a `magnet:?...` reference.
    pub fn parse(uri: &str) -> Result<Self, MagnetError> {
        let url = Url::parse(uri)?;
        if url.scheme() != "magnet" {
            return Err(MagnetError::NotMagnet(url.scheme().to_owned()));
        }

        let mut info_hash = None;
        let mut display_name = None;
        let mut trackers = Vec::new();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "xt" if info_hash.is_none() => {
                    if let Some(encoded) = value.strip_prefix(BTIH_PREFIX) {
                        info_hash = Some(decode_btih(encoded)?);
                    }
                }
                "dn" if display_name.is_none() => display_name = Some(value.into_owned()),
                "tr" => trackers.push(value.into_owned()),
                _ => {}
            }
        }

        Ok(MagnetLink {
            info_hash: info_hash.ok_or(MagnetError::MissingInfoHash)?,
            display_name,
            trackers,
        })
    }
}

/// Decode the hash part of an `urn:btih:` topic.
///
/// Hex is the common form; base32 appears in links produced by older clients
/// and is accepted case-insensitively.
fn decode_btih(encoded: &str) -> Result<InfoHash, MagnetError> {
    let invalid = || MagnetError::InvalidInfoHash(encoded.to_owned());
    match encoded.len() {
        40 => InfoHash::from_hex(encoded).map_err(|_| invalid()),
        32 => {
            let bytes = BASE32
                .decode(encoded.to_ascii_uppercase().as_bytes())
                .map_err(|_| invalid())?;
            let bytes: [u8; 20] = bytes.try_into().map_err(|_| invalid())?;
            Ok(InfoHash::new(bytes))
        }
        _ => Err(invalid()),
    }
}
