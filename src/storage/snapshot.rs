//! Binary snapshots of summaries for the persistence layer.
//!
//! Snapshots use postcard, so a half-built month can be written out and
//! rehydrated later without replaying its observations.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SummaryResult;

pub fn encode<T: Serialize>(value: &T) -> SummaryResult<Vec<u8>> {
    Ok(postcard::to_allocvec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> SummaryResult<T> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Encode `value` and write it to `path`, replacing any existing file
pub fn save<T: Serialize>(value: &T, path: impl AsRef<Path>) -> SummaryResult<()> {
    let bytes = encode(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> SummaryResult<T> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}
