//! Surrogate keys
//!
//! A surrogate key stands in for an object's identity inside one identity
//! table. Keys are small integers handed out in first-seen order, so the
//! encoded form stays compact.
//!
//! ## Wire format
//!
//! A key is always exactly 4 bytes: a big-endian two's-complement `i32`.
//! The first key ever assigned in a fresh table is `0`.

use crate::error::{Cause, Error, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Encoded length of a surrogate key in bytes.
pub const KEY_ENCODED_LEN: usize = 4;

/// Integer standing in for an object's identity within one identity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurrogateKey(i32);

impl SurrogateKey {
    /// The first key assigned by a fresh table.
    pub const FIRST: SurrogateKey = SurrogateKey(0);

    /// Wrap a raw key value.
    pub const fn new(value: i32) -> Self {
        SurrogateKey(value)
    }

    /// Raw key value.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Key for a zero-based allocation index.
    ///
    /// Returns `None` once the index no longer fits in an `i32`.
    pub fn from_index(index: usize) -> Option<Self> {
        i32::try_from(index).ok().map(SurrogateKey)
    }

    /// The key following this one, if any.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(SurrogateKey)
    }

    /// Canonical 4-byte big-endian encoding.
    pub const fn to_bytes(self) -> [u8; KEY_ENCODED_LEN] {
        self.0.to_be_bytes()
    }

    /// Decode a key from its canonical encoding.
    ///
    /// # Errors
    ///
    /// Returns an unmarshalling failure if `bytes` is not exactly 4 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; KEY_ENCODED_LEN] = bytes
            .try_into()
            .map_err(|_| Error::unmarshalling(Cause::MalformedKey { len: bytes.len() }))?;
        Ok(SurrogateKey(i32::from_be_bytes(raw)))
    }

    /// Write the canonical encoding to a byte sink.
    pub fn write_to(self, sink: &mut dyn Write) -> Result<()> {
        sink.write_i32::<BigEndian>(self.0)
            .map_err(Error::marshalling)
    }

    /// Read a key in canonical encoding from a byte source.
    pub fn read_from(source: &mut dyn Read) -> Result<Self> {
        source
            .read_i32::<BigEndian>()
            .map(SurrogateKey)
            .map_err(Error::unmarshalling)
    }
}

impl From<i32> for SurrogateKey {
    fn from(value: i32) -> Self {
        SurrogateKey(value)
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
