//! Size limits for untrusted encoded input
//!
//! Length prefixes read from a stream are checked against these limits
//! before anything is allocated. Violations are reported as
//! `Cause::LimitExceeded`.

use crate::error::Cause;

/// Default maximum type name length in bytes.
pub const DEFAULT_MAX_TYPE_NAME_BYTES: usize = 1024;

/// Default maximum native payload length in bytes (64MB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Size limits for encoded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum type name length in bytes (default: 1024)
    pub max_type_name_bytes: usize,

    /// Maximum native payload length in bytes (default: 64MB)
    pub max_payload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_type_name_bytes: DEFAULT_MAX_TYPE_NAME_BYTES,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl Limits {
    /// Check a type name length.
    pub fn check_type_name(&self, len: usize) -> Result<(), Cause> {
        check("type name", len, self.max_type_name_bytes)
    }

    /// Check a payload length.
    pub fn check_payload(&self, len: usize) -> Result<(), Cause> {
        check("payload", len, self.max_payload_bytes)
    }
}

fn check(what: &'static str, len: usize, max: usize) -> Result<(), Cause> {
    if len > max {
        return Err(Cause::LimitExceeded { what, len, max });
    }
    Ok(())
}
