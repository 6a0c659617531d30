//! Content addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkdb_common::SEQUENCE_SENTINEL;

/// Address of an immutable object in a blob store.
///
/// Addresses produced by this crate are the lowercase hex SHA-256 of the
/// object's canonical bytes. Addresses read back from registries are kept
/// verbatim. The literal `"0x0"` is the sentinel for "no sequence yet".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Wraps an address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the "no sequence yet" sentinel.
    pub fn sentinel() -> Self {
        Self(SEQUENCE_SENTINEL.to_string())
    }

    /// Returns true if this is the "no sequence yet" sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == SEQUENCE_SENTINEL
    }

    /// Returns true if this looks like an address produced by this crate.
    ///
    /// Stores use this to refuse addresses that could escape their root.
    pub fn is_digest(&self) -> bool {
        self.0.len() == 64 && self.0.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContentAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        assert!(ContentAddress::sentinel().is_sentinel());
        assert_eq!(ContentAddress::sentinel().as_str(), "0x0");
        assert!(!ContentAddress::new("abc").is_sentinel());
    }

    #[test]
    fn test_is_digest() {
        assert!(ContentAddress::new("a".repeat(64)).is_digest());
        assert!(!ContentAddress::new("../etc/passwd").is_digest());
        assert!(!ContentAddress::new("A".repeat(64)).is_digest());
    }

    #[test]
    fn test_serde_transparent() {
        let addr = ContentAddress::new("abc");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"abc\"");
    }
}
