//! Canonical JSON encoding and content digests.
//!
//! Content addresses must not depend on map iteration order or formatting,
//! so every payload goes through `serde_json::Value` (whose object map is
//! key-sorted) and is written without insignificant whitespace.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::StorageResult;

/// Serializes `value` to its canonical JSON bytes.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> StorageResult<Vec<u8>> {
    let tree = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&tree)?)
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_bytes_sorts_keys() {
        let mut map = HashMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("mid", 3);
        let bytes = canonical_bytes(&map).unwrap();
        assert_eq!(bytes, br#"{"alpha":2,"mid":3,"zeta":1}"#);
    }

    #[test]
    fn test_canonical_bytes_ignores_source_formatting() {
        let a: serde_json::Value = serde_json::from_str("{ \"b\" : [1, 2],\n \"a\": null }").unwrap();
        let b = json!({"a": null, "b": [1, 2]});
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
