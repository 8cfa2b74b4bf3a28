//! Content hashes of compiled JSON.
//!
//! Compiled objects keep insertion order, so structurally identical inputs
//! serialize to identical bytes. Hashing the serialized form gives a stable
//! key for caches and request deduplication.

use std::hash::Hasher;

use serde_json::Value;
use siphasher::sip::SipHasher24;

/// Computes the SipHash-2-4 of a JSON value's compact serialization.
pub fn value_hash(value: &Value) -> u64 {
    let mut hasher = SipHasher24::new();
    hasher.write(value.to_string().as_bytes());
    hasher.finish()
}

/// Computes a JSON value's hash as a 16 character hex string.
pub fn request_hash(value: &Value) -> String {
    format!("{:016x}", value_hash(value))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::{QueryNode, compile};

    #[test]
    fn identical_trees_hash_identically() {
        let a = compile(&QueryNode::term("color", "red"));
        let b = compile(&QueryNode::term("color", "red"));
        assert_eq!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn key_order_changes_hash() {
        let a = json!({ "a": 1, "b": 2 });
        let b = json!({ "b": 2, "a": 1 });
        assert_ne!(value_hash(&a), value_hash(&b));
    }

    #[test]
    fn hash_is_hex_string() {
        let hash = request_hash(&json!({ "size": 0 }));
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
