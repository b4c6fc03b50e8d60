//! Content-derived identifiers
//!
//! Provides [`PerspectiveId`], the opaque address of a perspective, and
//! [`ContentHash`], the head hash of a perspective's current object.
//! Both are 32-byte Blake3 values with hex string representations.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Opaque address of a perspective
///
/// Well-known perspectives (concepts, per-user scaffolding) derive their id
/// deterministically from a stable payload; user-created perspectives get a
/// unique id. Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PerspectiveId([u8; 32]);

impl PerspectiveId {
    /// Create an id from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive an id deterministically from a stable payload
    ///
    /// # Contract
    /// The same payload always yields the same id. Used for concept
    /// perspectives and per-user scaffolding.
    #[inline]
    #[must_use]
    pub fn derive(payload: &[u8]) -> Self {
        let hash = blake3::hash(payload);
        Self::new(*hash.as_bytes())
    }

    /// Generate a fresh unique id
    ///
    /// Mixes ULID entropy through the same hash so all ids share one
    /// representation.
    #[inline]
    #[must_use]
    pub fn unique() -> Self {
        let ulid = ulid::Ulid::new();
        Self::derive(&ulid.to_bytes())
    }

    /// Create id from a byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        if bytes.len() != 32 {
            return Err(IdError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for PerspectiveId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PerspectiveId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for PerspectiveId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for PerspectiveId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = PerspectiveId;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-byte perspective id as a hex string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

/// Head hash of a perspective's current object (Blake3 over canonical JSON)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a hash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self::new(*hash.as_bytes())
    }

    /// Compute the head hash of an object payload
    ///
    /// Serialization is canonical (sorted object keys), so structurally
    /// equal payloads hash identically.
    ///
    /// # Errors
    /// Returns error if the payload cannot be serialized
    #[inline]
    pub fn of_object(value: &serde_json::Value) -> Result<Self, IdError> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Errors that can occur when working with identifiers
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid id length
    #[error("invalid id length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspective_id_derive_deterministic() {
        let a = PerspectiveId::derive(b"concept/blogpost");
        let b = PerspectiveId::derive(b"concept/blogpost");
        assert_eq!(a, b);
    }

    #[test]
    fn perspective_id_derive_distinct_payloads() {
        let a = PerspectiveId::derive(b"concept/blogpost");
        let b = PerspectiveId::derive(b"concept/bloghome");
        assert_ne!(a, b);
    }

    #[test]
    fn perspective_id_unique_differs() {
        let a = PerspectiveId::unique();
        let b = PerspectiveId::unique();
        assert_ne!(a, b);
    }

    #[test]
    fn perspective_id_display_and_parse() {
        let id = PerspectiveId::derive(b"roundtrip");
        let parsed: PerspectiveId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn perspective_id_from_slice_invalid_length() {
        let result = PerspectiveId::from_slice(&[1u8; 31]);
        assert!(matches!(
            result,
            Err(IdError::InvalidLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn perspective_id_short() {
        let id = PerspectiveId::derive(b"short");
        let short = id.short();
        assert_eq!(short.len(), 16);
        assert!(id.to_string().starts_with(&short));
    }

    #[test]
    fn perspective_id_serde_hex_string() {
        let id = PerspectiveId::derive(b"serde");
        let json = serde_json::to_string(&id).unwrap();
        let decoded: PerspectiveId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, decoded);
        assert!(json.contains('"'));
    }

    #[test]
    fn content_hash_ignores_key_order() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"title":"x","pages":[]}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"pages":[],"title":"x"}"#).unwrap();
        assert_eq!(
            ContentHash::of_object(&a).unwrap(),
            ContentHash::of_object(&b).unwrap()
        );
    }

    #[test]
    fn content_hash_differs_for_different_objects() {
        let a = serde_json::json!({"sections": []});
        let b = serde_json::json!({"sections": ["x"]});
        assert_ne!(
            ContentHash::of_object(&a).unwrap(),
            ContentHash::of_object(&b).unwrap()
        );
    }
}
