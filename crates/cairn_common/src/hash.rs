//! Content hashing for recompilation decisions.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 128-bit content hash computed using XXH3.
///
/// Used both as the fingerprint of a source file and as the digest of a
/// compiler invocation. Serialized as a 32-character lowercase hex string so
/// that persisted cache tables stay human-readable and diff-friendly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Hashes a sequence of parts, separating them with NUL bytes.
    ///
    /// `["ab", "c"]` and `["a", "bc"]` produce different hashes.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut buf = Vec::new();
        for part in parts {
            buf.extend_from_slice(part.as_ref());
            buf.push(0);
        }
        Self::from_bytes(&buf)
    }
}

/// Error returned when a string is not a valid 32-character hex hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash '{0}': expected 32 hex characters")]
pub struct ParseHashError(pub String);

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseHashError(s.to_string());
        let decoded = hex::decode(s).map_err(|_| invalid())?;
        let bytes: [u8; 16] = decoded.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = ContentHash;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}
