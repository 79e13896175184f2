//! Content hashing of configured graphs.
//!
//! The hash is a truncated SHA-256 of the JSON serialization, so two passes
//! producing identical graphs produce identical hashes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::GRAPH_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A lowercase hexadecimal content hash, e.g. `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ContentHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    Ok(hash_bytes(serialized.as_bytes()))
  }
}

/// Hash arbitrary bytes into a truncated [`ContentHash`].
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  let full = format!("{:x}", hasher.finalize());
  ContentHash(full[..GRAPH_HASH_PREFIX_LEN].to_string())
}
