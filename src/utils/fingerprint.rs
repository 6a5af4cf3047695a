use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::types::CompiledDefinition;

/// Content fingerprint of one compiled definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionFingerprint {
    /// Definition name (e.g., "Patient")
    pub name: String,
    /// SHA-256 hash of the definition's canonical JSON form
    pub content_hash: String,
}

impl DefinitionFingerprint {
    pub fn new(name: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_hash: content_hash.into(),
        }
    }

    /// Fingerprint a compiled definition
    pub fn of(compiled: &CompiledDefinition) -> Result<Self> {
        Ok(Self::new(compiled.name(), fingerprint_definition(compiled)?))
    }

    /// Check if this fingerprint matches another
    pub fn matches(&self, other: &DefinitionFingerprint) -> bool {
        self.name == other.name && self.content_hash == other.content_hash
    }

    /// Get a short representation of the fingerprint for logging
    pub fn short_hash(&self) -> &str {
        self.content_hash.get(..8).unwrap_or(&self.content_hash)
    }
}

/// Hex SHA-256 of arbitrary content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Hash of a compiled definition's canonical JSON form. Attribute and
/// composite order is preserved and sets serialize sorted, so equal trees
/// always hash alike.
pub fn fingerprint_definition(compiled: &CompiledDefinition) -> Result<String> {
    let canonical = serde_json::to_vec(compiled)?;
    Ok(hash_content(&canonical))
}
