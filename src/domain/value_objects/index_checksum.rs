use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a serialized index payload, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexChecksum(String);

impl IndexChecksum {
    pub fn parse(hex: &str) -> Result<Self, String> {
        if hex.len() != 64 {
            return Err(format!(
                "checksum must be 64 hex characters, got {}",
                hex.len()
            ));
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("checksum must contain only hexadecimal characters".to_string());
        }

        Ok(Self(hex.to_lowercase()))
    }

    pub fn of(payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verifies(&self, payload: &[u8]) -> bool {
        *self == Self::of(payload)
    }
}

impl std::fmt::Display for IndexChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
