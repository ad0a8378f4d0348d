use sha2::{Digest, Sha256};

/// Checksummed wrapper for cached JSON payloads.
///
/// The reference-corpus cache stores serialized exemplar sets; a corrupted
/// or tampered entry must cause a re-read from disk, never a silently wrong
/// classification corpus. Entries carry a SHA-256 checksum computed at
/// insert time and verified on every read.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The cached payload (JSON string).
    pub data: String,
    /// SHA-256 checksum of `data`, hex encoded.
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Wraps a payload with its freshly computed checksum.
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// True when the stored checksum matches the payload.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Serialized form stored as the cache value.
    pub fn into_cache_value(self) -> String {
        serde_json::to_string(&self).unwrap_or_default()
    }

    /// Parses a cache value and returns the payload only if the checksum
    /// verifies. `None` means the entry is corrupt and must be refetched.
    pub fn from_cache_value(serialized: &str) -> Option<String> {
        let entry: ValidatedCacheEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            tracing::warn!(
                "Cache validation failed: checksum mismatch (payload length {})",
                entry.data.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_validates() {
        let entry = ValidatedCacheEntry::new(r#"[{"status":"LAYAK"}]"#.to_string());
        assert!(entry.is_valid());
    }

    #[test]
    fn round_trip_returns_payload() {
        let payload = r#"[{"status":"PERHATIAN","text":"lancar"}]"#.to_string();
        let value = ValidatedCacheEntry::new(payload.clone()).into_cache_value();

        assert_eq!(ValidatedCacheEntry::from_cache_value(&value), Some(payload));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let value = ValidatedCacheEntry::new(r#"{"status":"LAYAK"}"#.to_string()).into_cache_value();
        let tampered = value.replace("LAYAK", "TIDAK");

        assert_eq!(ValidatedCacheEntry::from_cache_value(&tampered), None);
    }

    #[test]
    fn garbage_cache_value_is_rejected() {
        assert_eq!(ValidatedCacheEntry::from_cache_value("not json"), None);
    }

    #[test]
    fn checksum_is_deterministic() {
        let a = ValidatedCacheEntry::new("same payload".to_string());
        let b = ValidatedCacheEntry::new("same payload".to_string());
        assert_eq!(a.checksum, b.checksum);
    }
}
