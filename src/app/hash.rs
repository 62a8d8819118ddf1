//! SHA-1 content fingerprint type
//!
//! Stores the manifest fingerprint as its raw 20-byte digest and renders it
//! as lowercase hex wherever it leaves the process (manifest body, JSON,
//! logs).

use std::fmt;

use serde::Serialize;
use sha1::{Digest, Sha1};

/// Length of a SHA-1 digest in bytes
pub const DIGEST_LEN: usize = 20;

/// SHA-1 digest over the concatenated content of every tracked URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; DIGEST_LEN]);

impl ContentHash {
    /// Hash a single byte payload
    ///
    /// # Examples
    ///
    /// ```rust
    /// use appcache::app::ContentHash;
    ///
    /// let hash = ContentHash::of(b"Test");
    /// assert_eq!(hash.to_hex(), "640ab2bae07bedc4c163f679a746f7ab7fb5d1fa");
    /// ```
    pub fn of(content: &[u8]) -> Self {
        Self::from_hasher(Sha1::new_with_prefix(content))
    }

    /// Finish a running SHA-1 accumulator
    pub fn from_hasher(hasher: Sha1) -> Self {
        let digest = hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&digest);
        ContentHash(bytes)
    }

    /// Lowercase 40-character hex representation
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0
            .iter()
            .fold(String::with_capacity(DIGEST_LEN * 2), |mut acc, b| {
                let _ = write!(&mut acc, "{:02x}", b);
                acc
            })
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SHA1: &str = "640ab2bae07bedc4c163f679a746f7ab7fb5d1fa";

    #[test]
    fn test_known_digests() {
        assert_eq!(ContentHash::of(b"Test").to_hex(), TEST_SHA1);
        assert_eq!(
            ContentHash::of(b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_running_accumulator_matches_concatenation() {
        let mut hasher = Sha1::new();
        hasher.update(b"yay");
        hasher.update(b"yay!!");
        assert_eq!(ContentHash::from_hasher(hasher), ContentHash::of(b"yayyay!!"));
    }

    #[test]
    fn test_serialization() {
        let hash = ContentHash::of(b"Test");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", TEST_SHA1));
    }

    #[test]
    fn test_display_matches_hex() {
        let hash = ContentHash::of(b"Test");
        assert_eq!(format!("{}", hash), TEST_SHA1);
        assert_eq!(hash.to_string(), hash.to_hex());
        assert_ne!(hash, ContentHash::of(b"test"));
    }
}
