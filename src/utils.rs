//! Encoding and hashing helpers shared by the key store and token codec

use base64::{engine::general_purpose, Engine};
use sha2::{Digest, Sha256};

use crate::error::{ForgeError, Result};

/// Crypto utilities for token segments and key fingerprints
pub struct CryptoUtils;

impl CryptoUtils {
    /// Calculate SHA256 hash of bytes as lowercase hex
    pub fn calculate_sha256_hash_bytes(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Colon separated SHA256 fingerprint (`ab:cd:...`) for display
    pub fn fingerprint(data: &[u8]) -> String {
        let hex = Self::calculate_sha256_hash_bytes(data);
        hex.as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Encode bytes as unpadded base64url
    pub fn encode_base64url(data: &[u8]) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(data)
    }

    /// Decode an unpadded base64url segment
    pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
        general_purpose::URL_SAFE_NO_PAD
            .decode(data)
            .map_err(|e| ForgeError::malformed_token(format!("invalid base64url segment: {}", e)))
    }
}

/// Format bytes into human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod unit {
        use super::*;

        #[test]
        fn test_calculate_sha256_hash_bytes() {
            let hash = CryptoUtils::calculate_sha256_hash_bytes(b"hello world");
            assert_eq!(
                hash,
                "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
            );
        }

        #[test]
        fn test_fingerprint_format() {
            let fp = CryptoUtils::fingerprint(b"");
            assert!(fp.starts_with("e3:b0:c4:42"));
            assert_eq!(fp.split(':').count(), 32);
        }

        #[test]
        fn test_base64url_has_no_padding_or_plus() {
            let encoded = CryptoUtils::encode_base64url(&[0xfb, 0xff, 0xfe]);
            assert_eq!(encoded, "-__-");

            let encoded = CryptoUtils::encode_base64url(b"a");
            assert_eq!(encoded, "YQ");
        }

        #[test]
        fn test_base64url_decode_invalid() {
            let result = CryptoUtils::decode_base64url("invalid!@#$%");
            assert!(result.is_err());

            // Standard alphabet padding is not accepted
            assert!(CryptoUtils::decode_base64url("YQ==").is_err());
        }

        #[test]
        fn test_format_bytes() {
            assert_eq!(format_bytes(100), "100 B");
            assert_eq!(format_bytes(1024), "1.0 KB");
            assert_eq!(format_bytes(1704), "1.7 KB");
            assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_base64url_roundtrip(data in prop::collection::vec(any::<u8>(), 0..512)) {
                let encoded = CryptoUtils::encode_base64url(&data);
                prop_assert!(!encoded.contains('='));
                prop_assert!(!encoded.contains('.'));
                let decoded = CryptoUtils::decode_base64url(&encoded).unwrap();
                prop_assert_eq!(data, decoded);
            }

            #[test]
            fn test_hash_length(data in prop::collection::vec(any::<u8>(), 0..256)) {
                let hash = CryptoUtils::calculate_sha256_hash_bytes(&data);
                prop_assert_eq!(hash.len(), 64);
            }

            #[test]
            fn test_format_bytes_no_panic(bytes in any::<u64>()) {
                let formatted = format_bytes(bytes);
                prop_assert!(!formatted.is_empty());
            }
        }
    }
}
