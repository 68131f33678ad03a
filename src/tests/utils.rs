//! Test utilities and helpers for unit tests
//!
//! Temp directories, key fixtures and config setup shared across modules.

#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use tempfile::TempDir;

    use crate::claims::{build_claims, Claims};
    use crate::config::Config;
    use crate::key::{KeyPair, KeyPaths, KeyStore};

    /// Create a temporary directory for testing
    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    /// Create a temporary file with content
    pub fn create_temp_file_with_content(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.path().join(filename);
        std::fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// Key locations inside a not-yet-created `keys/` subdirectory
    pub fn key_paths_in(dir: &TempDir) -> KeyPaths {
        let keys_dir = dir.path().join("keys");
        KeyPaths {
            private_key_path: keys_dir.join("private.pem"),
            public_key_path: keys_dir.join("public.pem"),
        }
    }

    /// A config whose keys live under `dir`
    pub fn config_in(dir: &TempDir) -> Config {
        let paths = key_paths_in(dir);
        Config {
            private_key_path: paths.private_key_path,
            public_key_path: paths.public_key_path,
            key_bits: 2048,
        }
    }

    /// Shared 2048-bit keypair, generated once per test binary
    pub fn test_key_pair() -> &'static KeyPair {
        static KEY_PAIR: OnceLock<KeyPair> = OnceLock::new();
        KEY_PAIR.get_or_init(|| KeyStore::generate(2048).expect("Failed to generate test keypair"))
    }

    /// Write the shared keypair to `paths`
    pub async fn persist_test_key_pair(paths: &KeyPaths) {
        KeyStore::persist(paths, test_key_pair())
            .await
            .expect("Failed to persist test keypair");
    }

    /// Default `iss`/`sub` claims
    pub fn sample_claims() -> Claims {
        build_claims(None, None, None).expect("Failed to build claims")
    }
}
