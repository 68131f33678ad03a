//! `keys gen`, `keys show` and `keys set`

use std::path::{Path, PathBuf};

use crate::config::{Config, EnvOverrides};
use crate::error::{ErrorCode, ForgeError, Result};
use crate::key::{KeyInfo, KeyPair, KeyPaths, KeyRole, KeyStore};
use crate::prompt::{self, Prompter};
use crate::ui::{self, UI};
use crate::utils::format_bytes;
use crate::{KeysGenArgs, KeysSetArgs};

/// Generate a keypair off the async runtime and write it to `paths`
pub async fn create_keypair(ui: &UI, paths: &KeyPaths, bits: u32) -> Result<KeyPair> {
    crate::key::validate_key_bits(bits)?;

    let spinner = ui::create_spinner(ui, &format!("Generating {}-bit RSA keypair...", bits));
    let generated = tokio::task::spawn_blocking(move || KeyStore::generate(bits))
        .await
        .map_err(|e| ForgeError::internal(format!("Key generation task failed: {}", e)));
    spinner.finish_and_clear();

    let key_pair = generated??;
    KeyStore::persist(paths, &key_pair).await?;
    Ok(key_pair)
}

/// Print the permission warning for a private key, if any
pub fn report_permissions(ui: &UI, private_key_path: &Path) {
    if let Some(warning) = KeyStore::audit_permissions(private_key_path) {
        ui.warning(&format!("Warning: {}", warning));
        ui.warning(&format!("Consider running: {}", warning.suggestion()));
    }
}

/// Key management commands
///
/// `file_config` is what is on disk and is the only thing ever saved; the
/// environment overrides are layered on top for this invocation only.
pub struct KeysService {
    file_config: Config,
    overrides: EnvOverrides,
    config_path: PathBuf,
    ui: UI,
}

impl KeysService {
    pub fn new(file_config: Config, overrides: EnvOverrides, config_path: PathBuf) -> Self {
        Self {
            file_config,
            overrides,
            config_path,
            ui: UI::new(),
        }
    }

    fn effective_config(&self) -> Config {
        self.overrides.clone().apply(self.file_config.clone())
    }

    /// Generate and save a new keypair, asking before replacing existing files
    ///
    /// Returns `false` when the user declined to overwrite.
    pub async fn generate(&mut self, args: KeysGenArgs, prompter: &dyn Prompter) -> Result<bool> {
        let config = self.effective_config();
        let bits = args.bits.unwrap_or(config.key_bits);
        crate::key::validate_key_bits(bits)?;

        let paths = config.key_paths();
        if KeyStore::exists(&paths).any() && !args.force && !prompt::confirm_overwrite(prompter)? {
            self.ui.warning("Key generation cancelled");
            return Ok(false);
        }

        create_keypair(&self.ui, &paths, bits).await?;

        self.file_config.key_bits = bits;
        self.file_config.save(&self.config_path).await?;

        self.ui.success("✓ RSA keypair generated successfully!");
        self.ui
            .detail(&format!("Private key: {}", paths.private_key_path.display()));
        self.ui
            .detail(&format!("Public key: {}", paths.public_key_path.display()));
        self.ui.detail(&format!("Key size: {} bits", bits));

        report_permissions(&self.ui, &paths.private_key_path);
        Ok(true)
    }

    /// Describe both key files and the configured default size
    pub async fn show(&self) -> Result<()> {
        let config = self.effective_config();
        let paths = config.key_paths();

        let private_info = KeyStore::inspect(&paths.private_key_path, KeyRole::Private).await;
        let public_info = KeyStore::inspect(&paths.public_key_path, KeyRole::Public).await;

        self.ui.header("RSA Key Information");
        for info in [&private_info, &public_info] {
            let title = format!("{} Key", info.role);
            self.ui.card(&title, self.key_rows(info));
        }

        self.ui.card(
            "Configuration",
            vec![
                ("Config file", self.config_path.display().to_string()),
                ("Default key size", format!("{} bits", config.key_bits)),
            ],
        );

        if !private_info.exists || !public_info.exists {
            self.ui.info("Tip: Generate keys with: jwt-forge keys gen");
        }
        Ok(())
    }

    fn key_rows(&self, info: &KeyInfo) -> Vec<(&'static str, String)> {
        let mut rows = vec![("Path", info.path.display().to_string())];

        if !info.exists {
            rows.push(("Status", self.ui.format_status("✗ Not found", false)));
            return rows;
        }

        rows.push(("Status", self.ui.format_status("✓ Found", true)));
        if let Some(size) = info.size {
            rows.push(("Size", format!("{} bytes ({})", size, format_bytes(size))));
        }
        if let Some(modified) = info.modified {
            rows.push(("Modified", modified.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
        if let Some(mode) = info.mode {
            let rendered = ui::format_mode(mode);
            if info.permissions_too_open() {
                rows.push((
                    "Permissions",
                    self.ui
                        .format_attention(&format!("{} (too open, use chmod 600)", rendered)),
                ));
            } else {
                rows.push(("Permissions", rendered));
            }
        }
        match info.bits {
            Some(bits) => rows.push(("Key size", format!("{} bits", bits))),
            None => rows.push(("Key size", self.ui.format_status("unreadable", false))),
        }
        if let Some(fingerprint) = &info.fingerprint {
            rows.push(("SHA256", fingerprint.clone()));
        }
        rows
    }

    /// Point the config at existing key files
    ///
    /// Flags win; anything not given on the command line is prompted for.
    pub async fn set(&mut self, args: KeysSetArgs, prompter: &dyn Prompter) -> Result<KeyPaths> {
        let current = self.file_config.key_paths();

        let paths = match (args.private, args.public) {
            (Some(private_key_path), Some(public_key_path)) => KeyPaths {
                private_key_path,
                public_key_path,
            },
            (None, None) => {
                self.ui.info("Set custom key paths:");
                prompt::prompt_key_paths(prompter, &current)?
            }
            (private, public) => KeyPaths {
                private_key_path: private.unwrap_or(current.private_key_path),
                public_key_path: public.unwrap_or(current.public_key_path),
            },
        };

        for (path, role) in [
            (&paths.private_key_path, KeyRole::Private),
            (&paths.public_key_path, KeyRole::Public),
        ] {
            if !path.exists() {
                return Err(ForgeError::key_not_found(role, path.display()));
            }
        }

        self.file_config.private_key_path = paths.private_key_path.clone();
        self.file_config.public_key_path = paths.public_key_path.clone();
        self.file_config.save(&self.config_path).await?;

        self.ui.success("✓ Key paths updated successfully!");
        self.ui
            .detail(&format!("Private key: {}", paths.private_key_path.display()));
        self.ui
            .detail(&format!("Public key: {}", paths.public_key_path.display()));

        report_permissions(&self.ui, &paths.private_key_path);
        Ok(paths)
    }
}

/// Extra guidance printed next to errors that have an obvious fix
pub fn hint_for(error: &ForgeError) -> Option<&'static str> {
    match error.code() {
        ErrorCode::KeyNotFound => Some("Generate keys first with: jwt-forge keys gen"),
        ErrorCode::InvalidKeySize => Some("Supported key sizes: 2048, 3072"),
        _ => None,
    }
}
