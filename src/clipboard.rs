//! Best-effort clipboard output through the platform clipboard tool

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{ForgeError, Result};

/// Somewhere a generated token can be copied to
pub trait ClipboardSink {
    async fn copy(&self, text: &str) -> Result<()>;
}

/// Clipboard command and its arguments
type ClipboardCommand = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CANDIDATES: &[ClipboardCommand] = &[("pbcopy", &[])];

#[cfg(windows)]
const CANDIDATES: &[ClipboardCommand] = &[("clip", &[])];

// Tried in order; clip.exe covers WSL
#[cfg(not(any(target_os = "macos", windows)))]
const CANDIDATES: &[ClipboardCommand] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// Pipes text into the first clipboard tool found on `PATH`
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn locate() -> Option<(PathBuf, &'static [&'static str])> {
        CANDIDATES
            .iter()
            .find_map(|(name, args)| which::which(name).ok().map(|path| (path, *args)))
    }
}

impl ClipboardSink for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        let (program, args) = Self::locate()
            .ok_or_else(|| ForgeError::clipboard("no clipboard tool found on PATH"))?;

        tracing::debug!("Copying to clipboard with {}", program.display());

        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ForgeError::clipboard(format!("{}: {}", program.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| ForgeError::clipboard(e.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ForgeError::clipboard(e.to_string()))?;
        if !status.success() {
            return Err(ForgeError::clipboard(format!(
                "{} exited with {}",
                program.display(),
                status
            )));
        }
        Ok(())
    }
}
