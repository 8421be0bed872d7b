//! Writing the finished artifact.
//!
//! File targets are written to a temporary file next to the destination and
//! renamed into place only after the whole payload is on disk, so a failed
//! or interrupted export never leaves a partial file behind.

use crate::defaults::STDIO_PATH;
use crate::error::{ReadaloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Container of the exported artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
}

impl OutputFormat {
    /// Pick the format for `target`.
    ///
    /// An explicit choice wins. Otherwise a `.wav` or `.mp3` extension
    /// decides, and everything else (stdout included) gets MP3.
    pub fn resolve(explicit: Option<Self>, target: &OutputTarget) -> Self {
        if let Some(format) = explicit {
            return format;
        }
        match target {
            OutputTarget::File(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
                .unwrap_or_default(),
            OutputTarget::Stdout => Self::default(),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReadaloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            _ => Err(ReadaloudError::invalid_value(
                "audio.format",
                format!("unknown format '{}', expected 'mp3' or 'wav'", s),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp3 => write!(f, "mp3"),
            Self::Wav => write!(f, "wav"),
        }
    }
}

/// Where the encoded audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

impl OutputTarget {
    /// `-` means stdout, anything else is a file path.
    pub fn parse(value: &str) -> Self {
        if value == STDIO_PATH {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdout => write!(f, "<stdout>"),
        }
    }
}

/// Write `bytes` to `target`.
pub fn write_output(target: &OutputTarget, bytes: &[u8]) -> Result<()> {
    match target {
        OutputTarget::File(path) => write_file_atomic(path, bytes),
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| ReadaloudError::Export {
                    message: format!("Failed to write to stdout: {}", e),
                })
        }
    }
}

fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ReadaloudError::Export {
        message: format!("Failed to create {}: {}", dir.display(), e),
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| ReadaloudError::Export {
        message: format!("Failed to create temporary file in {}: {}", dir.display(), e),
    })?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| ReadaloudError::Export {
            message: format!("Failed to write {}: {}", path.display(), e),
        })?;
    temp.persist(path).map_err(|e| ReadaloudError::Export {
        message: format!("Failed to move output into {}: {}", path.display(), e.error),
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote output file");
    Ok(())
}
