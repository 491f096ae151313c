//! Allowlist file handling
//!
//! One device name per line. Names are trimmed and lowercased, blank lines and
//! lines starting with `#` are ignored.

use crate::error::{CleanerError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default allowlist location, relative to the working directory
pub const DEFAULT_ALLOWLIST_PATH: &str = "allowed_devices.txt";

/// Device names permitted to stay on the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    names: BTreeSet<String>,
}

impl Allowlist {
    /// Load the allowlist from disk. A missing file or a file without any
    /// names is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => CleanerError::AllowlistNotFound {
                path: path_display.clone(),
            },
            _ => CleanerError::AllowlistRead {
                path: path_display.clone(),
                source,
            },
        })?;

        let allowlist = Self::parse(&contents, &path_display)?;
        tracing::info!(
            path = %path_display,
            names = allowlist.len(),
            "Loaded allowlist"
        );
        Ok(allowlist)
    }

    /// Parse allowlist contents. `origin` is only used in error messages.
    pub fn parse(contents: &str, origin: &str) -> Result<Self> {
        let names: BTreeSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();

        if names.is_empty() {
            return Err(CleanerError::AllowlistEmpty {
                path: origin.to_string(),
            });
        }

        Ok(Self { names })
    }

    /// Check a device name against the list, ignoring case and surrounding whitespace
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
