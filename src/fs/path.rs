//! Vault-relative paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A slash-delimited path relative to the store root.
///
/// The root is the empty path and displays as `/`. Paths never carry a
/// leading or trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultPath(String);

impl VaultPath {
    /// The store root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Build a path from a string, normalizing redundant slashes.
    pub fn new(raw: &str) -> Self {
        let joined = raw
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// Resolve against a filesystem base directory.
    pub fn to_fs(&self, base: &Path) -> PathBuf {
        if self.is_root() {
            return base.to_path_buf();
        }
        self.0.split('/').fold(base.to_path_buf(), |acc, part| acc.join(part))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<VaultPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    pub fn join(&self, name: &str) -> VaultPath {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format!("{}/{}", self.0, name))
        }
    }

    /// Whether `self` equals `other` or lies underneath it (by prefix).
    pub fn starts_with(&self, other: &VaultPath) -> bool {
        if other.is_root() {
            return true;
        }
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/'))
    }

    /// Rewrite the `from` prefix to `to`, for paths affected by a move.
    pub fn rebase(&self, from: &VaultPath, to: &VaultPath) -> Option<VaultPath> {
        if !self.starts_with(from) {
            return None;
        }
        if self == from {
            return Some(to.clone());
        }
        let rest = if from.is_root() {
            &self.0[..]
        } else {
            &self.0[from.0.len() + 1..]
        };
        Some(to.join(rest))
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for VaultPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Split a file name into stem and lowercase extension.
///
/// Dotfiles (`.env`) have no extension.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
    }
}
