//! Per-repository configuration document.
//!
//! The configuration lives at `.sextant/config.json` inside the repository
//! and declares which subtrees the indexer is authorized to walk. The JSON
//! field names are camelCase because the document is shared with non-Rust
//! clients of the engine.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the per-repository state directory.
pub const STATE_DIR: &str = ".sextant";

/// Name of the configuration document inside the state directory.
pub const CONFIG_FILE: &str = "config.json";

/// Project configuration as persisted in `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Absolute repository root
    pub repo_root: PathBuf,
    /// Repo-relative source roots the indexer may walk. Empty means the
    /// whole repository (a single `"."` root).
    #[serde(default)]
    pub source_roots: Vec<String>,
    /// Optional directory for the markdown note store. Unused by the core
    /// engine; preserved for the memory subsystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Default configuration: index the whole repository.
    #[must_use]
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            source_roots: vec![".".to_string()],
            memory_dir: None,
        }
    }

    /// The state directory for a repository root.
    #[must_use]
    pub fn state_dir(repo_root: &Path) -> PathBuf {
        repo_root.join(STATE_DIR)
    }

    /// Load the configuration from a repository's state directory.
    ///
    /// Returns the default configuration when the document does not exist.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = Self::state_dir(repo_root).join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::new(repo_root.to_path_buf()));
        }

        let raw = std::fs::read_to_string(&path)?;
        let mut config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("malformed {}: {e}", path.display())))?;
        if config.source_roots.is_empty() {
            config.source_roots.push(".".to_string());
        }
        config.validate()?;
        Ok(config)
    }

    /// Persist the configuration into the state directory, creating it if
    /// needed.
    pub fn save(&self, repo_root: &Path) -> Result<()> {
        let dir = Self::state_dir(repo_root);
        std::fs::create_dir_all(&dir)?;
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("serializing config: {e}")))?;
        std::fs::write(dir.join(CONFIG_FILE), raw)?;
        Ok(())
    }

    /// Validate the declared source roots.
    ///
    /// Rules: every root is relative and stays inside the repository, no
    /// duplicates, and no root may be a parent or child of another.
    pub fn validate(&self) -> Result<()> {
        for root in &self.source_roots {
            let p = Path::new(root);
            if p.is_absolute() {
                return Err(Error::Config(format!("source root '{root}' is absolute")));
            }
            if p.components().any(|c| matches!(c, Component::ParentDir)) {
                return Err(Error::Config(format!(
                    "source root '{root}' escapes the repository"
                )));
            }
        }

        let normalized: Vec<String> = self.source_roots.iter().map(|r| normalize_root(r)).collect();

        for (i, a) in normalized.iter().enumerate() {
            for b in normalized.iter().skip(i + 1) {
                if a == b {
                    return Err(Error::Config(format!("duplicate source root '{a}'")));
                }
                if is_parent_of(a, b) || is_parent_of(b, a) {
                    return Err(Error::Config(format!(
                        "source roots '{a}' and '{b}' overlap"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Strip leading `./` and trailing slashes so comparisons are stable.
fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether `parent` is a path prefix of `child` at component granularity.
fn is_parent_of(parent: &str, child: &str) -> bool {
    if parent == "." {
        return child != ".";
    }
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('/'))
}
