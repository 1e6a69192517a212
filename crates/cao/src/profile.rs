// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent profile loader: markdown files
//! with a YAML front-matter header under a user-scoped directory, named by
//! the launcher and out of the Orchestration Server's write path — the
//! server only reads them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::frontmatter;

/// Front-matter of an agent profile file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileMeta {
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
}

/// A loaded agent profile: its metadata plus the markdown body, which is the
/// system-prompt text injected ahead of the first task.
#[derive(Debug, Clone)]
pub struct Profile {
    pub meta: ProfileMeta,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("profile file missing front matter: {0}")]
    MissingFrontMatter(PathBuf),
    #[error("invalid profile front matter: {0}")]
    InvalidFrontMatter(#[from] serde_yaml::Error),
    #[error("io error reading profile: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a named profile from `profiles_dir/<name>.md`.
pub fn load(profiles_dir: &Path, name: &str) -> Result<Profile, ProfileError> {
    let path = profiles_dir.join(format!("{name}.md"));
    if !path.exists() {
        return Err(ProfileError::NotFound(name.to_string()));
    }
    let text = std::fs::read_to_string(&path)?;
    let (yaml, body) =
        frontmatter::split(&text).ok_or_else(|| ProfileError::MissingFrontMatter(path.clone()))?;
    let meta: ProfileMeta = serde_yaml::from_str(yaml)?;
    Ok(Profile { meta, body: body.to_string() })
}

/// List profile names available under `profiles_dir` (by `.md` stem).
pub fn list(profiles_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(profiles_dir) else { return Vec::new() };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect()
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
