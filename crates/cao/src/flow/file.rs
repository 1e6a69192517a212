// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow file parsing: YAML front matter + `[[var]]` prompt
//! template body.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frontmatter;

/// Front matter of a flow definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowMeta {
    pub name: String,
    pub schedule: String,
    pub agent_profile: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub script: Option<PathBuf>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A parsed flow: metadata plus the raw prompt template body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDef {
    pub meta: FlowMeta,
    pub prompt_template: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowFileError {
    #[error("flow file missing front matter: {0}")]
    MissingFrontMatter(PathBuf),
    #[error("invalid flow front matter: {0}")]
    InvalidFrontMatter(#[from] serde_yaml::Error),
    #[error("io error reading flow file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a flow definition from its on-disk text.
pub fn parse(path: &Path, text: &str) -> Result<FlowDef, FlowFileError> {
    let (yaml, body) =
        frontmatter::split(text).ok_or_else(|| FlowFileError::MissingFrontMatter(path.to_path_buf()))?;
    let meta: FlowMeta = serde_yaml::from_str(yaml)?;
    Ok(FlowDef { meta, prompt_template: body.to_string() })
}

/// Serialize a flow definition back to its on-disk text (round-trip,).
pub fn render(flow: &FlowDef) -> Result<String, FlowFileError> {
    let yaml = serde_yaml::to_string(&flow.meta)?;
    Ok(format!("---\n{yaml}---\n{}", flow.prompt_template))
}

/// Load a flow file from disk.
pub fn load(path: &Path) -> Result<FlowDef, FlowFileError> {
    let text = std::fs::read_to_string(path)?;
    parse(path, &text)
}

/// Load every `.md` flow file under `flows_dir`.
pub fn load_all(flows_dir: &Path) -> Vec<FlowDef> {
    let Ok(entries) = std::fs::read_dir(flows_dir) else { return Vec::new() };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .filter_map(|e| load(&e.path()).ok())
        .collect()
}

/// Interpolate `[[key]]` placeholders in `template`, substituting from
/// `values`. Missing keys resolve to the empty string.
pub fn interpolate(template: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(start) = rest.find("[[") else {
            out.push_str(rest);
            break;
        };
        let Some(end_rel) = rest[start + 2..].find("]]") else {
            out.push_str(rest);
            break;
        };
        let end = start + 2 + end_rel;
        out.push_str(&rest[..start]);
        let key = rest[start + 2..end].trim();
        out.push_str(values.get(key).map(String::as_str).unwrap_or(""));
        rest = &rest[end + 2..];
    }
    out
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
