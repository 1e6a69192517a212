// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-provider readback configuration: the ready-prompt
//! regex and marker templates are never hard-coded into the Reader — they are
//! held here, one `ProviderProfile` per provider key, keeping provider-specific
//! detection separate from the generic polling loop.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Launch command and readback configuration for one provider CLI.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub key: &'static str,
    /// Command + args used to launch the provider inside a fresh session.
    pub launch_command: Vec<String>,
    /// Matches the last non-empty line of the pane when the agent is idle
    /// and ready for input.
    pub ready_prompt: Regex,
}

fn profile(key: &'static str, launch_command: &[&str], ready_prompt: &str) -> ProviderProfile {
    // Patterns are fixed string literals below, not user input; a bad one
    // is a programmer error caught by `provider_tests::every_builtin_profile_compiles_and_resolves`.
    #[allow(clippy::expect_used)]
    let ready_prompt = Regex::new(ready_prompt).expect("built-in provider regex is valid");
    ProviderProfile { key, launch_command: launch_command.iter().map(|s| s.to_string()).collect(), ready_prompt }
}

static PROFILES: LazyLock<HashMap<&'static str, ProviderProfile>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for p in [
        profile("claude_code", &["claude"], r"^\s*>\s*$|^\s*❯\s*$"),
        profile("codex_cli", &["codex"], r"^\s*▌\s*$|^\s*codex>\s*$"),
        profile("gemini_cli", &["gemini"], r"^\s*>\s*$|Type your message"),
        profile("q_cli", &["q", "chat"], r"^\s*>\s*$"),
        profile("kiro_cli", &["kiro"], r"^\s*>\s*$|^\s*kiro›\s*$"),
    ] {
        map.insert(p.key, p);
    }
    map
});

/// Look up a provider by key. Unknown providers fall back to `q_cli`'s
/// generic `>` prompt, matching the launcher's "best effort" policy for
/// providers that have not shipped a dedicated profile yet.
pub fn lookup(key: &str) -> &'static ProviderProfile {
    // `q_cli` is inserted unconditionally by the PROFILES initializer above.
    #[allow(clippy::expect_used)]
    PROFILES.get(key).unwrap_or_else(|| PROFILES.get("q_cli").expect("q_cli is always registered"))
}

/// The completion marker an injected task is told to print on success.
pub fn completion_marker(terminal_id: &str) -> String {
    format!("<<CAO:{terminal_id}:DONE>>")
}

/// The error marker an injected task is told to print on failure.
pub fn error_marker(terminal_id: &str) -> String {
    format!("<<CAO:{terminal_id}:ERR>>")
}

/// Build the full injected text for a task body: the body followed by the
/// sentinel instructing the agent to emit the completion/error markers.
pub fn with_markers(terminal_id: &str, body: &str) -> String {
    format!(
        "{body}\n\nWhen you have fully completed this task, print the exact line `{done}` \
         on its own line. If you cannot complete it, print the exact line `{err}` on its \
         own line instead, followed by a short explanation.",
        body = body,
        done = completion_marker(terminal_id),
        err = error_marker(terminal_id),
    )
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
