// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn loads_profile_with_front_matter() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("reviewer.md"),
        "---\nname: reviewer\nprovider: claude_code\n---\nYou are a meticulous code reviewer.\n",
    )
    .unwrap();

    let profile = load(dir.path(), "reviewer").unwrap();
    assert_eq!(profile.meta.name, "reviewer");
    assert_eq!(profile.meta.provider.as_deref(), Some("claude_code"));
    assert!(profile.body.contains("meticulous code reviewer"));
}

#[test]
fn missing_profile_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path(), "nope").unwrap_err();
    assert!(matches!(err, ProfileError::NotFound(_)));
}

#[test]
fn missing_front_matter_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bare.md"), "no front matter here").unwrap();
    let err = load(dir.path(), "bare").unwrap_err();
    assert!(matches!(err, ProfileError::MissingFrontMatter(_)));
}

#[test]
fn list_returns_md_stems() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("reviewer.md"), "---\nname: reviewer\n---\nbody").unwrap();
    std::fs::write(dir.path().join("developer.md"), "---\nname: developer\n---\nbody").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let mut names = list(dir.path());
    names.sort();
    assert_eq!(names, vec!["developer".to_string(), "reviewer".to_string()]);
}
