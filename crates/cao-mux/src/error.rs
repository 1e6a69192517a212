// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failure kinds a [`crate::MuxAdapter`] implementation can report, named so
/// the HTTP layer can map them to `ErrorCode::MuxUnavailable` without
/// re-classifying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MuxError {
    #[error("multiplexer unavailable: {0}")]
    Unavailable(String),
    #[error("session already exists: {0}")]
    SessionExists(String),
    #[error("session missing: {0}")]
    SessionMissing(String),
    #[error("exec failure: {0}")]
    ExecFailure(String),
}

pub type MuxResult<T> = Result<T, MuxError>;
