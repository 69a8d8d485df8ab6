//! Error taxonomy of the mint core.
//!
//! Gateway errors never reach the presentation layer raw: submission and
//! confirmation failures become [`FailureReason`]s inside `MintState::Failed`,
//! read failures become a transient notice on the balance view.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Input rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValidationError {
    #[error("answer must not be empty")]
    Blank,
}

/// Everything the core reports to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum MintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("connect your wallet to mint badges")]
    Session,

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("balance query failed: {0}")]
    Read(String),
}

/// Which step of the lifecycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Submission,
    Confirmation,
}

/// Display-ready explanation carried by `MintState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    pub fn submission(message: impl fmt::Display, max_len: usize) -> Self {
        Self {
            kind: FailureKind::Submission,
            message: truncate(&message.to_string(), max_len),
        }
    }

    pub fn confirmation(message: impl fmt::Display, max_len: usize) -> Self {
        Self {
            kind: FailureKind::Confirmation,
            message: truncate(&message.to_string(), max_len),
        }
    }

    pub fn into_error(self) -> MintError {
        match self.kind {
            FailureKind::Submission => MintError::Submission(self.message),
            FailureKind::Confirmation => MintError::Confirmation(self.message),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Cut `message` to at most `max_len` characters.
pub fn truncate(message: &str, max_len: usize) -> String {
    match message.char_indices().nth(max_len) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
