// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewright.

use thiserror::Error;

/// Top-level error type for all Pagewright operations.
#[derive(Debug, Error)]
pub enum PagewrightError {
    // -- Input errors --
    /// No handler matched the input. Absorbed by the source adapter, which
    /// substitutes a placeholder page; never fatal to a job.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("word-processor document is unreadable: {0}")]
    UnreadableDocument(String),

    #[error("workbook is unreadable: {0}")]
    UnreadableWorkbook(String),

    #[error("input document is corrupt: {0}")]
    CorruptInput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image decoding failed: {0}")]
    Image(String),

    // -- Assembly errors --
    #[error("assembled document is empty")]
    EmptyOutput,

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Pipeline errors --
    #[error("a finished job must be reset before starting another")]
    PipelineBusy,

    #[error("no active conversion job")]
    NoActiveJob,

    #[error("conversion job was cancelled")]
    Cancelled,

    // -- Viewer errors --
    #[error("document could not be rendered: {0}")]
    RenderError(String),

    // -- Collaborators --
    #[error("collaborator not available: {0}")]
    CollaboratorUnavailable(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PagewrightError {
    /// Whether this error ends the job it occurred in.
    ///
    /// Only [`PagewrightError::UnsupportedFormat`] is recoverable; the adapter
    /// degrades it to a placeholder page.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnsupportedFormat(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewrightError>;
