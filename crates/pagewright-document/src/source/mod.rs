// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source module — normalises one input file into a typed page source.

pub mod adapter;
pub mod matcher;

use std::path::Path;

use pagewright_core::error::Result;

pub use adapter::SourceAdapter;
pub use matcher::{FormatMatcher, SourceKind};

/// One user-selected input file.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name as selected, used for extension dispatch and placeholders.
    pub name: String,
    /// Declared MIME type, if the picker supplied one.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk. No MIME type is declared; dispatch falls back to
    /// the extension.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            mime: None,
            bytes,
        })
    }
}

/// Normalised intermediate representation of one input file.
///
/// Immutable once produced and consumed exactly once by the assembly engine.
#[derive(Debug)]
pub enum PageSource {
    Text(String),
    Image {
        bitmap: ::image::RgbImage,
        width: u32,
        height: u32,
    },
    /// Ordered rows of ordered cells.
    RowTable(Vec<Vec<String>>),
    ExistingDocument {
        document: lopdf::Document,
        page_count: usize,
    },
}

impl PageSource {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::RowTable(_) => "row-table",
            Self::ExistingDocument { .. } => "existing-document",
        }
    }
}

/// A page source together with where it came from.
#[derive(Debug)]
pub struct AdaptedSource {
    pub name: String,
    /// The handler that produced the source, `Unknown` for placeholders.
    pub kind: SourceKind,
    pub source: PageSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_takes_name_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let input = InputFile::read(&path).await.unwrap();
        assert_eq!(input.name, "notes.txt");
        assert!(input.mime.is_none());
        assert_eq!(input.bytes, b"hello");
    }

    #[tokio::test]
    async fn read_missing_file_is_io_error() {
        let err = InputFile::read("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, pagewright_core::PagewrightError::Io(_)));
    }
}
