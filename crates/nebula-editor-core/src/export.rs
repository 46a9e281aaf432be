//! Document export.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// The raw markdown text.
    Markdown,
    /// A raster capture of the rendered preview.
    Image,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Markdown => "markdown",
            ExportKind::Image => "image",
        }
    }
}

pub trait Exporter {
    /// Export `text` and return where it went.
    fn export(&self, kind: ExportKind, text: &str) -> Result<PathBuf, ExportError>;
}

/// Writes markdown exports into a directory.
#[derive(Debug, Clone)]
pub struct MarkdownFileExporter {
    dir: PathBuf,
    file_name: String,
}

impl MarkdownFileExporter {
    pub const DEFAULT_FILE_NAME: &'static str = "document.md";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

impl Exporter for MarkdownFileExporter {
    fn export(&self, kind: ExportKind, text: &str) -> Result<PathBuf, ExportError> {
        if kind != ExportKind::Markdown {
            return Err(ExportError::Unsupported(kind.as_str()));
        }
        let path = self.dir.join(&self.file_name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, text))
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "exported document");
        Ok(path)
    }
}
