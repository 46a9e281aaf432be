//! Document persistence.
//!
//! Stores hand back the last saved text, or the built-in welcome document
//! when nothing has been saved yet.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::document::DEFAULT_DOCUMENT;
use crate::error::StoreError;

pub trait DocumentStore {
    /// Last saved text, or [`DEFAULT_DOCUMENT`].
    fn load(&self) -> Result<String, StoreError>;

    fn save(&self, text: &str) -> Result<(), StoreError>;
}

/// Unit type implementation - nothing persists, every load is the default.
impl DocumentStore for () {
    fn load(&self) -> Result<String, StoreError> {
        Ok(DEFAULT_DOCUMENT.to_string())
    }

    fn save(&self, _text: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Keeps the saved text in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            saved: Mutex::new(Some(text.into())),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<String, StoreError> {
        let saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(saved.clone().unwrap_or_else(|| DEFAULT_DOCUMENT.to_string()))
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        let mut saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *saved = Some(text.to_string());
        Ok(())
    }
}

/// Plain UTF-8 file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<String, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved document, using default");
                Ok(DEFAULT_DOCUMENT.to_string())
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, text).map_err(write_err)?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "saved document");
        Ok(())
    }
}
