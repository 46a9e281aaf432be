//! nebula-editor-core: editor logic without a UI framework.
//!
//! This crate provides:
//! - `MarkdownDocument` - the single text buffer and its selection
//! - `FindReplace` - literal, case-insensitive incremental search
//! - Formatting actions and the keyboard shortcut map
//! - `AppState` - the application state store driven by `Command`s
//! - Collaborator traits for persistence, AI rewriting and export

pub mod actions;
pub mod ai;
pub mod app;
pub mod document;
pub mod error;
pub mod export;
pub mod keymap;
pub mod search;
pub mod store;
pub mod types;

pub use actions::{FormatAction, Key, KeyCombo, Modifiers, apply_format};
pub use ai::{AiAction, AiRewriter, RewriteRequest, apply_rewrite, request_rewrite};
pub use app::{AppState, Command, Effect, EditorMode, StatusMessage};
pub use document::{DEFAULT_DOCUMENT, DocumentStats, MarkdownDocument};
pub use error::{ExportError, RewriteError, StoreError};
pub use export::{ExportKind, Exporter, MarkdownFileExporter};
pub use keymap::Keymap;
pub use search::{FindReplace, SearchMode, find_matches};
pub use smol_str::SmolStr;
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use types::{Selection, line_col};
