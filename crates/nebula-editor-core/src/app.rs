//! Application state and its command handlers.
//!
//! [`AppState`] owns everything the editor shell shows. Input becomes a
//! [`Command`], [`AppState::update`] applies it and returns an [`Effect`]
//! for the shell to carry out (select text, persist, export, call the AI
//! rewriter). Results of those effects come back through
//! [`AppState::finish_rewrite`] and [`AppState::finish_export`].

use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::actions::{FormatAction, apply_format};
use crate::ai::{AiAction, RewriteRequest, apply_rewrite};
use crate::document::{DocumentStats, MarkdownDocument};
use crate::error::{ExportError, RewriteError};
use crate::export::ExportKind;
use crate::search::FindReplace;
use crate::types::Selection;

const SAVE_STATUS_TTL: Duration = Duration::from_secs(2);
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Which panes are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Edit,
    #[default]
    Split,
    Preview,
}

impl EditorMode {
    pub fn shows_editor(&self) -> bool {
        matches!(self, EditorMode::Edit | EditorMode::Split)
    }

    pub fn shows_preview(&self) -> bool {
        matches!(self, EditorMode::Split | EditorMode::Preview)
    }
}

/// Transient status bar text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    /// `None` stays until replaced.
    pub expires_at: Option<Instant>,
}

impl StatusMessage {
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetMode(EditorMode),
    ToggleSearch,
    CloseSearch,
    SetQuery(String),
    SetReplacement(String),
    NextMatch,
    PreviousMatch,
    ReplaceCurrent,
    ReplaceAll,
    ToggleAiMenu,
    ToggleExportMenu,
    /// Replace the whole text, as typed into the editor surface.
    Edit(String),
    Select(Selection),
    Format(FormatAction),
    Save,
    Export(ExportKind),
    RequestAi(AiAction),
    Escape,
}

/// Work for the embedding shell after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Move the editor selection to this byte range.
    Select(Range<usize>),
    /// Persist this text.
    Save(String),
    Export(ExportKind, String),
    /// Send this request to the AI rewriter, then call `finish_rewrite`.
    Rewrite(RewriteRequest),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    document: MarkdownDocument,
    mode: EditorMode,
    search: FindReplace,
    replacement: String,
    ai_menu_open: bool,
    export_menu_open: bool,
    ai_pending: Option<AiAction>,
    status: Option<StatusMessage>,
}

impl AppState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            document: MarkdownDocument::new(text),
            ..Self::default()
        }
    }

    pub fn document(&self) -> &MarkdownDocument {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn search(&self) -> &FindReplace {
        &self.search
    }

    pub fn search_open(&self) -> bool {
        self.search.is_searching()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn ai_menu_open(&self) -> bool {
        self.ai_menu_open
    }

    pub fn export_menu_open(&self) -> bool {
        self.export_menu_open
    }

    pub fn ai_pending(&self) -> Option<AiAction> {
        self.ai_pending
    }

    pub fn stats(&self) -> DocumentStats {
        self.document.stats()
    }

    /// Status text still showing at `now`.
    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|msg| msg.is_live(now))
            .map(|msg| msg.text.as_str())
    }

    fn set_status(&mut self, text: &str, ttl: Option<Duration>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            expires_at: ttl.map(|ttl| now + ttl),
        });
    }

    pub fn update(&mut self, command: Command) -> Effect {
        self.update_at(command, Instant::now())
    }

    /// Apply `command` with `now` as the current time for status expiry.
    pub fn update_at(&mut self, command: Command, now: Instant) -> Effect {
        tracing::trace!(?command, "update");
        match command {
            Command::SetMode(mode) => {
                self.mode = mode;
                Effect::None
            }
            Command::ToggleSearch => {
                if self.search.is_searching() {
                    self.search.close();
                } else {
                    self.search.open(&self.document);
                }
                Effect::None
            }
            Command::CloseSearch => {
                self.search.close();
                Effect::None
            }
            Command::SetQuery(query) => {
                self.search.set_query(query, &self.document);
                Effect::None
            }
            Command::SetReplacement(replacement) => {
                self.replacement = replacement;
                Effect::None
            }
            Command::NextMatch => {
                let found = self.search.next_match();
                self.select_match(found)
            }
            Command::PreviousMatch => {
                let found = self.search.previous_match();
                self.select_match(found)
            }
            Command::ReplaceCurrent => {
                self.search.replace_current(&mut self.document, &self.replacement);
                Effect::None
            }
            Command::ReplaceAll => {
                self.search.replace_all(&mut self.document, &self.replacement);
                Effect::None
            }
            Command::ToggleAiMenu => {
                self.ai_menu_open = !self.ai_menu_open;
                self.export_menu_open = false;
                Effect::None
            }
            Command::ToggleExportMenu => {
                self.export_menu_open = !self.export_menu_open;
                self.ai_menu_open = false;
                Effect::None
            }
            Command::Edit(text) => {
                self.document.set_text(text);
                self.search.refresh(&self.document);
                Effect::None
            }
            Command::Select(selection) => {
                self.document.set_selection(selection);
                Effect::None
            }
            Command::Format(action) => {
                let selection = apply_format(&mut self.document, action);
                self.search.refresh(&self.document);
                Effect::Select(selection.to_range())
            }
            Command::Save => {
                self.set_status("Document saved locally.", Some(SAVE_STATUS_TTL), now);
                Effect::Save(self.document.text().to_string())
            }
            Command::Export(kind) => self.begin_export(kind, now),
            Command::RequestAi(action) => match self.begin_rewrite(action, now) {
                Ok(request) => Effect::Rewrite(request),
                Err(err) => {
                    tracing::debug!(error = %err, ?action, "rewrite refused");
                    Effect::None
                }
            },
            Command::Escape => {
                self.search.close();
                self.ai_menu_open = false;
                self.export_menu_open = false;
                Effect::None
            }
        }
    }

    fn select_match(&mut self, found: Option<Range<usize>>) -> Effect {
        match found {
            Some(range) => {
                self.document.set_selection(range.clone().into());
                Effect::Select(range)
            }
            None => Effect::None,
        }
    }

    /// Start an AI rewrite of the whole document. Only one may be pending.
    pub fn begin_rewrite(
        &mut self,
        action: AiAction,
        now: Instant,
    ) -> Result<RewriteRequest, RewriteError> {
        if self.ai_pending.is_some() {
            return Err(RewriteError::Busy);
        }
        self.ai_pending = Some(action);
        self.ai_menu_open = false;
        self.set_status("AI is thinking...", None, now);
        Ok(RewriteRequest {
            action,
            text: self.document.text().to_string(),
        })
    }

    /// Merge the rewriter's answer. Returns false when no rewrite was pending.
    pub fn finish_rewrite(&mut self, result: Result<String, RewriteError>, now: Instant) -> bool {
        let Some(action) = self.ai_pending.take() else {
            return false;
        };
        match result {
            Ok(response) => {
                let merged = apply_rewrite(action, self.document.text(), &response);
                self.document.set_text(merged);
                self.search.refresh(&self.document);
                self.set_status("AI operation complete.", Some(STATUS_TTL), now);
            }
            Err(err) => {
                tracing::warn!(error = %err, ?action, "AI rewrite failed");
                self.set_status("AI operation failed.", Some(STATUS_TTL), now);
            }
        }
        true
    }

    fn begin_export(&mut self, kind: ExportKind, now: Instant) -> Effect {
        self.export_menu_open = false;
        if kind == ExportKind::Image {
            if !self.mode.shows_preview() {
                self.set_status(
                    "Error: Switch to Preview mode to export image.",
                    Some(STATUS_TTL),
                    now,
                );
                return Effect::None;
            }
            self.set_status("Generating image...", None, now);
        }
        Effect::Export(kind, self.document.text().to_string())
    }

    pub fn finish_export(
        &mut self,
        kind: ExportKind,
        result: Result<PathBuf, ExportError>,
        now: Instant,
    ) {
        let text = match (&result, kind) {
            (Ok(_), ExportKind::Markdown) => "Document exported successfully.",
            (Ok(_), ExportKind::Image) => "Image exported successfully.",
            (Err(_), ExportKind::Markdown) => "Export failed.",
            (Err(_), ExportKind::Image) => "Failed to generate image.",
        };
        if let Err(err) = &result {
            tracing::warn!(error = %err, kind = kind.as_str(), "export failed");
        }
        self.set_status(text, Some(STATUS_TTL), now);
    }
}
