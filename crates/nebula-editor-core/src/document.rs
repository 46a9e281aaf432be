//! The markdown document buffer.
//!
//! A single `String` is the source of truth for the editor. Every mutation
//! goes through [`MarkdownDocument`] so the selection stays on char
//! boundaries and the revision counter moves forward.

use std::ops::Range;

use crate::types::{Selection, floor_char_boundary};

/// Built-in welcome document returned by stores with nothing saved.
pub const DEFAULT_DOCUMENT: &str = include_str!("default_doc.md");

/// Character and word counts for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    /// Unicode scalar values.
    pub chars: usize,
    /// Whitespace-separated non-empty tokens.
    pub words: usize,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownDocument {
    text: String,
    selection: Selection,
    revision: u64,
}

impl MarkdownDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: Selection::default(),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Bumped on every text change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.to_range()]
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(&self.text)
    }

    /// Replace the whole text. The selection is clamped to the new length.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
        self.selection = self.clamp(self.selection);
    }

    /// Splice `replacement` into `range` and return the range it now occupies.
    ///
    /// Range bounds are clamped and moved back onto char boundaries. The
    /// selection collapses to the end of the inserted text.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> Range<usize> {
        let start = floor_char_boundary(&self.text, range.start.min(range.end));
        let end = floor_char_boundary(&self.text, range.end.max(range.start));
        self.text.replace_range(start..end, replacement);
        self.revision += 1;
        let inserted = start..start + replacement.len();
        self.selection = Selection::collapsed(inserted.end);
        inserted
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = self.clamp(selection);
    }

    fn clamp(&self, selection: Selection) -> Selection {
        Selection::new(
            floor_char_boundary(&self.text, selection.anchor),
            floor_char_boundary(&self.text, selection.head),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let doc = MarkdownDocument::new("héllo  wörld\n\n- item");
        let stats = doc.stats();
        assert_eq!(stats.chars, 20);
        assert_eq!(stats.words, 4);
        assert_eq!(MarkdownDocument::default().stats(), DocumentStats::default());
    }

    #[test]
    fn test_replace_range_moves_selection() {
        let mut doc = MarkdownDocument::new("foo bar foo");
        let inserted = doc.replace_range(0..3, "baz");
        assert_eq!(doc.text(), "baz bar foo");
        assert_eq!(inserted, 0..3);
        assert_eq!(doc.selection(), Selection::collapsed(3));
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut doc = MarkdownDocument::new("aé");
        doc.set_selection(Selection::new(0, 2));
        assert_eq!(doc.selection(), Selection::new(0, 1));
        doc.set_selection(Selection::new(50, 0));
        assert_eq!(doc.selection(), Selection::new(3, 0));
        assert_eq!(doc.selected_text(), "aé");

        doc.set_text("a");
        assert_eq!(doc.selection(), Selection::new(1, 0));
    }

    #[test]
    fn test_default_document_has_every_block_kind() {
        for tag in ["```chart", "```viz", "```terminal"] {
            assert!(DEFAULT_DOCUMENT.contains(tag), "missing {tag}");
        }
        assert!(DEFAULT_DOCUMENT.contains("\"CPU Load\""));
        assert!(DEFAULT_DOCUMENT.contains("\"Disk Space\""));
    }
}
