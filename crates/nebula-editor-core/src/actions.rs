//! Formatting actions and keyboard input types.
//!
//! Formatting wraps or prefixes the current selection with markdown syntax
//! and leaves a selection the caller can restore in its text surface.
//! Key types are platform-agnostic; platform code converts native events.

use smol_str::SmolStr;

use crate::document::MarkdownDocument;
use crate::types::Selection;

/// Markdown formatting applied to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatAction {
    /// `**sel**`
    Bold,
    /// `*sel*`
    Italic,
    /// `[sel](url)`
    Link,
    /// Fenced code block around the selection.
    CodeBlock,
    /// `- ` before every selected line.
    List,
}

/// Markdown inserted for `action` around `selected`, and where the selection
/// lands relative to the start of the inserted text.
fn format_text(action: FormatAction, selected: &str) -> (String, std::ops::Range<usize>) {
    let len = selected.len();
    match action {
        FormatAction::Bold => (format!("**{selected}**"), 2..2 + len),
        FormatAction::Italic => (format!("*{selected}*"), 1..1 + len),
        FormatAction::Link => (format!("[{selected}](url)"), 1..1 + len),
        FormatAction::CodeBlock => (format!("\n```\n{selected}\n```\n"), 5..5 + len),
        FormatAction::List => {
            let listed = selected
                .split('\n')
                .map(|line| format!("- {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            let end = listed.len();
            (listed, 0..end)
        }
    }
}

/// Apply `action` to the document's selection and select the formatted text.
///
/// Returns the new selection, which is also stored on the document.
pub fn apply_format(doc: &mut MarkdownDocument, action: FormatAction) -> Selection {
    let range = doc.selection().to_range();
    let (inserted, relative) = format_text(action, doc.selected_text());
    let start = range.start;
    doc.replace_range(range, &inserted);
    let selection = Selection::new(start + relative.start, start + relative.end);
    doc.set_selection(selection);
    tracing::trace!(?action, ?selection, "applied format");
    selection
}

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key, as produced by the platform (any case).
    Character(SmolStr),
    Escape,
    Space,
    Enter,
    Tab,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Unidentified,
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Whether this is the character key `c`, ignoring case.
    pub fn is_char(&self, c: char) -> bool {
        match self {
            Self::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
            }
            _ => false,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    pub const META_SHIFT: Self = Self {
        meta: true,
        shift: true,
        ..Self::NONE
    };

    /// Primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    pub fn primary_shift(is_mac: bool) -> Self {
        if is_mac {
            Self::META_SHIFT
        } else {
            Self::CTRL_SHIFT
        }
    }
}

/// A key together with the modifiers held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn primary(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary(is_mac))
    }

    pub fn primary_shift(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary_shift(is_mac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(text: &str, sel: Selection, action: FormatAction) -> (String, Selection) {
        let mut doc = MarkdownDocument::new(text);
        doc.set_selection(sel);
        let selection = apply_format(&mut doc, action);
        assert_eq!(doc.selection(), selection);
        (doc.text().to_string(), selection)
    }

    #[test]
    fn test_bold_and_italic() {
        let (text, sel) = formatted("say hello now", Selection::new(4, 9), FormatAction::Bold);
        assert_eq!(text, "say **hello** now");
        assert_eq!(sel, Selection::new(6, 11));

        let (text, sel) = formatted("say hello now", Selection::new(9, 4), FormatAction::Italic);
        assert_eq!(text, "say *hello* now");
        assert_eq!(sel, Selection::new(5, 10));
    }

    #[test]
    fn test_bold_on_caret_inserts_markers() {
        let (text, sel) = formatted("ab", Selection::collapsed(1), FormatAction::Bold);
        assert_eq!(text, "a****b");
        assert_eq!(sel, Selection::collapsed(3));
    }

    #[test]
    fn test_link_selects_text_part() {
        let (text, sel) = formatted("see docs", Selection::new(4, 8), FormatAction::Link);
        assert_eq!(text, "see [docs](url)");
        assert_eq!(&text[sel.to_range()], "docs");
    }

    #[test]
    fn test_code_block() {
        let (text, sel) = formatted("x let y = 1;", Selection::new(2, 12), FormatAction::CodeBlock);
        assert_eq!(text, "x \n```\nlet y = 1;\n```\n");
        assert_eq!(&text[sel.to_range()], "let y = 1;");
    }

    #[test]
    fn test_list_prefixes_every_line() {
        let (text, sel) = formatted("one\ntwo\nthree", Selection::new(0, 13), FormatAction::List);
        assert_eq!(text, "- one\n- two\n- three");
        assert_eq!(sel, Selection::new(0, 19));
    }

    #[test]
    fn test_key_is_char_ignores_case() {
        assert!(Key::character("B").is_char('b'));
        assert!(Key::character("b").is_char('b'));
        assert!(!Key::character("bb").is_char('b'));
        assert!(!Key::Escape.is_char('b'));
        assert_eq!(
            KeyCombo::primary(Key::Space, true).modifiers,
            Modifiers::META
        );
        assert_eq!(
            KeyCombo::primary_shift(Key::character("e"), false).modifiers,
            Modifiers::CTRL_SHIFT
        );
    }
}
