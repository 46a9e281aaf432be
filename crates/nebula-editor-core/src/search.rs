//! Incremental find and replace.
//!
//! Matching is literal and case-insensitive: the query is escaped before it
//! becomes a regex. Matches are recomputed from scratch whenever the
//! document or the query changes and are never shifted in place.

use std::ops::Range;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::document::MarkdownDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Idle,
    Searching,
}

/// Find/replace state over a [`MarkdownDocument`].
///
/// Holds no copy of the text. Match ranges are byte ranges into the
/// document as it was at the last recompute.
#[derive(Debug, Clone, Default)]
pub struct FindReplace {
    mode: SearchMode,
    query: String,
    matches: Vec<Range<usize>>,
    current: Option<usize>,
}

/// Regex matching `query` literally, ignoring case. `None` for an empty query.
pub fn literal_pattern(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(error = %err, "search pattern rejected, treating as no matches");
            None
        }
    }
}

/// All non-overlapping literal matches of `query` in `text`, in order.
pub fn find_matches(text: &str, query: &str) -> Vec<Range<usize>> {
    literal_pattern(query)
        .map(|regex| regex.find_iter(text).map(|m| m.range()).collect())
        .unwrap_or_default()
}

/// Next index in a circular list of `len` entries. From no index, the first.
pub fn step_forward(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) => (i + 1) % len,
        None => 0,
    })
}

/// Previous index in a circular list of `len` entries. From no index, the last.
pub fn step_backward(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) => (i + len - 1) % len,
        None => len - 1,
    })
}

impl FindReplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_searching(&self) -> bool {
        self.mode == SearchMode::Searching
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[Range<usize>] {
        &self.matches
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_match(&self) -> Option<Range<usize>> {
        self.current.and_then(|i| self.matches.get(i).cloned())
    }

    /// Enter searching mode. Re-opening keeps the query and the current match.
    pub fn open(&mut self, doc: &MarkdownDocument) {
        self.mode = SearchMode::Searching;
        self.recompute(doc);
    }

    /// Back to idle. The document is never touched.
    pub fn close(&mut self) {
        self.mode = SearchMode::Idle;
    }

    pub fn set_query(&mut self, query: impl Into<String>, doc: &MarkdownDocument) {
        self.query = query.into();
        self.recompute(doc);
    }

    /// Recompute after the document changed. Runs while idle too, so the
    /// match offsets always describe the current text.
    pub fn refresh(&mut self, doc: &MarkdownDocument) {
        self.recompute(doc);
    }

    fn recompute(&mut self, doc: &MarkdownDocument) {
        self.matches = find_matches(doc.text(), &self.query);
        self.current = match self.current {
            _ if self.matches.is_empty() => None,
            Some(i) if i < self.matches.len() => Some(i),
            _ => Some(0),
        };
        tracing::trace!(
            query = %self.query,
            matches = self.matches.len(),
            current = ?self.current,
            "search recomputed"
        );
    }

    /// Advance to the next match, wrapping around. Returns the span to select.
    pub fn next_match(&mut self) -> Option<Range<usize>> {
        if !self.is_searching() {
            return None;
        }
        self.current = step_forward(self.current, self.matches.len());
        self.current_match()
    }

    /// Step back to the previous match, wrapping around.
    pub fn previous_match(&mut self) -> Option<Range<usize>> {
        if !self.is_searching() {
            return None;
        }
        self.current = step_backward(self.current, self.matches.len());
        self.current_match()
    }

    /// Make match `index` current. Out of range leaves the state unchanged.
    pub fn set_current(&mut self, index: usize) -> Option<Range<usize>> {
        let range = self.matches.get(index).cloned()?;
        self.current = Some(index);
        Some(range)
    }

    /// Splice `replacement` into the current match. Returns false, leaving
    /// the document alone, while idle or when there is no current match.
    pub fn replace_current(&mut self, doc: &mut MarkdownDocument, replacement: &str) -> bool {
        if !self.is_searching() {
            return false;
        }
        let Some(range) = self.current_match() else {
            return false;
        };
        doc.replace_range(range, replacement);
        self.recompute(doc);
        true
    }

    /// Replace every match in one substitution. Returns how many were replaced.
    pub fn replace_all(&mut self, doc: &mut MarkdownDocument, replacement: &str) -> usize {
        if !self.is_searching() {
            return 0;
        }
        let Some(regex) = literal_pattern(&self.query) else {
            return 0;
        };
        let count = regex.find_iter(doc.text()).count();
        if count > 0 {
            let replaced = regex.replace_all(doc.text(), NoExpand(replacement)).into_owned();
            doc.set_text(replaced);
        }
        self.recompute(doc);
        tracing::debug!(count, "replaced all matches");
        count
    }
}
