//! Error types for the rendering pipeline.
//!
//! Nothing in here ever escapes a document render: a [`SpecParseError`] is
//! turned into an inline placeholder for the one block that produced it.
//! The types still carry full diagnostics so the CLI can point at the
//! offending line of a block body.

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use smol_str::SmolStr;

/// Which kind of visualization block a spec error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Chart,
    Viz,
}

impl SpecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKind::Chart => "chart",
            SpecKind::Viz => "viz",
        }
    }
}

impl std::fmt::Display for SpecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `chart` or `viz` block body that could not be decoded into a config.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("invalid {spec} block: {kind}")]
#[diagnostic(code(nebula::spec), severity(Warning))]
pub struct SpecParseError {
    spec: SpecKind,
    #[diagnostic_source]
    kind: SpecErrorKind,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    location: Option<SourceSpan>,
    #[help]
    advice: Option<String>,
}

impl SpecParseError {
    pub(crate) fn new(spec: SpecKind, kind: SpecErrorKind, body: &str) -> Self {
        let location = kind.line_col().map(|(line, column)| {
            SourceSpan::new(SourceOffset::from_location(body, line, column), 0)
        });
        let advice = kind.advice(spec);
        Self {
            spec,
            kind,
            src: NamedSource::new(format!("{spec} block"), body.to_string()),
            location,
            advice,
        }
    }

    /// Attach the position of the block within the document, for messages.
    pub fn with_block_index(mut self, index: usize) -> Self {
        self.src = NamedSource::new(
            format!("{} block #{}", self.spec, index + 1),
            self.src.inner().clone(),
        );
        self
    }

    pub fn spec(&self) -> SpecKind {
        self.spec
    }

    pub fn kind(&self) -> &SpecErrorKind {
        &self.kind
    }

    /// True when the body was not even well-formed JSON.
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, SpecErrorKind::Syntax(_))
    }

    /// Short human label for the inline placeholder.
    pub fn summary(&self) -> &'static str {
        match (self.spec, self.is_syntax()) {
            (SpecKind::Chart, true) => "JSON Error in Chart",
            (SpecKind::Chart, false) => "Invalid Chart Configuration",
            (SpecKind::Viz, true) => "JSON Error in Viz",
            (SpecKind::Viz, false) => "Invalid Viz Configuration",
        }
    }

    /// One-line (line, column) position inside the body, if known.
    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.kind.line_col()
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SpecErrorKind {
    #[error("malformed JSON: {0}")]
    #[diagnostic(code(nebula::spec::syntax))]
    Syntax(#[source] serde_json::Error),

    #[error("expected a JSON object at the top level")]
    #[diagnostic(code(nebula::spec::not_object))]
    NotAnObject,

    #[error("missing required field `{0}`")]
    #[diagnostic(code(nebula::spec::missing_field))]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    #[diagnostic(code(nebula::spec::wrong_type))]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("`data` must contain at least one record")]
    #[diagnostic(code(nebula::spec::empty_data))]
    EmptyData,

    #[error("record {index} has no `{key}` field")]
    #[diagnostic(code(nebula::spec::missing_category))]
    MissingCategory { index: usize, key: SmolStr },

    #[error("a pie chart needs at least one series")]
    #[diagnostic(code(nebula::spec::no_series))]
    NoSeries,

    #[error("{0}")]
    #[diagnostic(code(nebula::spec::shape))]
    Shape(#[source] serde_json::Error),
}

impl SpecErrorKind {
    fn line_col(&self) -> Option<(usize, usize)> {
        match self {
            SpecErrorKind::Syntax(err) | SpecErrorKind::Shape(err) if err.line() > 0 => {
                Some((err.line(), err.column()))
            }
            _ => None,
        }
    }

    fn advice(&self, spec: SpecKind) -> Option<String> {
        match (self, spec) {
            (SpecErrorKind::Syntax(_), _) => {
                Some("block bodies must be a single JSON object".to_string())
            }
            (SpecErrorKind::MissingField(field), SpecKind::Chart) => Some(format!(
                "chart blocks need `xKey`, `series` and `data`; `{field}` was not found"
            )),
            (SpecErrorKind::MissingField(field), SpecKind::Viz) => Some(format!(
                "viz blocks need `type`, `value` and `label`; `{field}` was not found"
            )),
            (SpecErrorKind::MissingCategory { key, .. }, _) => {
                Some(format!("every record must carry the `xKey` field (`{key}`)"))
            }
            (SpecErrorKind::Shape(_), SpecKind::Viz) => {
                Some("`type` must be \"gauge\" or \"progress\"".to_string())
            }
            _ => None,
        }
    }
}

/// Errors from the non-block parts of rendering: highlighting and theme CSS.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum RenderError {
    #[error("no syntax definition for language `{0}`")]
    #[diagnostic(code(nebula::render::unknown_language))]
    UnknownLanguage(SmolStr),

    #[error("unknown syntax theme `{0}`")]
    #[diagnostic(
        code(nebula::render::unknown_theme),
        help("use one of syntect's bundled themes, e.g. \"base16-ocean.dark\"")
    )]
    UnknownTheme(SmolStr),

    #[cfg(feature = "syntax-highlighting")]
    #[error(transparent)]
    #[diagnostic(code(nebula::render::highlight))]
    Highlight(#[from] syntect::Error),
}
