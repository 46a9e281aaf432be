//! Nebula renderer
//!
//! Renders markdown to HTML, turning specially tagged fenced blocks into rich
//! content: `chart` blocks become declarative chart descriptions, `viz`
//! blocks become hand-drawn gauges and progress rings, `terminal` blocks
//! become transcript panels, and everything else gets syntax highlighting.
//!
//! A block whose JSON is broken renders as an inline error placeholder. The
//! rest of the document always renders.

pub mod chart;
pub mod dispatch;
pub mod error;
#[cfg(feature = "syntax-highlighting")]
pub mod highlight;
pub mod html;
pub mod page;
pub mod radial;
pub mod spec;
pub mod svg;
pub mod theme;

use pulldown_cmark::{Options, Parser};
use pulldown_cmark_escape::FmtWriter;
use serde::{Deserialize, Serialize};

pub use crate::dispatch::{DispatchedBlock, Dispatcher, FencedBlock, RenderedBlock, fenced_blocks};
pub use crate::error::{RenderError, SpecErrorKind, SpecKind, SpecParseError};
pub use crate::theme::Theme;

/// Markdown extensions enabled on top of CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
        }
    }
}

impl RenderOptions {
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options
    }
}

/// Output of a render pass.
#[derive(Debug)]
pub struct RenderedDocument {
    pub html: String,
    /// Errors for blocks that were replaced by placeholders, in document order.
    pub failures: Vec<SpecParseError>,
}

pub struct Renderer {
    theme: Theme,
    options: RenderOptions,
    #[cfg(feature = "syntax-highlighting")]
    syntax_set: syntect::parsing::SyntaxSet,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Theme::default(), RenderOptions::default())
    }
}

impl Renderer {
    pub fn new(theme: Theme, options: RenderOptions) -> Self {
        Self {
            theme,
            options,
            #[cfg(feature = "syntax-highlighting")]
            syntax_set: syntect::parsing::SyntaxSet::load_defaults_newlines(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        #[cfg(feature = "syntax-highlighting")]
        {
            Dispatcher::new(&self.theme, &self.syntax_set)
        }
        #[cfg(not(feature = "syntax-highlighting"))]
        {
            Dispatcher::new(&self.theme)
        }
    }

    /// Render a whole document to an HTML fragment. Each call is a fresh pass
    /// over the current text.
    pub fn render(&self, markdown: &str) -> RenderedDocument {
        let parser = Parser::new_ext(markdown, self.options.parser_options()).into_offset_iter();
        let dispatcher = self.dispatcher();
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        let failures = html::HtmlWriter::new(parser, FmtWriter(&mut output), &dispatcher)
            .run()
            .unwrap_or_else(|err| {
                // A String sink only fails when a Display impl does.
                tracing::error!(error = %err, "html writer failed");
                Vec::new()
            });
        tracing::debug!(
            bytes = output.len(),
            failed_blocks = failures.len(),
            "rendered document"
        );
        RenderedDocument {
            html: output,
            failures,
        }
    }

    pub fn render_html(&self, markdown: &str) -> String {
        self.render(markdown).html
    }

    /// Every fenced block of the document with its rendered structure.
    pub fn blocks(&self, markdown: &str) -> Vec<DispatchedBlock> {
        let blocks = fenced_blocks(markdown, self.options.parser_options());
        self.dispatcher().dispatch_all(blocks)
    }

    /// Stylesheet for rendered output: base styles plus, when enabled, the
    /// syntax theme.
    pub fn stylesheet(&self) -> Result<String, RenderError> {
        #[allow(unused_mut)]
        let mut css = page::base_css(&self.theme);
        #[cfg(feature = "syntax-css")]
        {
            css.push('\n');
            css.push_str(&highlight::syntax_css(&self.theme.syntect_theme_name)?);
        }
        Ok(css)
    }

    /// Render `markdown` into a complete standalone HTML page.
    pub fn render_page(&self, title: &str, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let css = self.stylesheet()?;
        let RenderedDocument { html, failures } = self.render(markdown);
        Ok(RenderedDocument {
            html: page::wrap_page(title, &css, &html),
            failures,
        })
    }
}
