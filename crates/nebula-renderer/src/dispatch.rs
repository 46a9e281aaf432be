//! Routing of fenced code blocks to their renderers.
//!
//! Every fenced block in the document becomes a [`FencedBlock`], is
//! classified by its tag, and is turned into exactly one [`RenderedBlock`].
//! A block that fails to decode becomes [`RenderedBlock::Failed`]; nothing a
//! single block contains can stop the rest of the document from rendering.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use smol_str::SmolStr;

use crate::chart::{self, ChartSpec};
use crate::error::SpecParseError;
use crate::radial::{self, RadialScene};
use crate::spec::{BlockTag, Decoded, decode};
use crate::theme::Theme;

/// A fenced code block as found in the source, rebuilt on every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FencedBlock {
    /// Position among the document's code blocks, starting at 0.
    pub index: usize,
    pub tag: BlockTag,
    /// Block contents without the fences and without the final newline.
    pub body: String,
    /// Byte range of the whole block, fences included.
    pub range: Range<usize>,
}

impl FencedBlock {
    pub(crate) fn new(index: usize, kind: &CodeBlockKind<'_>, mut body: String, range: Range<usize>) -> Self {
        let tag = match kind {
            CodeBlockKind::Fenced(info) => BlockTag::from_info(info),
            CodeBlockKind::Indented => BlockTag::Plain,
        };
        if body.ends_with('\n') {
            body.pop();
        }
        Self {
            index,
            tag,
            body,
            range,
        }
    }
}

/// Collect every code block in `markdown`, in document order.
pub fn fenced_blocks(markdown: &str, options: Options) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(CodeBlockKind<'_>, String, usize)> = None;

    for (event, range) in Parser::new_ext(markdown, options).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                current = Some((kind, String::new(), range.start));
            }
            Event::Text(text) => {
                if let Some((_, body, _)) = current.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((kind, body, start)) = current.take() {
                    blocks.push(FencedBlock::new(blocks.len(), &kind, body, start..range.end));
                }
            }
            _ => {}
        }
    }
    blocks
}

/// The outcome of rendering one fenced block.
#[derive(Debug, Serialize)]
#[serde(tag = "block", rename_all = "lowercase")]
pub enum RenderedBlock {
    Chart(ChartSpec),
    Radial {
        label: SmolStr,
        scene: RadialScene,
    },
    Terminal {
        text: String,
    },
    Code {
        lang: SmolStr,
        text: String,
        /// Highlighted span markup, when the language is known.
        #[serde(skip_serializing_if = "Option::is_none")]
        highlighted: Option<String>,
    },
    Plain {
        text: String,
    },
    Failed(BlockFailure),
}

impl RenderedBlock {
    pub fn is_failed(&self) -> bool {
        matches!(self, RenderedBlock::Failed(_))
    }
}

/// Inline stand-in for a block whose spec could not be decoded.
#[derive(Debug, Serialize)]
pub struct BlockFailure {
    pub summary: &'static str,
    pub detail: String,
    #[serde(skip)]
    pub error: SpecParseError,
}

impl From<SpecParseError> for BlockFailure {
    fn from(error: SpecParseError) -> Self {
        Self {
            summary: error.summary(),
            detail: error.kind().to_string(),
            error,
        }
    }
}

/// A block together with where it came from.
#[derive(Debug, Serialize)]
pub struct DispatchedBlock {
    pub index: usize,
    pub tag: BlockTag,
    pub range: Range<usize>,
    pub rendered: RenderedBlock,
}

/// Routes blocks to the chart adapter, the radial engine, the highlighter or
/// the plain writers.
pub struct Dispatcher<'r> {
    theme: &'r Theme,
    #[cfg(feature = "syntax-highlighting")]
    syntax_set: &'r syntect::parsing::SyntaxSet,
}

impl<'r> Dispatcher<'r> {
    #[cfg(feature = "syntax-highlighting")]
    pub fn new(theme: &'r Theme, syntax_set: &'r syntect::parsing::SyntaxSet) -> Self {
        Self { theme, syntax_set }
    }

    #[cfg(not(feature = "syntax-highlighting"))]
    pub fn new(theme: &'r Theme) -> Self {
        Self { theme }
    }

    pub fn dispatch(&self, block: &FencedBlock) -> RenderedBlock {
        match decode(&block.tag, &block.body) {
            Ok(Decoded::Chart(config)) => {
                tracing::debug!(index = block.index, kind = ?config.kind, "rendering chart block");
                RenderedBlock::Chart(chart::render(&config, &self.theme.chart))
            }
            Ok(Decoded::Radial(config)) => {
                tracing::debug!(index = block.index, kind = ?config.kind, "rendering viz block");
                RenderedBlock::Radial {
                    scene: radial::layout(&config, &self.theme.radial, &self.theme.fonts),
                    label: config.label,
                }
            }
            Ok(Decoded::PassThrough) => self.pass_through(block),
            Err(error) => {
                let error = error.with_block_index(block.index);
                tracing::warn!(
                    index = block.index,
                    tag = block.tag.as_str(),
                    error = %error,
                    "block failed to decode, rendering placeholder"
                );
                RenderedBlock::Failed(error.into())
            }
        }
    }

    pub fn dispatch_all(&self, blocks: Vec<FencedBlock>) -> Vec<DispatchedBlock> {
        blocks
            .into_iter()
            .map(|block| DispatchedBlock {
                rendered: self.dispatch(&block),
                index: block.index,
                tag: block.tag,
                range: block.range,
            })
            .collect()
    }

    fn pass_through(&self, block: &FencedBlock) -> RenderedBlock {
        match &block.tag {
            BlockTag::Terminal => RenderedBlock::Terminal {
                text: block.body.clone(),
            },
            BlockTag::Code(lang) => RenderedBlock::Code {
                lang: lang.clone(),
                text: block.body.clone(),
                highlighted: self.highlight(lang, &block.body),
            },
            BlockTag::Plain | BlockTag::Chart | BlockTag::Viz => RenderedBlock::Plain {
                text: block.body.clone(),
            },
        }
    }

    #[cfg(feature = "syntax-highlighting")]
    fn highlight(&self, lang: &str, code: &str) -> Option<String> {
        let mut output = String::new();
        match crate::highlight::highlight(self.syntax_set, lang, code, &mut output) {
            Ok(()) => Some(output),
            Err(err) => {
                tracing::debug!(lang, error = %err, "no highlighting for code block");
                None
            }
        }
    }

    #[cfg(not(feature = "syntax-highlighting"))]
    fn highlight(&self, _lang: &str, _code: &str) -> Option<String> {
        None
    }
}
