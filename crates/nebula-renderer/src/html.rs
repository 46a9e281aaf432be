//! HTML writer for a markdown event stream.
//!
//! Prose gets plain semantic markup with a few structural classes. Code
//! blocks are buffered until their end tag, handed to the [`Dispatcher`],
//! and written as charts, radial SVGs, terminal panels, highlighted code or
//! error placeholders.

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, LinkType, Tag, TagEnd};
use pulldown_cmark_escape::{StrWrite, escape_href, escape_html, escape_html_body_text};

use crate::chart::{ChartSpec, Plot};
use crate::dispatch::{BlockFailure, Dispatcher, FencedBlock, RenderedBlock};
use crate::error::SpecParseError;

enum TableState {
    Head,
    Body,
}

struct CodeBuffer<'a> {
    kind: CodeBlockKind<'a>,
    text: String,
    start: usize,
}

pub(crate) struct HtmlWriter<'a, 'r, I, W> {
    /// Iterator supplying events with their source ranges.
    iter: I,

    /// Writer to write to.
    writer: W,

    /// Whether or not the last write wrote a newline.
    end_newline: bool,

    dispatcher: &'r Dispatcher<'r>,
    code: Option<CodeBuffer<'a>>,
    block_count: usize,
    failures: Vec<SpecParseError>,

    table_state: TableState,
    table_alignments: Vec<Alignment>,
    table_cell_index: usize,
    numbers: HashMap<CowStr<'a>, usize>,
}

impl<'a, 'r, I, W> HtmlWriter<'a, 'r, I, W>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
    W: StrWrite,
{
    pub(crate) fn new(iter: I, writer: W, dispatcher: &'r Dispatcher<'r>) -> Self {
        Self {
            iter,
            writer,
            end_newline: true,
            dispatcher,
            code: None,
            block_count: 0,
            failures: Vec::new(),
            table_state: TableState::Head,
            table_alignments: vec![],
            table_cell_index: 0,
            numbers: HashMap::new(),
        }
    }

    #[inline]
    fn write_newline(&mut self) -> Result<(), W::Error> {
        self.end_newline = true;
        self.writer.write_str("\n")
    }

    /// Writes a buffer, and tracks whether or not a newline was written.
    #[inline]
    fn write(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_str(s)?;

        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
        Ok(())
    }

    /// Opens a block-level element on a fresh line.
    fn open_block(&mut self, tag: &str) -> Result<(), W::Error> {
        if !self.end_newline {
            self.write_newline()?;
        }
        self.write(tag)
    }

    /// Runs the event stream to completion, returning the spec errors of any
    /// blocks that were replaced by placeholders.
    pub(crate) fn run(mut self) -> Result<Vec<SpecParseError>, W::Error> {
        while let Some((event, range)) = self.iter.next() {
            if let Some(code) = self.code.as_mut() {
                match event {
                    Event::Text(text) => code.text.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => self.finish_code_block(range.end)?,
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(tag) => self.start_tag(tag, range)?,
                Event::End(tag) => self.end_tag(tag)?,
                Event::Text(text) => {
                    escape_html_body_text(&mut self.writer, &text)?;
                    self.end_newline = text.ends_with('\n');
                }
                Event::Code(text) => {
                    self.write("<code class=\"inline-code\">")?;
                    escape_html_body_text(&mut self.writer, &text)?;
                    self.write("</code>")?;
                }
                Event::InlineMath(text) => {
                    self.write("<span class=\"math math-inline\">")?;
                    escape_html(&mut self.writer, &text)?;
                    self.write("</span>")?;
                }
                Event::DisplayMath(text) => {
                    self.write("<span class=\"math math-display\">")?;
                    escape_html(&mut self.writer, &text)?;
                    self.write("</span>")?;
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.write(&html)?;
                }
                Event::SoftBreak => {
                    self.write_newline()?;
                }
                Event::HardBreak => {
                    self.write("<br />\n")?;
                }
                Event::Rule => {
                    self.open_block("<hr />\n")?;
                }
                Event::FootnoteReference(name) => {
                    let len = self.numbers.len() + 1;
                    self.write("<sup class=\"footnote-reference\"><a href=\"#")?;
                    escape_html(&mut self.writer, &name)?;
                    self.write("\">")?;
                    let number = *self.numbers.entry(name).or_insert(len);
                    write!(&mut self.writer, "{}", number)?;
                    self.write("</a></sup>")?;
                }
                Event::TaskListMarker(true) => {
                    self.write("<input disabled=\"\" type=\"checkbox\" checked=\"\"/>\n")?;
                }
                Event::TaskListMarker(false) => {
                    self.write("<input disabled=\"\" type=\"checkbox\"/>\n")?;
                }
                #[allow(unreachable_patterns)]
                _ => {}
            }
        }
        Ok(self.failures)
    }

    fn start_tag(&mut self, tag: Tag<'a>, range: Range<usize>) -> Result<(), W::Error> {
        match tag {
            Tag::Paragraph => self.open_block("<p>"),
            Tag::Heading { level, .. } => {
                self.open_block("<")?;
                write!(&mut self.writer, "{} class=\"md-heading\">", level)
            }
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                self.open_block("<div class=\"md-table\"><table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                self.write("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                self.write("<tr>")
            }
            Tag::TableCell => {
                match self.table_state {
                    TableState::Head => self.write("<th")?,
                    TableState::Body => self.write("<td")?,
                }
                match self.table_alignments.get(self.table_cell_index) {
                    Some(&Alignment::Left) => self.write(" style=\"text-align: left\">"),
                    Some(&Alignment::Center) => self.write(" style=\"text-align: center\">"),
                    Some(&Alignment::Right) => self.write(" style=\"text-align: right\">"),
                    _ => self.write(">"),
                }
            }
            Tag::BlockQuote { .. } => self.open_block("<blockquote class=\"md-quote\">\n"),
            Tag::CodeBlock(kind) => {
                self.code = Some(CodeBuffer {
                    kind,
                    text: String::new(),
                    start: range.start,
                });
                Ok(())
            }
            Tag::List(Some(1)) => self.open_block("<ol class=\"md-list\">\n"),
            Tag::List(Some(start)) => {
                self.open_block("<ol class=\"md-list\" start=\"")?;
                write!(&mut self.writer, "{}", start)?;
                self.write("\">\n")
            }
            Tag::List(None) => self.open_block("<ul class=\"md-list\">\n"),
            Tag::Item => self.open_block("<li>"),
            Tag::Emphasis => self.write("<em>"),
            Tag::Strong => self.write("<strong>"),
            Tag::Strikethrough => self.write("<del>"),
            Tag::Link {
                link_type: LinkType::Email,
                dest_url,
                title,
                ..
            } => {
                self.write("<a href=\"mailto:")?;
                escape_href(&mut self.writer, &dest_url)?;
                if !title.is_empty() {
                    self.write("\" title=\"")?;
                    escape_html(&mut self.writer, &title)?;
                }
                self.write("\">")
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                self.write("<a href=\"")?;
                escape_href(&mut self.writer, &dest_url)?;
                if !title.is_empty() {
                    self.write("\" title=\"")?;
                    escape_html(&mut self.writer, &title)?;
                }
                self.write("\">")
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.write("<img src=\"")?;
                escape_href(&mut self.writer, &dest_url)?;
                self.write("\" alt=\"")?;
                self.raw_text()?;
                if !title.is_empty() {
                    self.write("\" title=\"")?;
                    escape_html(&mut self.writer, &title)?;
                }
                self.write("\" />")
            }
            Tag::FootnoteDefinition(name) => {
                self.open_block("<div class=\"footnote-definition\" id=\"")?;
                escape_html(&mut self.writer, &name)?;
                self.write("\"><sup class=\"footnote-definition-label\">")?;
                let len = self.numbers.len() + 1;
                let number = *self.numbers.entry(name).or_insert(len);
                write!(&mut self.writer, "{}", number)?;
                self.write("</sup>")
            }
            _ => Ok(()),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), W::Error> {
        match tag {
            TagEnd::Paragraph => self.write("</p>\n"),
            TagEnd::Heading(level) => {
                self.write("</")?;
                write!(&mut self.writer, "{}", level)?;
                self.write(">\n")
            }
            TagEnd::Table => self.write("</tbody></table></div>\n"),
            TagEnd::TableHead => {
                self.table_state = TableState::Body;
                self.write("</tr></thead><tbody>\n")
            }
            TagEnd::TableRow => self.write("</tr>\n"),
            TagEnd::TableCell => {
                match self.table_state {
                    TableState::Head => self.write("</th>")?,
                    TableState::Body => self.write("</td>")?,
                }
                self.table_cell_index += 1;
                Ok(())
            }
            TagEnd::BlockQuote { .. } => self.write("</blockquote>\n"),
            TagEnd::List(true) => self.write("</ol>\n"),
            TagEnd::List(false) => self.write("</ul>\n"),
            TagEnd::Item => self.write("</li>\n"),
            TagEnd::Emphasis => self.write("</em>"),
            TagEnd::Strong => self.write("</strong>"),
            TagEnd::Strikethrough => self.write("</del>"),
            TagEnd::Link => self.write("</a>"),
            TagEnd::FootnoteDefinition => self.write("</div>\n"),
            _ => Ok(()),
        }
    }

    fn finish_code_block(&mut self, end: usize) -> Result<(), W::Error> {
        let Some(code) = self.code.take() else {
            return Ok(());
        };
        let block = FencedBlock::new(self.block_count, &code.kind, code.text, code.start..end);
        self.block_count += 1;

        if !self.end_newline {
            self.write_newline()?;
        }
        let rendered = self.dispatcher.dispatch(&block);
        write_block(&mut self.writer, &rendered)?;
        self.write_newline()?;
        if let RenderedBlock::Failed(failure) = rendered {
            self.failures.push(failure.error);
        }
        Ok(())
    }

    // Writes the text of an image description into the alt attribute,
    // consuming the end tag.
    fn raw_text(&mut self) -> Result<(), W::Error> {
        let mut nest = 0;
        while let Some((event, _)) = self.iter.next() {
            match event {
                Event::Start(_) => nest += 1,
                Event::End(_) => {
                    if nest == 0 {
                        break;
                    }
                    nest -= 1;
                }
                Event::Html(_) => {}
                Event::InlineHtml(text) | Event::Code(text) | Event::Text(text) => {
                    escape_html(&mut self.writer, &text)?;
                    self.end_newline = text.ends_with('\n');
                }
                Event::SoftBreak | Event::HardBreak | Event::Rule => {
                    self.write(" ")?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Write the markup for one rendered block.
pub fn write_block<W: StrWrite>(mut writer: W, block: &RenderedBlock) -> Result<(), W::Error> {
    match block {
        RenderedBlock::Chart(spec) => write_chart(writer, spec),
        RenderedBlock::Radial { label, scene } => {
            writer.write_str("<div class=\"nebula-viz-container\">")?;
            crate::svg::write_scene(&mut writer, scene, label)?;
            writer.write_str("</div>")
        }
        RenderedBlock::Terminal { text } => {
            writer.write_str(
                "<div class=\"terminal\"><div class=\"terminal-header\">\
                 <span class=\"terminal-title\">terminal</span>\
                 <span class=\"terminal-dots\"><span></span><span></span><span></span></span>\
                 </div><pre class=\"terminal-body\"><span class=\"terminal-prompt\">$</span> ",
            )?;
            escape_html_body_text(&mut writer, text)?;
            writer.write_str("</pre></div>")
        }
        RenderedBlock::Code {
            lang,
            text,
            highlighted,
        } => {
            writer.write_str("<div class=\"code-block\" data-lang=\"")?;
            escape_html(&mut writer, lang)?;
            writer.write_str("\"><span class=\"code-lang\">")?;
            escape_html_body_text(&mut writer, lang)?;
            writer.write_str("</span><pre class=\"code\"><code class=\"language-")?;
            escape_html(&mut writer, lang)?;
            writer.write_str("\">")?;
            match highlighted {
                Some(html) => writer.write_str(html)?,
                None => escape_html_body_text(&mut writer, text)?,
            }
            writer.write_str("</code></pre></div>")
        }
        RenderedBlock::Plain { text } => {
            writer.write_str("<pre class=\"code\"><code>")?;
            escape_html_body_text(&mut writer, text)?;
            writer.write_str("</code></pre>")
        }
        RenderedBlock::Failed(failure) => write_failure(writer, failure),
    }
}

fn write_chart<W: StrWrite>(mut writer: W, spec: &ChartSpec) -> Result<(), W::Error> {
    let json = serde_json::to_string(spec).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "chart description did not serialize");
        "null".to_string()
    });
    write!(
        &mut writer,
        "<figure class=\"nebula-chart\" data-chart-type=\"{}\" data-chart=\"",
        spec.kind.as_str()
    )?;
    escape_html(&mut writer, &json)?;
    writer.write_str("\">")?;
    if let Some(title) = &spec.title {
        writer.write_str("<h4 class=\"chart-title\">")?;
        escape_html_body_text(&mut writer, title)?;
        writer.write_str("</h4>")?;
    }
    let shape = match spec.plot {
        Plot::Cartesian { .. } => "cartesian",
        Plot::Pie(_) => "pie",
    };
    write!(&mut writer, "<div class=\"chart-plot chart-plot-{shape}\"></div>")?;
    writer.write_str("<ul class=\"chart-legend\">")?;
    for entry in &spec.legend.entries {
        writer.write_str("<li><span class=\"legend-swatch\" style=\"background:")?;
        escape_html(&mut writer, &entry.color)?;
        writer.write_str("\"></span>")?;
        escape_html_body_text(&mut writer, &entry.label)?;
        writer.write_str("</li>")?;
    }
    writer.write_str("</ul></figure>")
}

fn write_failure<W: StrWrite>(mut writer: W, failure: &BlockFailure) -> Result<(), W::Error> {
    writer.write_str("<div class=\"block-error\" role=\"alert\"><strong class=\"block-error-summary\">")?;
    escape_html_body_text(&mut writer, failure.summary)?;
    writer.write_str("</strong><span class=\"block-error-detail\">")?;
    escape_html_body_text(&mut writer, &failure.detail)?;
    writer.write_str("</span></div>")
}
