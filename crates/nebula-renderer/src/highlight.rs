//! Class-based syntax highlighting for generic fenced code blocks.
//!
//! Highlighted spans carry `hl-`-prefixed classes; the colors come from a
//! stylesheet generated for the configured syntect theme, so the markup
//! itself is theme-independent.

#[cfg(feature = "syntax-css")]
use syntect::highlighting::ThemeSet;
#[cfg(feature = "syntax-css")]
use syntect::html::css_for_theme_with_class_style;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::RenderError;

pub const CSS_PREFIX: &str = "hl-";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: CSS_PREFIX };

/// Highlight `code` as `lang` and append the span markup to `output`.
///
/// Fails with [`RenderError::UnknownLanguage`] when no bundled syntax
/// matches the tag, leaving `output` untouched.
pub fn highlight(syntax_set: &SyntaxSet, lang: &str, code: &str, output: &mut String) -> Result<(), RenderError> {
    let syntax = syntax_set
        .find_syntax_by_token(lang)
        .ok_or_else(|| RenderError::UnknownLanguage(lang.into()))?;

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    output.push_str(&generator.finalize());
    Ok(())
}

/// Stylesheet for the `hl-` classes under a bundled syntect theme.
#[cfg(feature = "syntax-css")]
pub fn syntax_css(theme_name: &str) -> Result<String, RenderError> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(theme_name)
        .ok_or_else(|| RenderError::UnknownTheme(theme_name.into()))?;
    Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
}
