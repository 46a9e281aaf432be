//! Standalone HTML page assembly.

use pulldown_cmark_escape::{FmtWriter, escape_html_body_text};

use crate::theme::Theme;

/// Stylesheet for the document body and the custom blocks, with colors and
/// fonts taken from `theme`.
pub fn base_css(theme: &Theme) -> String {
    let colors = &theme.colors;
    let chart = &theme.chart;
    let fonts = &theme.fonts;

    format!(
        r#":root {{
    --color-background: {background};
    --color-foreground: {foreground};
    --color-muted: {muted};
    --color-accent: {accent};
    --color-error: {error};
    --color-terminal: {terminal};
    --color-border: {border};
    --color-surface: {surface};
    --font-body: {body};
    --font-mono: {mono};
}}

*, *::before, *::after {{
    box-sizing: border-box;
}}

body {{
    margin: 0;
    background: var(--color-background);
    color: var(--color-foreground);
    font-family: var(--font-body);
    line-height: 1.6;
}}

.nebula-doc {{
    max-width: 52rem;
    margin: 0 auto;
    padding: 2rem;
}}

.md-heading {{
    font-family: var(--font-mono);
    font-weight: 700;
}}

h1.md-heading {{
    font-size: 1.875rem;
    border-bottom: 1px solid var(--color-border);
    padding-bottom: 0.5rem;
}}

h2.md-heading {{
    font-size: 1.5rem;
    margin-top: 2rem;
}}

h3.md-heading {{
    font-size: 1.25rem;
    margin-top: 1.5rem;
}}

a {{
    color: var(--color-accent);
}}

ul.md-list {{
    list-style: none;
    padding-left: 1.5rem;
}}

ul.md-list > li {{
    position: relative;
}}

ul.md-list > li::before {{
    content: ">";
    position: absolute;
    left: -1.5rem;
    color: var(--color-accent);
    font-family: var(--font-mono);
}}

ol.md-list > li::marker {{
    color: var(--color-accent);
    font-family: var(--font-mono);
}}

.md-quote {{
    border-left: 4px solid var(--color-accent);
    margin: 1rem 0;
    padding: 0.25rem 1rem;
    background: var(--color-surface);
    font-style: italic;
}}

.md-table {{
    overflow-x: auto;
    margin: 1.5rem 0;
    border: 1px solid var(--color-border);
    border-radius: 0.5rem;
}}

.md-table table {{
    min-width: 100%;
    border-collapse: collapse;
    font-size: 0.875rem;
}}

.md-table th {{
    background: var(--color-surface);
    text-transform: uppercase;
    font-size: 0.75rem;
    padding: 0.75rem 1rem;
}}

.md-table td {{
    color: var(--color-muted);
    padding: 0.75rem 1rem;
    border-top: 1px solid var(--color-border);
}}

.inline-code {{
    background: var(--color-surface);
    padding: 0.1rem 0.4rem;
    border-radius: 0.25rem;
    font-family: var(--font-mono);
    font-size: 0.875em;
}}

pre.code {{
    margin: 0;
    padding: 1rem;
    border: 1px solid var(--color-border);
    border-radius: 0.5rem;
    font-family: var(--font-mono);
    font-size: 0.875rem;
    white-space: pre-wrap;
    overflow-x: auto;
}}

.code-block {{
    position: relative;
    margin: 1rem 0;
}}

.code-lang {{
    position: absolute;
    top: 0.5rem;
    right: 0.5rem;
    font-size: 0.625rem;
    font-weight: 700;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: var(--color-muted);
}}

.terminal {{
    margin: 1rem 0;
    border: 1px solid var(--color-border);
    border-radius: 0.375rem;
    overflow: hidden;
}}

.terminal-header {{
    display: flex;
    align-items: center;
    padding: 0.5rem 1rem;
    background: var(--color-surface);
    color: var(--color-muted);
    font-size: 0.75rem;
}}

.terminal-dots {{
    display: flex;
    gap: 0.375rem;
    margin-left: auto;
}}

.terminal-dots span {{
    width: 0.625rem;
    height: 0.625rem;
    border-radius: 50%;
    background: var(--color-muted);
}}

.terminal-body {{
    margin: 0;
    padding: 1rem;
    color: var(--color-terminal);
    font-family: var(--font-mono);
    font-size: 0.875rem;
    white-space: pre-wrap;
}}

.terminal-prompt {{
    color: var(--color-muted);
    user-select: none;
}}

.nebula-chart {{
    margin: 1.5rem 0;
    padding: 1rem;
    border: 1px solid var(--color-border);
    border-radius: 0.5rem;
}}

.chart-title {{
    margin: 0 0 1rem;
    text-align: center;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    font-size: 0.875rem;
}}

.chart-plot {{
    height: 16rem;
    width: 100%;
    background-image: repeating-linear-gradient(0deg, {grid} 0 1px, transparent 1px 3rem);
}}

.chart-legend {{
    display: flex;
    flex-wrap: wrap;
    justify-content: center;
    gap: 1rem;
    list-style: none;
    padding: 0;
    font-size: 0.75rem;
}}

.legend-swatch {{
    display: inline-block;
    width: 0.625rem;
    height: 0.625rem;
    margin-right: 0.375rem;
    border-radius: 2px;
}}

.nebula-viz-container {{
    display: flex;
    justify-content: center;
    margin: 1.5rem 0;
}}

.block-error {{
    margin: 1rem 0;
    padding: 0.5rem;
    border: 1px solid var(--color-error);
    color: var(--color-error);
    font-family: var(--font-mono);
    font-size: 0.75rem;
}}

.block-error-detail {{
    display: block;
    color: var(--color-muted);
}}
"#,
        background = css_value(&colors.background),
        foreground = css_value(&colors.foreground),
        muted = css_value(&colors.muted),
        accent = css_value(&colors.accent),
        error = css_value(&colors.error),
        terminal = css_value(&colors.terminal_text),
        border = css_value(&chart.grid),
        surface = css_value(&chart.tooltip_background),
        body = css_value(&fonts.body),
        mono = css_value(&fonts.monospace),
        grid = css_value(&chart.grid),
    )
}

/// A theme value as it may appear inside `<style>`. Characters that could
/// close the element or open a new rule are dropped.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
}

/// Wrap an already-rendered body in a complete HTML document.
pub fn wrap_page(title: &str, css: &str, body: &str) -> String {
    let mut escaped_title = String::new();
    // Writing into a String cannot fail.
    let _ = escape_html_body_text(FmtWriter(&mut escaped_title), title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{escaped_title}</title>
<style>
{css}</style>
</head>
<body>
<article class="nebula-doc">
{body}</article>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_css_uses_theme() {
        let mut theme = Theme::default();
        theme.colors.accent = "#ff00ff".into();
        let css = base_css(&theme);
        assert!(css.contains("--color-accent: #ff00ff;"));
        assert!(css.contains(".block-error {"));
    }

    #[test]
    fn test_theme_values_cannot_leave_the_stylesheet() {
        let mut theme = Theme::default();
        theme.colors.accent = "red</style><script>alert(1)</script>".into();
        theme.fonts.body = "Inter; } body { display: none".into();
        let css = base_css(&theme);
        assert!(!css.contains('<'));
        assert!(css.contains("--color-accent: red/stylescriptalert(1)/script;"));
        assert!(css.contains("--font-body: Inter  body  display: none;"));
    }

    #[test]
    fn test_wrap_page_escapes_title() {
        let page = wrap_page("Notes <draft>", "p {}\n", "<p>hi</p>\n");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Notes &lt;draft&gt;</title>"));
        assert!(page.contains("<article class=\"nebula-doc\">\n<p>hi</p>\n</article>"));
    }
}
