//! Colors, fonts and defaults shared by every block renderer.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Number of colors in the pie chart palette. Slice `i` and slice `i + 6`
/// always share a fill.
pub const PIE_PALETTE_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub colors: ColorScheme,
    pub chart: ChartScheme,
    pub radial: RadialScheme,
    pub fonts: FontScheme,
    pub syntect_theme_name: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background: SmolStr,
    pub foreground: SmolStr,
    pub muted: SmolStr,
    pub accent: SmolStr,
    pub error: SmolStr,
    pub terminal_text: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartScheme {
    pub grid: SmolStr,
    pub axis: SmolStr,
    pub tooltip_background: SmolStr,
    pub tooltip_border: SmolStr,
    pub tooltip_text: SmolStr,
    pub pie_palette: [SmolStr; PIE_PALETTE_LEN],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialScheme {
    pub track: SmolStr,
    pub progress_default: SmolStr,
    pub gauge_default: SmolStr,
    pub value_text: SmolStr,
    pub label_text: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontScheme {
    pub body: SmolStr,
    pub monospace: SmolStr,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            chart: ChartScheme::default(),
            radial: RadialScheme::default(),
            fonts: FontScheme::default(),
            syntect_theme_name: SmolStr::new("base16-ocean.dark"),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: SmolStr::new("#0f172a"),
            foreground: SmolStr::new("#e2e8f0"),
            muted: SmolStr::new("#94a3b8"),
            accent: SmolStr::new("#0ea5e9"),
            error: SmolStr::new("#ef4444"),
            terminal_text: SmolStr::new("#4ade80"),
        }
    }
}

impl Default for ChartScheme {
    fn default() -> Self {
        Self {
            grid: SmolStr::new("#334155"),
            axis: SmolStr::new("#94a3b8"),
            tooltip_background: SmolStr::new("#1e293b"),
            tooltip_border: SmolStr::new("#334155"),
            tooltip_text: SmolStr::new("#f8fafc"),
            pie_palette: [
                SmolStr::new("#0ea5e9"),
                SmolStr::new("#22c55e"),
                SmolStr::new("#eab308"),
                SmolStr::new("#ef4444"),
                SmolStr::new("#8b5cf6"),
                SmolStr::new("#ec4899"),
            ],
        }
    }
}

impl ChartScheme {
    /// Fill for the pie slice at `index`; cycles every [`PIE_PALETTE_LEN`] slices.
    pub fn pie_color(&self, index: usize) -> &SmolStr {
        &self.pie_palette[index % PIE_PALETTE_LEN]
    }
}

impl Default for RadialScheme {
    fn default() -> Self {
        Self {
            track: SmolStr::new("#334155"),
            progress_default: SmolStr::new("#0ea5e9"),
            gauge_default: SmolStr::new("#22c55e"),
            value_text: SmolStr::new("#e2e8f0"),
            label_text: SmolStr::new("#94a3b8"),
        }
    }
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            body: SmolStr::new(
                "Inter, system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif",
            ),
            monospace: SmolStr::new("'JetBrains Mono', 'Cascadia Code', Consolas, monospace"),
        }
    }
}
