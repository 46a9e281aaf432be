//! Geometry for the `viz` block: progress rings and half-circle gauges.
//!
//! Layout is a pure function from a [`RadialConfig`] to a [`RadialScene`], a
//! flat list of primitives in a 200×200 canvas whose origin sits at the
//! centre. Angles are radians, measured clockwise from 12 o'clock. Painting
//! the scene is a separate concern (see [`crate::svg`]).
//!
//! Values are nominally 0..=100 but are never clamped. A progress value of
//! 150 sweeps one and a half turns; a negative gauge value swings past the
//! left end of the dial. The output is odd but always well-formed.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;
use smol_str::{SmolStr, format_smolstr};

use crate::spec::{RadialConfig, RadialKind};
use crate::theme::{FontScheme, RadialScheme};

pub const CANVAS_SIZE: f64 = 200.0;
pub const RADIUS: f64 = CANVAS_SIZE / 2.0;

pub const PROGRESS_TRACK_RADIUS: f64 = RADIUS - 10.0;
pub const PROGRESS_TRACK_WIDTH: f64 = 15.0;
pub const PROGRESS_INNER: f64 = RADIUS - 17.5;
pub const PROGRESS_OUTER: f64 = RADIUS - 2.5;
pub const PROGRESS_CORNER: f64 = 10.0;

pub const GAUGE_INNER: f64 = RADIUS - 15.0;
pub const GAUGE_OUTER: f64 = RADIUS;
pub const GAUGE_CORNER: f64 = 5.0;
pub const GAUGE_START: f64 = -FRAC_PI_2;
pub const GAUGE_END: f64 = FRAC_PI_2;

/// A point in canvas coordinates, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The point at `radius` from the origin in direction `angle`.
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.sin(),
            y: -radius * angle.cos(),
        }
    }
}

/// Maps a closed numeric domain onto a range, extrapolating outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// The gauge's value-to-angle scale.
pub fn gauge_scale() -> LinearScale {
    LinearScale::new((0.0, 100.0), (GAUGE_START, GAUGE_END))
}

/// Annular sector, in the same terms as d3's arc generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcSegment {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub corner_radius: f64,
    pub fill: SmolStr,
}

impl ArcSegment {
    /// Signed angular extent; positive is clockwise.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub text: SmolStr,
    /// Baseline position relative to the origin.
    pub y: f64,
    /// Extra vertical shift, in CSS length units.
    pub dy: SmolStr,
    pub font_size: f64,
    pub font_weight: FontWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<SmolStr>,
    pub fill: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "primitive", rename_all = "lowercase")]
pub enum Primitive {
    #[serde(rename_all = "camelCase")]
    Circle {
        radius: f64,
        stroke: SmolStr,
        stroke_width: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<SmolStr>,
    },
    Arc(ArcSegment),
    Text(TextLabel),
}

/// Everything needed to draw one `viz` block, back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialScene {
    pub kind: RadialKind,
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<Primitive>,
}

impl RadialScene {
    /// The arc representing the value itself; always the last arc drawn.
    pub fn value_arc(&self) -> Option<&ArcSegment> {
        self.primitives.iter().rev().find_map(|p| match p {
            Primitive::Arc(arc) => Some(arc),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &TextLabel> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(label) => Some(label),
            _ => None,
        })
    }
}

/// Lay out a fresh scene for `config`. Nothing from a previous layout is
/// reused, so switching kind or value never leaves stale primitives behind.
pub fn layout(config: &RadialConfig, scheme: &RadialScheme, fonts: &FontScheme) -> RadialScene {
    let primitives = match config.kind {
        RadialKind::Progress => progress(config, scheme, fonts),
        RadialKind::Gauge => gauge(config, scheme, fonts),
    };
    if !(0.0..=100.0).contains(&config.value) {
        tracing::debug!(value = config.value, "radial value outside 0..=100, drawing as-is");
    }
    RadialScene {
        kind: config.kind,
        width: CANVAS_SIZE,
        height: CANVAS_SIZE,
        primitives,
    }
}

fn progress(config: &RadialConfig, scheme: &RadialScheme, fonts: &FontScheme) -> Vec<Primitive> {
    let fill = config
        .color
        .clone()
        .unwrap_or_else(|| scheme.progress_default.clone());
    vec![
        Primitive::Circle {
            radius: PROGRESS_TRACK_RADIUS,
            stroke: scheme.track.clone(),
            stroke_width: PROGRESS_TRACK_WIDTH,
            fill: None,
        },
        Primitive::Arc(ArcSegment {
            inner_radius: PROGRESS_INNER,
            outer_radius: PROGRESS_OUTER,
            start_angle: 0.0,
            end_angle: config.value / 100.0 * TAU,
            corner_radius: PROGRESS_CORNER,
            fill,
        }),
        Primitive::Text(TextLabel {
            text: format_smolstr!("{}%", config.value),
            y: 0.0,
            dy: SmolStr::new_static("0.35em"),
            font_size: 24.0,
            font_weight: FontWeight::Normal,
            font_family: Some(fonts.monospace.clone()),
            fill: scheme.value_text.clone(),
        }),
        Primitive::Text(TextLabel {
            text: config.label.clone(),
            y: 0.0,
            dy: SmolStr::new_static("2em"),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            font_family: None,
            fill: scheme.label_text.clone(),
        }),
    ]
}

fn gauge(config: &RadialConfig, scheme: &RadialScheme, fonts: &FontScheme) -> Vec<Primitive> {
    let fill = config
        .color
        .clone()
        .unwrap_or_else(|| scheme.gauge_default.clone());
    vec![
        Primitive::Arc(ArcSegment {
            inner_radius: GAUGE_INNER,
            outer_radius: GAUGE_OUTER,
            start_angle: GAUGE_START,
            end_angle: GAUGE_END,
            corner_radius: 0.0,
            fill: scheme.track.clone(),
        }),
        Primitive::Arc(ArcSegment {
            inner_radius: GAUGE_INNER,
            outer_radius: GAUGE_OUTER,
            start_angle: GAUGE_START,
            end_angle: gauge_scale().apply(config.value),
            corner_radius: GAUGE_CORNER,
            fill,
        }),
        // The dial opens upward, so the readout sits just above the centre.
        Primitive::Text(TextLabel {
            text: format_smolstr!("{}", config.value),
            y: -10.0,
            dy: SmolStr::new_static("0"),
            font_size: 32.0,
            font_weight: FontWeight::Bold,
            font_family: Some(fonts.monospace.clone()),
            fill: scheme.value_text.clone(),
        }),
        Primitive::Text(TextLabel {
            text: config.label.clone(),
            y: 20.0,
            dy: SmolStr::new_static("0"),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            font_family: None,
            fill: scheme.label_text.clone(),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: RadialKind, value: f64) -> RadialConfig {
        RadialConfig {
            kind,
            value,
            label: SmolStr::new("CPU Load"),
            color: None,
        }
    }

    fn scene(kind: RadialKind, value: f64) -> RadialScene {
        layout(&config(kind, value), &RadialScheme::default(), &FontScheme::default())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_progress_zero_has_no_sweep() {
        let arc = scene(RadialKind::Progress, 0.0).value_arc().cloned().unwrap();
        assert_eq!(arc.start_angle, 0.0);
        assert_eq!(arc.sweep(), 0.0);
    }

    #[test]
    fn test_progress_hundred_is_full_turn() {
        let arc = scene(RadialKind::Progress, 100.0).value_arc().cloned().unwrap();
        assert_eq!(arc.sweep(), TAU);
        assert_eq!(arc.inner_radius, 82.5);
        assert_eq!(arc.outer_radius, 97.5);
        assert_eq!(arc.corner_radius, 10.0);
    }

    #[test]
    fn test_progress_track_and_text() {
        let s = scene(RadialKind::Progress, 42.0);
        assert_eq!(
            s.primitives[0],
            Primitive::Circle {
                radius: 90.0,
                stroke: SmolStr::new("#334155"),
                stroke_width: 15.0,
                fill: None,
            }
        );
        let texts: Vec<_> = s.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["42%", "CPU Load"]);
        assert_eq!(s.value_arc().unwrap().fill, "#0ea5e9");
    }

    #[test]
    fn test_progress_out_of_range_extrapolates() {
        let arc = scene(RadialKind::Progress, 150.0).value_arc().cloned().unwrap();
        assert!(close(arc.sweep(), 1.5 * TAU));
        let arc = scene(RadialKind::Progress, -25.0).value_arc().cloned().unwrap();
        assert!(close(arc.sweep(), -0.25 * TAU));
    }

    #[test]
    fn test_gauge_half_ends_at_top() {
        let s = scene(RadialKind::Gauge, 50.0);
        let arc = s.value_arc().unwrap();
        assert_eq!(arc.start_angle, -FRAC_PI_2);
        assert!(close(arc.end_angle, 0.0));
        assert_eq!(arc.corner_radius, 5.0);
        assert_eq!(arc.fill, "#22c55e");
    }

    #[test]
    fn test_gauge_background_semicircle() {
        let s = scene(RadialKind::Gauge, 10.0);
        let Primitive::Arc(track) = &s.primitives[0] else {
            panic!("expected background arc first");
        };
        assert_eq!((track.start_angle, track.end_angle), (-FRAC_PI_2, FRAC_PI_2));
        assert_eq!((track.inner_radius, track.outer_radius), (85.0, 100.0));
    }

    #[test]
    fn test_gauge_text_is_bold_raw_value() {
        let mut cfg = config(RadialKind::Gauge, 78.0);
        cfg.color = Some(SmolStr::new("#ef4444"));
        let s = layout(&cfg, &RadialScheme::default(), &FontScheme::default());
        let value = s.labels().next().unwrap();
        assert_eq!(value.text, "78");
        assert_eq!(value.font_weight, FontWeight::Bold);
        assert_eq!(s.value_arc().unwrap().fill, "#ef4444");
    }

    #[test]
    fn test_relayout_is_fresh() {
        let gauge = scene(RadialKind::Gauge, 30.0);
        let progress = scene(RadialKind::Progress, 30.0);
        assert!(!progress.primitives.iter().any(|p| gauge.primitives.contains(p)
            && matches!(p, Primitive::Arc(_))));
        assert_eq!(progress.kind, RadialKind::Progress);
    }

    #[test]
    fn test_linear_scale_extrapolates() {
        let scale = gauge_scale();
        assert_eq!(scale.apply(0.0), -FRAC_PI_2);
        assert_eq!(scale.apply(100.0), FRAC_PI_2);
        assert!(close(scale.apply(200.0), 3.0 * FRAC_PI_2));
    }

    #[test]
    fn test_polar_is_clockwise_from_top() {
        let top = Point::polar(10.0, 0.0);
        assert!(close(top.x, 0.0) && close(top.y, -10.0));
        let right = Point::polar(10.0, FRAC_PI_2);
        assert!(close(right.x, 10.0) && close(right.y, 0.0));
    }
}
