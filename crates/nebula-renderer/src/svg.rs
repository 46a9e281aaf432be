//! SVG painter for [`RadialScene`]s.
//!
//! Arc outlines follow d3's `arc()` generator: annular sectors whose four
//! corners may be rounded, with the corner radius shrunk when the sector is
//! too thin or too narrow to fit it.

use std::f64::consts::{PI, TAU};

use pulldown_cmark_escape::{StrWrite, escape_html};

use crate::radial::{ArcSegment, FontWeight, Point, Primitive, RadialScene, TextLabel};

const EPSILON: f64 = 1e-12;

/// Write `scene` as a standalone inline `<svg>` element.
pub fn write_scene<W: StrWrite>(mut writer: W, scene: &RadialScene, label: &str) -> Result<(), W::Error> {
    write!(
        &mut writer,
        "<svg class=\"nebula-viz\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"",
        w = num(scene.width),
        h = num(scene.height),
    )?;
    escape_html(&mut writer, label)?;
    write!(
        &mut writer,
        "\"><g transform=\"translate({},{})\">",
        num(scene.width / 2.0),
        num(scene.height / 2.0)
    )?;

    for primitive in &scene.primitives {
        match primitive {
            Primitive::Circle {
                radius,
                stroke,
                stroke_width,
                fill,
            } => {
                write!(&mut writer, "<circle r=\"{}\" fill=\"", num(*radius))?;
                escape_html(&mut writer, fill.as_deref().unwrap_or("none"))?;
                writer.write_str("\" stroke=\"")?;
                escape_html(&mut writer, stroke)?;
                write!(&mut writer, "\" stroke-width=\"{}\"/>", num(*stroke_width))?;
            }
            Primitive::Arc(arc) => {
                let d = arc_path(arc);
                if d.is_empty() {
                    continue;
                }
                writer.write_str("<path d=\"")?;
                writer.write_str(&d)?;
                writer.write_str("\"")?;
                if arc.sweep().abs() >= TAU - EPSILON {
                    writer.write_str(" fill-rule=\"evenodd\"")?;
                }
                writer.write_str(" fill=\"")?;
                escape_html(&mut writer, &arc.fill)?;
                writer.write_str("\"/>")?;
            }
            Primitive::Text(text) => write_text(&mut writer, text)?,
        }
    }

    writer.write_str("</g></svg>")
}

fn write_text<W: StrWrite>(writer: &mut W, text: &TextLabel) -> Result<(), W::Error> {
    write!(writer, "<text text-anchor=\"middle\" y=\"{}\" dy=\"", num(text.y))?;
    escape_html(&mut *writer, &text.dy)?;
    writer.write_str("\" fill=\"")?;
    escape_html(&mut *writer, &text.fill)?;
    write!(writer, "\" font-size=\"{}px\"", num(text.font_size))?;
    if text.font_weight == FontWeight::Bold {
        writer.write_str(" font-weight=\"bold\"")?;
    }
    if let Some(family) = &text.font_family {
        writer.write_str(" font-family=\"")?;
        escape_html(&mut *writer, family)?;
        writer.write_str("\"")?;
    }
    writer.write_str(">")?;
    escape_html(&mut *writer, &text.text)?;
    writer.write_str("</text>")
}

/// SVG path data for an arc segment; empty when there is nothing to draw.
pub fn arc_path(arc: &ArcSegment) -> String {
    let r0 = arc.inner_radius.max(0.0);
    let r1 = arc.outer_radius.max(0.0);
    let (r0, r1) = if r0 > r1 { (r1, r0) } else { (r0, r1) };
    let a0 = arc.start_angle;
    let a1 = arc.end_angle;
    let da = (a1 - a0).abs();
    let cw = a1 > a0;

    let mut d = String::new();
    if r1 <= EPSILON || da <= EPSILON {
        return d;
    }

    if da >= TAU - EPSILON {
        annulus(&mut d, r0, r1);
        return d;
    }

    let s = if cw { 1.0 } else { -1.0 };
    let (rc0, rc1) = corner_radii(arc.corner_radius, r0, r1, da);
    let large = |span: f64| if span > PI { 1 } else { 0 };
    let sweep = if cw { 1 } else { 0 };
    let reverse = 1 - sweep;

    // Outer edge, start corner to end corner.
    if rc1 > EPSILON {
        let delta = (rc1 / (r1 - rc1)).asin();
        let tangent = ((r1 - rc1).powi(2) - rc1 * rc1).sqrt();
        move_to(&mut d, Point::polar(tangent, a0));
        arc_to(&mut d, rc1, 0, sweep, Point::polar(r1, a0 + s * delta));
        arc_to(&mut d, r1, large(da - 2.0 * delta), sweep, Point::polar(r1, a1 - s * delta));
        arc_to(&mut d, rc1, 0, sweep, Point::polar(tangent, a1));
    } else {
        move_to(&mut d, Point::polar(r1, a0));
        arc_to(&mut d, r1, large(da), sweep, Point::polar(r1, a1));
    }

    // Inner edge, back from end to start.
    if r0 <= EPSILON {
        line_to(&mut d, Point { x: 0.0, y: 0.0 });
    } else if rc0 > EPSILON {
        let delta = (rc0 / (r0 + rc0)).asin();
        let tangent = ((r0 + rc0).powi(2) - rc0 * rc0).sqrt();
        line_to(&mut d, Point::polar(tangent, a1));
        arc_to(&mut d, rc0, 0, sweep, Point::polar(r0, a1 - s * delta));
        arc_to(&mut d, r0, large(da - 2.0 * delta), reverse, Point::polar(r0, a0 + s * delta));
        arc_to(&mut d, rc0, 0, sweep, Point::polar(tangent, a0));
    } else {
        line_to(&mut d, Point::polar(r0, a1));
        arc_to(&mut d, r0, large(da), reverse, Point::polar(r0, a0));
    }
    d.push('Z');
    d
}

/// Effective (inner, outer) corner radii. Never more than half the ring
/// thickness, and for sectors narrower than a half turn, small enough that
/// the two corners on each edge meet at most.
fn corner_radii(requested: f64, r0: f64, r1: f64, da: f64) -> (f64, f64) {
    let rc = requested.max(0.0).min((r1 - r0) / 2.0);
    if rc <= EPSILON {
        return (0.0, 0.0);
    }
    if da >= PI {
        return (rc, rc);
    }
    let sin_half = (da / 2.0).sin();
    let inner = rc.min(r0 * sin_half / (1.0 - sin_half));
    let outer = rc.min(r1 * sin_half / (1.0 + sin_half));
    (inner, outer)
}

fn annulus(d: &mut String, r0: f64, r1: f64) {
    for (radius, sweep) in [(r1, 1), (r0, 0)] {
        if radius <= EPSILON {
            continue;
        }
        move_to(d, Point { x: 0.0, y: -radius });
        arc_to(d, radius, 1, sweep, Point { x: 0.0, y: radius });
        arc_to(d, radius, 1, sweep, Point { x: 0.0, y: -radius });
        d.push('Z');
    }
}

fn move_to(d: &mut String, p: Point) {
    d.push_str(&format!("M{},{}", num(p.x), num(p.y)));
}

fn line_to(d: &mut String, p: Point) {
    d.push_str(&format!("L{},{}", num(p.x), num(p.y)));
}

fn arc_to(d: &mut String, radius: f64, large: u8, sweep: u8, p: Point) {
    let r = num(radius);
    d.push_str(&format!("A{r},{r},0,{large},{sweep},{},{}", num(p.x), num(p.y)));
}

/// Compact decimal: at most three fractional digits, no trailing zeros.
pub(crate) fn num(value: f64) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radial::layout;
    use crate::spec::{RadialConfig, RadialKind};
    use crate::theme::{FontScheme, RadialScheme};
    use pulldown_cmark_escape::FmtWriter;
    use smol_str::SmolStr;

    fn arc(start: f64, end: f64, corner: f64) -> ArcSegment {
        ArcSegment {
            inner_radius: 85.0,
            outer_radius: 100.0,
            start_angle: start,
            end_angle: end,
            corner_radius: corner,
            fill: SmolStr::new("#22c55e"),
        }
    }

    #[test]
    fn test_num_trims() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(82.5), "82.5");
        assert_eq!(num(1.0 / 3.0), "0.333");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn test_zero_sweep_draws_nothing() {
        assert_eq!(arc_path(&arc(0.0, 0.0, 5.0)), "");
    }

    #[test]
    fn test_square_semicircle_path() {
        let d = arc_path(&arc(-PI / 2.0, PI / 2.0, 0.0));
        insta::assert_snapshot!(d, @"M-100,0A100,100,0,0,1,100,0L85,0A85,85,0,0,0,-85,0Z");
    }

    #[test]
    fn test_full_turn_is_annulus() {
        let d = arc_path(&arc(0.0, TAU, 10.0));
        insta::assert_snapshot!(d, @"M0,-100A100,100,0,1,1,0,100A100,100,0,1,1,0,-100ZM0,-85A85,85,0,1,0,0,85A85,85,0,1,0,0,-85Z");
    }

    #[test]
    fn test_rounded_corners_add_corner_arcs() {
        let d = arc_path(&arc(0.0, PI, 5.0));
        // Four corner arcs plus the outer and inner edges.
        assert_eq!(d.matches('A').count(), 6);
        assert!(d.contains("A5,5,0,0,1,"));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn test_corner_radius_limited_by_thickness() {
        let (inner, outer) = corner_radii(50.0, 85.0, 100.0, PI);
        assert_eq!((inner, outer), (7.5, 7.5));
    }

    #[test]
    fn test_narrow_sector_shrinks_corners() {
        let (_, outer) = corner_radii(10.0, 82.5, 97.5, 0.05);
        assert!(outer < 10.0);
    }

    #[test]
    fn test_counter_clockwise_flips_sweep() {
        let d = arc_path(&arc(0.0, -PI / 2.0, 0.0));
        assert!(d.starts_with("M0,-100A100,100,0,0,0,-100,0"));
    }

    #[test]
    fn test_write_progress_scene() {
        let config = RadialConfig {
            kind: RadialKind::Progress,
            value: 0.0,
            label: SmolStr::new("Build <ok>"),
            color: None,
        };
        let scene = layout(&config, &RadialScheme::default(), &FontScheme::default());
        let mut out = String::new();
        write_scene(FmtWriter(&mut out), &scene, &config.label).unwrap();
        assert!(out.starts_with("<svg class=\"nebula-viz\""));
        assert!(out.contains("aria-label=\"Build &lt;ok&gt;\""));
        assert!(out.contains("<g transform=\"translate(100,100)\">"));
        assert!(out.contains("<circle r=\"90\" fill=\"none\" stroke=\"#334155\" stroke-width=\"15\"/>"));
        // A zero value has no arc to paint.
        assert!(!out.contains("<path"));
        assert!(out.contains(">0%</text>"));
        assert!(out.ends_with("</g></svg>"));
    }
}
