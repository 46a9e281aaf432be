//! Chart rendering adapter.
//!
//! Turns a validated [`ChartConfig`] into a [`ChartSpec`]: a declarative
//! description (axes, series marks, legend, tooltip) that a client-side
//! charting backend can draw without knowing anything about markdown. No
//! plotting happens here.

use serde::Serialize;
use smol_str::SmolStr;

use crate::spec::{ChartConfig, ChartType, DataRecord, DataValue};
use crate::theme::ChartScheme;

/// Bar corner radii, top-left, top-right, bottom-right, bottom-left.
pub const BAR_RADIUS: [f64; 4] = [4.0, 4.0, 0.0, 0.0];
pub const LINE_STROKE_WIDTH: f64 = 2.0;
pub const AREA_FILL_OPACITY: f64 = 0.3;
pub const GRID_DASHARRAY: &str = "3 3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
        }
    }
}

impl From<ChartType> for ChartKind {
    fn from(kind: ChartType) -> Self {
        match kind {
            ChartType::Line => ChartKind::Line,
            ChartType::Area => ChartKind::Area,
            ChartType::Pie => ChartKind::Pie,
            ChartType::Bar | ChartType::Unrecognized => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<SmolStr>,
    pub grid: Grid,
    pub tooltip: Tooltip,
    pub legend: Legend,
    pub plot: Plot,
    pub data: Vec<DataRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub stroke: SmolStr,
    pub stroke_dasharray: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub background: SmolStr,
    pub border: SmolStr,
    pub text: SmolStr,
    /// Record fields shown, raw, when hovering a category.
    pub fields: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: SmolStr,
    pub color: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Plot {
    #[serde(rename_all = "camelCase")]
    Cartesian {
        x_axis: Axis,
        y_axis: Axis,
        series: Vec<PlotSeries>,
    },
    Pie(PiePlot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_key: Option<SmolStr>,
    pub stroke: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSeries {
    pub data_key: SmolStr,
    pub color: SmolStr,
    pub mark: Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    Monotone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mark {
    Bar {
        radius: [f64; 4],
    },
    #[serde(rename_all = "camelCase")]
    Line {
        curve: Curve,
        stroke_width: f64,
        active_dot: bool,
    },
    #[serde(rename_all = "camelCase")]
    Area {
        curve: Curve,
        stroke: SmolStr,
        fill_opacity: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiePlot {
    pub name_key: SmolStr,
    pub value_key: SmolStr,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: SmolStr,
    /// `None` when the record lacks the value field or it isn't numeric.
    pub value: Option<f64>,
    pub fill: SmolStr,
}

impl ChartSpec {
    /// Number of plotted series (cartesian) or slices (pie).
    pub fn mark_count(&self) -> usize {
        match &self.plot {
            Plot::Cartesian { series, .. } => series.len(),
            Plot::Pie(pie) => pie.slices.len(),
        }
    }
}

/// Build the chart description for a validated config.
pub fn render(config: &ChartConfig, scheme: &ChartScheme) -> ChartSpec {
    let kind = ChartKind::from(config.kind);
    if config.kind == ChartType::Unrecognized {
        tracing::debug!("unrecognized chart type, falling back to bar");
    }

    let (plot, legend) = match kind {
        ChartKind::Pie => pie_plot(config, scheme),
        ChartKind::Bar | ChartKind::Line | ChartKind::Area => cartesian_plot(kind, config, scheme),
    };

    let mut fields = vec![config.x_key.clone()];
    fields.extend(
        config
            .series
            .iter()
            .map(|s| s.key.clone())
            .filter(|key| *key != config.x_key),
    );

    ChartSpec {
        kind,
        title: config.title.clone().filter(|t| !t.is_empty()),
        grid: Grid {
            stroke: scheme.grid.clone(),
            stroke_dasharray: SmolStr::new_static(GRID_DASHARRAY),
        },
        tooltip: Tooltip {
            background: scheme.tooltip_background.clone(),
            border: scheme.tooltip_border.clone(),
            text: scheme.tooltip_text.clone(),
            fields,
        },
        legend,
        plot,
        data: config.data.clone(),
    }
}

fn cartesian_plot(kind: ChartKind, config: &ChartConfig, scheme: &ChartScheme) -> (Plot, Legend) {
    let series = config
        .series
        .iter()
        .map(|s| PlotSeries {
            data_key: s.key.clone(),
            color: s.color.clone(),
            mark: match kind {
                ChartKind::Line => Mark::Line {
                    curve: Curve::Monotone,
                    stroke_width: LINE_STROKE_WIDTH,
                    active_dot: true,
                },
                ChartKind::Area => Mark::Area {
                    curve: Curve::Monotone,
                    stroke: s.color.clone(),
                    fill_opacity: AREA_FILL_OPACITY,
                },
                ChartKind::Bar | ChartKind::Pie => Mark::Bar { radius: BAR_RADIUS },
            },
        })
        .collect::<Vec<_>>();

    let legend = Legend {
        entries: series
            .iter()
            .map(|s| LegendEntry {
                label: s.data_key.clone(),
                color: s.color.clone(),
            })
            .collect(),
    };

    let plot = Plot::Cartesian {
        x_axis: Axis {
            data_key: Some(config.x_key.clone()),
            stroke: scheme.axis.clone(),
        },
        y_axis: Axis {
            data_key: None,
            stroke: scheme.axis.clone(),
        },
        series,
    };
    (plot, legend)
}

// Only the first series is used as the value field; any further series
// are ignored.
fn pie_plot(config: &ChartConfig, scheme: &ChartScheme) -> (Plot, Legend) {
    let value_key = config
        .series
        .first()
        .map(|s| s.key.clone())
        .unwrap_or_default();
    if config.series.len() > 1 {
        tracing::debug!(
            ignored = config.series.len() - 1,
            "pie chart uses only its first series"
        );
    }

    let slices = config
        .data
        .iter()
        .enumerate()
        .map(|(index, record)| Slice {
            label: record
                .get(&config.x_key)
                .map(|v| SmolStr::new(v.to_string()))
                .unwrap_or_default(),
            value: record.get(&value_key).and_then(DataValue::as_f64),
            fill: scheme.pie_color(index).clone(),
        })
        .collect::<Vec<_>>();

    let legend = Legend {
        entries: slices
            .iter()
            .map(|s| LegendEntry {
                label: s.label.clone(),
                color: s.fill.clone(),
            })
            .collect(),
    };

    let plot = Plot::Pie(PiePlot {
        name_key: config.x_key.clone(),
        value_key,
        slices,
    });
    (plot, legend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::decode_chart;
    use crate::theme::PIE_PALETTE_LEN;

    fn scheme() -> ChartScheme {
        ChartScheme::default()
    }

    fn two_series(kind: &str) -> ChartConfig {
        decode_chart(&format!(
            r##"{{
                "type": "{kind}",
                "title": "Deployments vs Bugs",
                "xKey": "month",
                "data": [
                    {{"month": "Jan", "deployments": 12, "bugs": 2}},
                    {{"month": "Feb", "deployments": 19, "bugs": 4}},
                    {{"month": "Mar", "deployments": 35}}
                ],
                "series": [
                    {{"key": "deployments", "color": "#0ea5e9"}},
                    {{"key": "bugs", "color": "#ef4444"}}
                ]
            }}"##
        ))
        .unwrap()
    }

    #[test]
    fn test_bar_has_one_series_per_config_series() {
        let spec = render(&two_series("bar"), &scheme());
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.mark_count(), 2);
        let Plot::Cartesian { x_axis, series, .. } = &spec.plot else {
            panic!("expected cartesian plot");
        };
        assert_eq!(x_axis.data_key.as_deref(), Some("month"));
        assert_eq!(series[0].data_key, "deployments");
        assert_eq!(series[1].color, "#ef4444");
        assert_eq!(series[0].mark, Mark::Bar { radius: BAR_RADIUS });
    }

    #[test]
    fn test_line_marks() {
        let spec = render(&two_series("line"), &scheme());
        let Plot::Cartesian { series, .. } = &spec.plot else {
            panic!("expected cartesian plot");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(
            series[0].mark,
            Mark::Line {
                curve: Curve::Monotone,
                stroke_width: 2.0,
                active_dot: true,
            }
        );
    }

    #[test]
    fn test_area_stroke_matches_fill() {
        let spec = render(&two_series("area"), &scheme());
        let Plot::Cartesian { series, .. } = &spec.plot else {
            panic!("expected cartesian plot");
        };
        for s in series {
            match &s.mark {
                Mark::Area {
                    stroke,
                    fill_opacity,
                    ..
                } => {
                    assert_eq!(stroke, &s.color);
                    assert_eq!(*fill_opacity, 0.3);
                }
                other => panic!("unexpected mark {other:?}"),
            }
        }
    }

    #[test]
    fn test_unrecognized_type_falls_back_to_bar() {
        let spec = render(&two_series("sunburst"), &scheme());
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.mark_count(), 2);
    }

    #[test]
    fn test_shared_chrome() {
        let spec = render(&two_series("line"), &scheme());
        assert_eq!(spec.title.as_deref(), Some("Deployments vs Bugs"));
        assert_eq!(spec.grid.stroke_dasharray, "3 3");
        assert_eq!(spec.tooltip.fields, ["month", "deployments", "bugs"]);
        let labels: Vec<_> = spec.legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["deployments", "bugs"]);
    }

    #[test]
    fn test_pie_uses_first_series_and_one_slice_per_record() {
        let spec = render(&two_series("pie"), &scheme());
        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.mark_count(), 3);
        let Plot::Pie(pie) = &spec.plot else {
            panic!("expected pie plot");
        };
        assert_eq!(pie.value_key, "deployments");
        assert_eq!(pie.slices[0].label, "Jan");
        assert_eq!(pie.slices[2].value, Some(35.0));
    }

    #[test]
    fn test_pie_palette_cycles_every_six() {
        let records = (0..14)
            .map(|i| format!(r#"{{"name":"s{i}","v":{i}}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let config = decode_chart(&format!(
            r##"{{"type":"pie","xKey":"name","series":[{{"key":"v","color":"#fff"}}],"data":[{records}]}}"##
        ))
        .unwrap();
        let spec = render(&config, &scheme());
        let Plot::Pie(pie) = &spec.plot else {
            panic!("expected pie plot");
        };
        assert_eq!(pie.slices.len(), 14);
        for i in 0..pie.slices.len() - PIE_PALETTE_LEN {
            assert_eq!(pie.slices[i].fill, pie.slices[i + PIE_PALETTE_LEN].fill);
        }
        // The declared series color plays no part in slice fills.
        assert!(pie.slices.iter().all(|s| s.fill != "#fff"));
    }

    #[test]
    fn test_pie_missing_value_is_gap() {
        let config = decode_chart(
            r##"{"type":"pie","xKey":"k","series":[{"key":"v","color":"#fff"}],"data":[{"k":"a"},{"k":"b","v":"7"}]}"##,
        )
        .unwrap();
        let spec = render(&config, &scheme());
        let Plot::Pie(pie) = &spec.plot else {
            panic!("expected pie plot");
        };
        assert_eq!(pie.slices[0].value, None);
        assert_eq!(pie.slices[1].value, Some(7.0));
    }

    #[test]
    fn test_serialized_description_shape() {
        let spec = render(&two_series("line"), &scheme());
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["plot"]["shape"], "cartesian");
        assert_eq!(json["plot"]["xAxis"]["dataKey"], "month");
        assert_eq!(json["plot"]["series"][0]["mark"]["type"], "line");
        assert_eq!(json["plot"]["series"][0]["mark"]["strokeWidth"], 2.0);
    }
}
