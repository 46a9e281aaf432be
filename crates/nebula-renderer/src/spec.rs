//! Decoding of fenced block bodies into typed visualization configs.
//!
//! `chart` and `viz` blocks carry a JSON object. The body is parsed into a
//! [`serde_json::Value`] first so that the top-level shape can be checked
//! field by field, with precise errors, before the typed decode runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::error::{SpecErrorKind, SpecKind, SpecParseError};

/// Classification of a fenced block by the first word of its info string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", content = "lang", rename_all = "lowercase")]
pub enum BlockTag {
    Chart,
    Viz,
    Terminal,
    /// Any other language; handed to the syntax highlighter.
    Code(SmolStr),
    /// No language at all.
    Plain,
}

impl BlockTag {
    pub fn from_info(info: &str) -> Self {
        match info.split_whitespace().next().unwrap_or("") {
            "" => BlockTag::Plain,
            "chart" => BlockTag::Chart,
            "viz" => BlockTag::Viz,
            "terminal" => BlockTag::Terminal,
            other => BlockTag::Code(SmolStr::new(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockTag::Chart => "chart",
            BlockTag::Viz => "viz",
            BlockTag::Terminal => "terminal",
            BlockTag::Code(lang) => lang,
            BlockTag::Plain => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
    /// A `type` string we don't know. Rendered as a bar chart.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: SmolStr,
    pub color: SmolStr,
}

/// A single cell of a chart record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Text(SmolStr),
    /// Explicit `null`; plotted as a gap, same as a missing field.
    Null,
}

impl DataValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            DataValue::Text(s) => s.trim().parse().ok(),
            DataValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Number(n) => write!(f, "{n}"),
            DataValue::Text(s) => f.write_str(s),
            DataValue::Null => Ok(()),
        }
    }
}

pub type DataRecord = BTreeMap<SmolStr, DataValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type", default)]
    pub kind: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<SmolStr>,
    pub x_key: SmolStr,
    pub series: Vec<Series>,
    pub data: Vec<DataRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadialKind {
    Gauge,
    Progress,
}

/// Config for a gauge or progress ring. `value` is nominally 0-100 but is
/// never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialConfig {
    #[serde(rename = "type")]
    pub kind: RadialKind,
    pub value: f64,
    pub label: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SmolStr>,
}

/// Outcome of decoding a block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Chart(ChartConfig),
    Radial(RadialConfig),
    /// Not a visualization tag; the dispatcher handles it directly.
    PassThrough,
}

/// Decode a block body according to its tag. Pure; never panics.
pub fn decode(tag: &BlockTag, body: &str) -> Result<Decoded, SpecParseError> {
    match tag {
        BlockTag::Chart => decode_chart(body).map(Decoded::Chart),
        BlockTag::Viz => decode_radial(body).map(Decoded::Radial),
        BlockTag::Terminal | BlockTag::Code(_) | BlockTag::Plain => Ok(Decoded::PassThrough),
    }
}

pub fn decode_chart(body: &str) -> Result<ChartConfig, SpecParseError> {
    let fail = |kind| SpecParseError::new(SpecKind::Chart, kind, body);

    let value = parse_object(body).map_err(fail)?;
    let obj = value.as_object().ok_or_else(|| fail(SpecErrorKind::NotAnObject))?;

    match obj.get("data") {
        None | Some(Value::Null) => return Err(fail(SpecErrorKind::MissingField("data"))),
        Some(Value::Array(records)) if records.is_empty() => {
            return Err(fail(SpecErrorKind::EmptyData));
        }
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(fail(SpecErrorKind::WrongType {
                field: "data",
                expected: "an array of records",
            }));
        }
    }
    for field in ["xKey", "series"] {
        require(obj, field).map_err(fail)?;
    }

    let config: ChartConfig =
        serde_json::from_value(value).map_err(|e| fail(SpecErrorKind::Shape(e)))?;

    if let Some(index) = config
        .data
        .iter()
        .position(|record| record.get(&config.x_key).is_none_or(DataValue::is_null))
    {
        return Err(fail(SpecErrorKind::MissingCategory {
            index,
            key: config.x_key.clone(),
        }));
    }
    if config.kind == ChartType::Pie && config.series.is_empty() {
        return Err(fail(SpecErrorKind::NoSeries));
    }

    tracing::trace!(
        kind = ?config.kind,
        series = config.series.len(),
        records = config.data.len(),
        "decoded chart block"
    );
    Ok(config)
}

pub fn decode_radial(body: &str) -> Result<RadialConfig, SpecParseError> {
    let fail = |kind| SpecParseError::new(SpecKind::Viz, kind, body);

    let value = parse_object(body).map_err(fail)?;
    let obj = value.as_object().ok_or_else(|| fail(SpecErrorKind::NotAnObject))?;
    for field in ["type", "value", "label"] {
        require(obj, field).map_err(fail)?;
    }

    let config: RadialConfig =
        serde_json::from_value(value).map_err(|e| fail(SpecErrorKind::Shape(e)))?;
    tracing::trace!(kind = ?config.kind, value = config.value, "decoded viz block");
    Ok(config)
}

fn parse_object(body: &str) -> Result<Value, SpecErrorKind> {
    let value: Value = serde_json::from_str(body).map_err(SpecErrorKind::Syntax)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(SpecErrorKind::NotAnObject)
    }
}

fn require(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<(), SpecErrorKind> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(SpecErrorKind::MissingField(field)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR: &str = r##"{"type":"bar","xKey":"month","data":[{"month":"Jan","v":1}],"series":[{"key":"v","color":"#fff"}]}"##;

    #[test]
    fn test_block_tag_from_info() {
        assert_eq!(BlockTag::from_info("chart"), BlockTag::Chart);
        assert_eq!(BlockTag::from_info("viz"), BlockTag::Viz);
        assert_eq!(BlockTag::from_info("terminal"), BlockTag::Terminal);
        assert_eq!(BlockTag::from_info(""), BlockTag::Plain);
        assert_eq!(
            BlockTag::from_info("rust ignore"),
            BlockTag::Code(SmolStr::new("rust"))
        );
        // Tags are matched exactly.
        assert_eq!(
            BlockTag::from_info("Chart"),
            BlockTag::Code(SmolStr::new("Chart"))
        );
    }

    #[test]
    fn test_decode_minimal_chart() {
        let config = decode_chart(BAR).unwrap();
        assert_eq!(config.kind, ChartType::Bar);
        assert_eq!(config.x_key, "month");
        assert_eq!(config.series.len(), 1);
        assert_eq!(config.data[0].get("v"), Some(&DataValue::Number(1.0)));
        assert_eq!(
            config.data[0].get("month"),
            Some(&DataValue::Text(SmolStr::new("Jan")))
        );
    }

    #[test]
    fn test_missing_type_defaults_to_bar() {
        let body = r##"{"xKey":"k","data":[{"k":"a"}],"series":[]}"##;
        assert_eq!(decode_chart(body).unwrap().kind, ChartType::Bar);
    }

    #[test]
    fn test_unknown_type_is_distinct_variant() {
        let body = r##"{"type":"radar","xKey":"k","data":[{"k":"a"}],"series":[]}"##;
        assert_eq!(decode_chart(body).unwrap().kind, ChartType::Unrecognized);
    }

    #[test]
    fn test_malformed_json_is_syntax_error_with_location() {
        let err = decode_chart("{not json").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.summary(), "JSON Error in Chart");
        assert_eq!(err.line_col().map(|(line, _)| line), Some(1));
    }

    #[test]
    fn test_missing_data_is_fatal() {
        let err = decode_chart(r#"{"xKey":"k","series":[]}"#).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::MissingField("data")));
        assert_eq!(err.summary(), "Invalid Chart Configuration");
    }

    #[test]
    fn test_data_must_be_array() {
        let err = decode_chart(r#"{"xKey":"k","series":[],"data":{"k":1}}"#).unwrap_err();
        assert!(matches!(
            err.kind(),
            SpecErrorKind::WrongType { field: "data", .. }
        ));
    }

    #[test]
    fn test_empty_data_rejected() {
        let err = decode_chart(r#"{"xKey":"k","series":[],"data":[]}"#).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::EmptyData));
    }

    #[test]
    fn test_record_without_x_key_rejected() {
        let body = r#"{"xKey":"k","series":[],"data":[{"k":"a"},{"v":2}]}"#;
        let err = decode_chart(body).unwrap_err();
        assert!(matches!(
            err.kind(),
            SpecErrorKind::MissingCategory { index: 1, .. }
        ));
    }

    #[test]
    fn test_missing_series_key_is_tolerated() {
        let body = r##"{"xKey":"k","series":[{"key":"absent","color":"#000"}],"data":[{"k":"a"}]}"##;
        assert!(decode_chart(body).is_ok());
    }

    #[test]
    fn test_non_scalar_record_value_rejected() {
        let body = r#"{"xKey":"k","series":[],"data":[{"k":"a","v":true}]}"#;
        let err = decode_chart(body).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::Shape(_)));
    }

    #[test]
    fn test_pie_requires_a_series() {
        let body = r#"{"type":"pie","xKey":"k","series":[],"data":[{"k":"a","v":1}]}"#;
        let err = decode_chart(body).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::NoSeries));
    }

    #[test]
    fn test_decode_gauge() {
        let body = r##"{"type":"gauge","value":78,"label":"CPU Load","color":"#ef4444"}"##;
        let config = decode_radial(body).unwrap();
        assert_eq!(config.kind, RadialKind::Gauge);
        assert_eq!(config.value, 78.0);
        assert_eq!(config.label, "CPU Load");
        assert_eq!(config.color.as_deref(), Some("#ef4444"));
    }

    #[test]
    fn test_decode_progress_without_color() {
        let config = decode_radial(r#"{"type":"progress","value":42,"label":"Disk"}"#).unwrap();
        assert_eq!(config.kind, RadialKind::Progress);
        assert_eq!(config.color, None);
    }

    #[test]
    fn test_viz_out_of_range_value_accepted() {
        let config = decode_radial(r#"{"type":"progress","value":150,"label":"x"}"#).unwrap();
        assert_eq!(config.value, 150.0);
    }

    #[test]
    fn test_viz_unknown_type_rejected() {
        let err = decode_radial(r#"{"type":"dial","value":1,"label":"x"}"#).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::Shape(_)));
        assert_eq!(err.summary(), "Invalid Viz Configuration");
    }

    #[test]
    fn test_viz_missing_label() {
        let err = decode_radial(r#"{"type":"gauge","value":1}"#).unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::MissingField("label")));
    }

    #[test]
    fn test_top_level_array_rejected() {
        let err = decode_radial("[1, 2]").unwrap_err();
        assert!(matches!(err.kind(), SpecErrorKind::NotAnObject));
        assert!(!err.is_syntax());
    }

    #[test]
    fn test_other_tags_pass_through() {
        for tag in [
            BlockTag::Terminal,
            BlockTag::Plain,
            BlockTag::Code(SmolStr::new("rust")),
        ] {
            assert_eq!(decode(&tag, "{not json").unwrap(), Decoded::PassThrough);
        }
    }
}
