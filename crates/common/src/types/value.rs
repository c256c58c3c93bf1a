// EDTrace - Execution Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Recorded variable values.
//!
//! On the wire a value is a tagged payload `{type, contents, shape?, dtype?}` where
//! `type` is the recorder's name for the runtime type. Decoding classifies the
//! payload into a closed set of variants; anything that does not fit a known shape
//! is kept verbatim as [`Value::Opaque`] so it survives a round trip.

use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number};

/// Wire shape of a value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawValue {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    contents: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dtype: Option<String>,
}

/// A recorded variable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValue", into = "RawValue")]
pub enum Value {
    /// Python `None` (a real value, not a cleared binding)
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(Number),
    /// Floating point number, possibly non-finite
    Float(f64),
    /// String
    Str(String),
    /// Dense numeric array (`torch.Tensor`, `numpy.ndarray`)
    Tensor {
        /// Recorded type name
        ty: String,
        /// Element type
        dtype: Option<String>,
        /// Dimensions
        shape: Vec<usize>,
        /// Nested arrays of numbers
        contents: serde_json::Value,
    },
    /// Symbolic expression rendered as text (`sympy.core.*`)
    Symbolic {
        /// Recorded type name
        ty: String,
        /// Expression text
        expr: String,
    },
    /// Sequence of values
    List {
        /// Recorded type name
        ty: String,
        /// Elements
        items: Vec<Value>,
    },
    /// Mapping of names to values
    Dict {
        /// Recorded type name
        ty: String,
        /// Entries in recorded order
        entries: IndexMap<String, Value>,
    },
    /// Any payload without a more specific variant
    Opaque {
        /// Recorded type name
        ty: String,
        /// Raw contents
        contents: serde_json::Value,
        /// Dimensions, if recorded
        shape: Option<Vec<usize>>,
        /// Element type, if recorded
        dtype: Option<String>,
    },
}

const TENSOR_TYPES: [&str; 2] = ["torch.Tensor", "numpy.ndarray"];
const SYMBOLIC_PREFIX: &str = "sympy.core.";

impl Value {
    /// Integer value
    pub fn int(value: i64) -> Self {
        Self::Int(value.into())
    }

    /// Float value
    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }

    /// String value
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// The recorded type name
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Tensor { ty, .. }
            | Self::Symbolic { ty, .. }
            | Self::List { ty, .. }
            | Self::Dict { ty, .. }
            | Self::Opaque { ty, .. } => ty,
        }
    }

    /// Short description of the value's type, e.g. `torch.Tensor float32 [2 x 3]`
    pub fn title(&self) -> String {
        let (dtype, shape) = match self {
            Self::Tensor { dtype, shape, .. } => (dtype.as_deref(), Some(shape.as_slice())),
            Self::Opaque { dtype, shape, .. } => (dtype.as_deref(), shape.as_deref()),
            _ => (None, None),
        };

        let mut title = self.type_name().to_string();
        if let Some(dtype) = dtype {
            title.push(' ');
            title.push_str(dtype);
        }
        if let Some(shape) = shape {
            title.push_str(&format!(" [{}]", shape.iter().join(" x ")));
        }
        title
    }

    fn to_json(&self) -> serde_json::Value {
        RawValue::from(self.clone()).into_json()
    }
}

impl RawValue {
    fn into_json(self) -> serde_json::Value {
        let mut object = json!({ "type": self.ty, "contents": self.contents });
        if let Some(shape) = self.shape {
            object["shape"] = json!(shape);
        }
        if let Some(dtype) = self.dtype {
            object["dtype"] = json!(dtype);
        }
        object
    }

    fn opaque(self) -> Value {
        Value::Opaque { ty: self.ty, contents: self.contents, shape: self.shape, dtype: self.dtype }
    }
}

fn parse_float(contents: &serde_json::Value) -> Option<f64> {
    match contents {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decode_items(items: &[serde_json::Value]) -> Option<Vec<Value>> {
    items.iter().map(|item| serde_json::from_value(item.clone()).ok()).collect()
}

fn decode_entries(entries: &serde_json::Map<String, serde_json::Value>) -> Option<IndexMap<String, Value>> {
    entries
        .iter()
        .map(|(key, item)| Some((key.clone(), serde_json::from_value(item.clone()).ok()?)))
        .collect()
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw.ty.as_str() {
            "NoneType" => Self::None,
            "bool" => match raw.contents.as_bool() {
                Some(b) => Self::Bool(b),
                None => raw.opaque(),
            },
            "int" => match &raw.contents {
                serde_json::Value::Number(n) => Self::Int(n.clone()),
                _ => raw.opaque(),
            },
            "float" => match parse_float(&raw.contents) {
                Some(x) => Self::Float(x),
                None => raw.opaque(),
            },
            "str" => match raw.contents {
                serde_json::Value::String(s) => Self::Str(s),
                _ => raw.opaque(),
            },
            ty if TENSOR_TYPES.contains(&ty) => Self::Tensor {
                ty: raw.ty,
                dtype: raw.dtype,
                shape: raw.shape.unwrap_or_default(),
                contents: raw.contents,
            },
            ty if ty.starts_with(SYMBOLIC_PREFIX) => match raw.contents {
                serde_json::Value::String(expr) => Self::Symbolic { ty: raw.ty, expr },
                _ => raw.opaque(),
            },
            _ => {
                let decoded = match &raw.contents {
                    serde_json::Value::Array(items) => {
                        decode_items(items).map(|items| Self::List { ty: raw.ty.clone(), items })
                    }
                    serde_json::Value::Object(entries) => decode_entries(entries)
                        .map(|entries| Self::Dict { ty: raw.ty.clone(), entries }),
                    _ => None,
                };
                decoded.unwrap_or_else(|| raw.opaque())
            }
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        let ty = value.type_name().to_string();
        let bare = |contents| Self { ty: ty.clone(), contents, shape: None, dtype: None };

        match value {
            Value::None => bare(serde_json::Value::Null),
            Value::Bool(b) => bare(json!(b)),
            Value::Int(n) => bare(serde_json::Value::Number(n)),
            Value::Float(x) => bare(match Number::from_f64(x) {
                Some(n) => serde_json::Value::Number(n),
                None => json!(format_number(x)),
            }),
            Value::Str(s) => bare(json!(s)),
            Value::Symbolic { expr, .. } => bare(json!(expr)),
            Value::List { items, .. } => {
                bare(serde_json::Value::Array(items.iter().map(Value::to_json).collect()))
            }
            Value::Dict { entries, .. } => bare(serde_json::Value::Object(
                entries.iter().map(|(key, item)| (key.clone(), item.to_json())).collect(),
            )),
            Value::Tensor { ty, dtype, shape, contents } => {
                Self { ty, contents, shape: Some(shape), dtype }
            }
            Value::Opaque { ty, contents, shape, dtype } => Self { ty, contents, shape, dtype },
        }
    }
}

/// Format a number for compact display.
///
/// Magnitudes above 1e12 use exponential notation, magnitudes above 1e6 get thousands
/// separators, values with at most three decimals print as-is, and everything else is
/// rounded to four decimals.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let magnitude = x.abs();
    if magnitude > 1e12 {
        format_exponential(x)
    } else if magnitude > 1e6 {
        group_thousands(x)
    } else if (x * 1000.0).fract() == 0.0 {
        x.to_string()
    } else {
        format!("{x:.4}")
    }
}

fn format_exponential(x: f64) -> String {
    let formatted = format!("{x:.3e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

fn group_thousands(x: f64) -> String {
    let rounded = format!("{:.3}", x.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let fraction = fraction.trim_end_matches('0');

    let digits: Vec<char> = integer.chars().collect();
    let grouped = digits.rchunks(3).rev().map(|chunk| chunk.iter().collect::<String>()).join(",");

    let sign = if x < 0.0 { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn format_nested(contents: &serde_json::Value) -> String {
    match contents {
        serde_json::Value::Array(items) => format!("[{}]", items.iter().map(format_nested).join(", ")),
        serde_json::Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => match n.as_f64() {
                Some(x) if x.abs() > 1e6 => write!(f, "{}", format_number(x)),
                _ => write!(f, "{n}"),
            },
            Self::Float(x) => write!(f, "{}", format_number(*x)),
            Self::Str(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            Self::Symbolic { expr, .. } => write!(f, "{expr}"),
            Self::Tensor { shape, contents, .. } if shape.len() <= 3 => {
                write!(f, "{}", format_nested(contents))
            }
            Self::Tensor { contents, .. } => write!(f, "{contents}"),
            Self::List { items, .. } => write!(f, "[{}]", items.iter().join(", ")),
            Self::Dict { entries, .. } => {
                write!(f, "{{{}}}", entries.iter().map(|(key, item)| format!("{key}: {item}")).join(", "))
            }
            Self::Opaque { contents, .. } => write!(f, "{contents}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: serde_json::Value) -> Value {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(json!({"type": "NoneType", "contents": null})), Value::None);
        assert_eq!(decode(json!({"type": "bool", "contents": true})), Value::Bool(true));
        assert_eq!(decode(json!({"type": "int", "contents": 42})), Value::int(42));
        assert_eq!(decode(json!({"type": "float", "contents": 0.5})), Value::float(0.5));
        assert_eq!(decode(json!({"type": "str", "contents": "hi"})), Value::str("hi"));
    }

    #[test]
    fn test_decode_non_finite_float() {
        let value = decode(json!({"type": "float", "contents": "inf"}));
        assert_eq!(value, Value::float(f64::INFINITY));
        assert_eq!(value.to_string(), "inf");
    }

    #[test]
    fn test_decode_tensor_and_symbolic() {
        let tensor = decode(json!({
            "type": "torch.Tensor",
            "contents": [[1, 2], [3, 4]],
            "shape": [2, 2],
            "dtype": "torch.float32"
        }));
        assert!(matches!(&tensor, Value::Tensor { shape, .. } if shape == &vec![2, 2]));
        assert_eq!(tensor.title(), "torch.Tensor torch.float32 [2 x 2]");
        assert_eq!(tensor.to_string(), "[[1, 2], [3, 4]]");

        let symbolic = decode(json!({"type": "sympy.core.add.Add", "contents": "x + 1"}));
        assert_eq!(symbolic, Value::Symbolic { ty: "sympy.core.add.Add".into(), expr: "x + 1".into() });
        assert_eq!(symbolic.to_string(), "x + 1");
    }

    #[test]
    fn test_decode_containers() {
        let list = decode(json!({
            "type": "list",
            "contents": [{"type": "int", "contents": 1}, {"type": "str", "contents": "a"}]
        }));
        assert_eq!(list, Value::List { ty: "list".into(), items: vec![Value::int(1), Value::str("a")] });
        assert_eq!(list.to_string(), r#"[1, "a"]"#);

        let dict = decode(json!({"type": "dict", "contents": {"k": {"type": "bool", "contents": false}}}));
        assert_eq!(dict.to_string(), "{k: false}");
    }

    #[test]
    fn test_dict_keeps_recorded_key_order() {
        let dict: Value = serde_json::from_str(
            r#"{"type": "dict", "contents": {
                "zeta": {"type": "int", "contents": 1},
                "alpha": {"type": "int", "contents": 2}
            }}"#,
        )
        .unwrap();
        assert_eq!(dict.to_string(), "{zeta: 1, alpha: 2}");
        assert_eq!(
            serde_json::to_string(&dict).unwrap(),
            r#"{"type":"dict","contents":{"zeta":{"type":"int","contents":1},"alpha":{"type":"int","contents":2}}}"#
        );
    }

    #[test]
    fn test_unknown_payload_stays_opaque() {
        let json = json!({"type": "MyClass", "contents": [1, 2, 3]});
        let value = decode(json.clone());
        assert!(matches!(value, Value::Opaque { .. }));
        assert_eq!(value.type_name(), "MyClass");
        assert_eq!(serde_json::to_value(&value).unwrap(), json);
    }

    #[test]
    fn test_encode_keeps_wire_shape() {
        let tensor = Value::Tensor {
            ty: "numpy.ndarray".into(),
            dtype: Some("int64".into()),
            shape: vec![3],
            contents: json!([1, 2, 3]),
        };
        assert_eq!(
            serde_json::to_value(&tensor).unwrap(),
            json!({"type": "numpy.ndarray", "contents": [1, 2, 3], "shape": [3], "dtype": "int64"})
        );
        assert_eq!(
            serde_json::to_value(Value::None).unwrap(),
            json!({"type": "NoneType", "contents": null})
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.125), "0.125");
        assert_eq!(format_number(1.0 / 3.0), "0.3333");
        assert_eq!(format_number(1234567.5), "1,234,567.5");
        assert_eq!(format_number(-2500000.0), "-2,500,000");
        assert_eq!(format_number(1.5e13), "1.500e+13");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_large_int_display() {
        assert_eq!(Value::int(12_345_678).to_string(), "12,345,678");
        assert_eq!(Value::int(-7).to_string(), "-7");
    }
}
