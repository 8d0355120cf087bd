//! Annotation scalar values
//!
//! Annotations handed to the broadcast engine are plain `key="value"` pairs.
//! Every value passes through [`value_to_string`] so that booleans, numbers
//! and strings always render the same way regardless of locale.

use std::fmt;

/// Number of fractional digits kept when rendering floats
const FLOAT_DECIMALS: usize = 2;

/// A single annotation value
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AnnotationValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Int(v) => Some(*v as f64),
            AnnotationValue::Float(v) => Some(*v),
            AnnotationValue::Bool(_) | AnnotationValue::Str(_) => None,
        }
    }

    /// Empty strings carry no information and are never rendered
    pub fn is_empty(&self) -> bool {
        matches!(self, AnnotationValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_to_string(self))
    }
}

impl From<bool> for AnnotationValue {
    fn from(v: bool) -> Self {
        AnnotationValue::Bool(v)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        AnnotationValue::Int(v)
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        AnnotationValue::Float(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        AnnotationValue::Str(v.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        AnnotationValue::Str(v)
    }
}

/// Render an annotation value in its canonical form
///
/// - Booleans: `true` / `false`
/// - Integers: plain decimal
/// - Floats: rounded to two decimals, trailing zeros trimmed, at least one
///   fractional digit kept (`30.0`, `27.5`, `0.33`)
/// - Strings: verbatim
pub fn value_to_string(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Bool(true) => "true".to_string(),
        AnnotationValue::Bool(false) => "false".to_string(),
        AnnotationValue::Int(v) => v.to_string(),
        AnnotationValue::Float(v) => float_to_string(*v),
        AnnotationValue::Str(s) => s.clone(),
    }
}

fn float_to_string(v: f64) -> String {
    if !v.is_finite() {
        return "0.0".to_string();
    }

    let mut rendered = format!("{:.*}", FLOAT_DECIMALS, v);
    while rendered.ends_with('0') && !rendered.ends_with(".0") {
        rendered.pop();
    }

    // Rounding can produce "-0.0"
    if rendered == "-0.0" {
        rendered = "0.0".to_string();
    }
    rendered
}
