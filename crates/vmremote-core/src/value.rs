//! Values written to and read from the engine
//!
//! Writes go through the script mini-language: `<path>=<value>;`.

use serde::Serialize;
use std::fmt;

/// A value on the right-hand side of a script assignment
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Float(f32),
    /// Written as `1` or `0`
    Bool(bool),
    /// Written double-quoted
    Text(String),
    /// Written verbatim, e.g. a `(target, ms)` fade tuple
    Raw(String),
}

impl ParameterValue {
    /// `FadeTo`/`FadeBy` argument: target gain in dB over `ms` milliseconds
    pub fn fade(db: f32, ms: u32) -> Self {
        Self::Raw(format!("({db:.1}, {ms})"))
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            Self::Text(s) => write!(f, "\"{}\"", s.replace('"', "'")),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<f32> for ParameterValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v as f32)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Float(v as f32)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Build a single assignment statement
pub fn assignment(path: &str, value: &ParameterValue) -> String {
    format!("{path}={value};")
}

/// A decoded parameter read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Float(f32),
    Text(String),
}

impl Value {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Float(_) => None,
        }
    }

    /// Float read interpreted as a switch (non-zero is on)
    pub fn as_bool(&self) -> Option<bool> {
        self.as_f32().map(|v| v != 0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
