use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Flat telemetry record as delivered by either data source: dot-namespaced
/// field path (e.g. `boat.bmv.voltage`) mapped to a raw JSON scalar. Cloud
/// records are unwrapped into this shape at the ingestion boundary, so the
/// normalizer only ever sees one shape.
pub type RawRecord = BTreeMap<String, serde_json::Value>;

/// One sample of a cloud data series. Series are ordered most recent first;
/// only the first sample of each series is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudSample {
    pub value: serde_json::Value,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A value ready for the render sink.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
}

impl DisplayValue {
    /// Raw scalar without a dedicated transform: numbers stay numbers,
    /// everything else is rendered as text.
    pub fn from_raw(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => DisplayValue::Text(s.clone()),
            other => match other.as_f64() {
                Some(n) => DisplayValue::Number(n),
                None => DisplayValue::Text(other.to_string()),
            },
        }
    }

    /// Numeric view used when deriving the power fields. Fixed-decimal
    /// values are stored as text and parsed back here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(n) => Some(*n),
            DisplayValue::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => write!(f, "{}", n),
            DisplayValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Normalized record handed to the render sink, keyed by display name.
/// Built once per refresh cycle and discarded after rendering.
pub type DisplayRecord = BTreeMap<String, DisplayValue>;

/// Login and password for the cloud token request.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}
