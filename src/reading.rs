//! Sensor readings as served by `GET /sensor-data`
//!
//! The endpoint is loose about types: `temperature` and `humidity` arrive as
//! JSON numbers or as strings straight out of the database. Decoding never
//! rejects a value. Anything that does not start with a number becomes NaN
//! and is carried through to the chart untouched.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One timestamped sensor sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp as the server formats it, e.g. `2024-01-02 10:00:00`
    #[serde(default, deserialize_with = "lenient_string")]
    pub datetime: String,

    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub temperature: f64,

    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub humidity: f64,
}

impl Reading {
    pub fn new(datetime: impl Into<String>, temperature: f64, humidity: f64) -> Self {
        Self {
            datetime: datetime.into(),
            temperature,
            humidity,
        }
    }
}

/// A batch of readings in the order the endpoint sent them (newest first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingBatch(Vec<Reading>);

impl ReadingBatch {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self(readings)
    }

    /// Decode a batch from a JSON body
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Readings as received
    pub fn as_slice(&self) -> &[Reading] {
        &self.0
    }

    /// Consume the batch, returning readings oldest first
    pub fn into_chronological(self) -> Vec<Reading> {
        let mut readings = self.0;
        readings.reverse();
        readings
    }
}

impl From<Vec<Reading>> for ReadingBatch {
    fn from(readings: Vec<Reading>) -> Self {
        Self(readings)
    }
}

fn not_a_number() -> f64 {
    f64::NAN
}

/// Accept a JSON number or a numeric-looking string
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float(&s),
        _ => f64::NAN,
    })
}

/// Accept a string, stringify scalars, and map null to the empty string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Numeric prefix pattern, compiled on first use.
///
/// Digits are ASCII only.
fn float_prefix() -> Option<&'static Regex> {
    static FLOAT_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
    FLOAT_PREFIX
        .get_or_init(|| {
            Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)").ok()
        })
        .as_ref()
}

/// Parse the longest numeric prefix of `input`, ignoring leading whitespace.
///
/// `"20.5"` → 20.5, `"21.3 C"` → 21.3, `"-Infinity"` → -∞, `"abc"` → NaN.
pub fn parse_float(input: &str) -> f64 {
    let Some(re) = float_prefix() else {
        return f64::NAN;
    };

    let trimmed = input.trim_start();
    let Some(m) = re.find(trimmed) else {
        return f64::NAN;
    };

    match m.as_str() {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        prefix => prefix.parse().unwrap_or(f64::NAN),
    }
}
