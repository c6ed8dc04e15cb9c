use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One line of input, tagged with its 1-based position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub line_no: u64,
    pub text: String,
}

pub type Attributes = BTreeMap<String, AttrValue>;

/// A decoded log line.
///
/// Field names follow the wire schema: `time`, `level`, `msg`, `details`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogRecord {
    #[serde(rename = "time")]
    pub timestamp: DateTime<FixedOffset>,

    pub level: Level,

    #[serde(rename = "msg")]
    pub message: String,

    /// Missing or `null` `details` decode as an empty map.
    #[serde(rename = "details", default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

impl LogRecord {
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Log severity as written by the producer. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Other(String),
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Other(s) => s,
        }
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DEBUG" => Level::Debug,
            "INFO" => Level::Info,
            "WARN" => Level::Warn,
            "ERROR" => Level::Error,
            _ => Level::Other(s),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        match level {
            Level::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically-typed attribute value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttrError {
    #[error("expected a number, found {found}")]
    NotNumeric { found: &'static str },

    #[error("`{0}` is not a number")]
    Unparseable(String),
}

impl AttrValue {
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Number(_) => "number",
            AttrValue::Text(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Map(_) => "map",
        }
    }

    /// Numeric view of the value.
    ///
    /// Strings holding a finite decimal number (e.g. `"503"`) are accepted,
    /// every other non-number kind is an error.
    pub fn as_f64(&self) -> Result<f64, AttrError> {
        match self {
            AttrValue::Number(n) => n
                .as_f64()
                .ok_or(AttrError::NotNumeric { found: "number" }),
            AttrValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| AttrError::Unparseable(s.clone())),
            other => Err(AttrError::NotNumeric {
                found: other.kind(),
            }),
        }
    }

    /// Lookup inside a nested map; `None` for every other kind.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        match self {
            AttrValue::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n.into())
    }
}

/// Final counters of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub warnings: u64,
    pub errors: u64,
}

impl HealthSummary {
    /// Failed requests as a percentage of all requests; `None` when no request was seen.
    pub fn failed_rate(&self) -> Option<f64> {
        (self.total_requests > 0)
            .then(|| self.failed_requests as f64 / self.total_requests as f64 * 100.0)
    }
}
