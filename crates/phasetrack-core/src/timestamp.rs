//! Timestamps as they appear in task files.
//!
//! Other tooling reads and writes the same files, so the stored text is kept
//! verbatim and only parsed when something needs a date. New stamps use the
//! ISO form with microseconds, and every ISO-looking `timestamp:`/`updated:`
//! value is single-quoted on write so YAML 1.1 readers see a string rather
//! than a native datetime.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Text(String),
    /// A non-string scalar or structure, written back untouched.
    Other(serde_yaml::Value),
}

impl Timestamp {
    /// Local wall-clock time.
    pub fn now() -> Self {
        Self::from(Local::now().naive_local())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Timestamp::Text(s) => Some(s),
            Timestamp::Other(_) => None,
        }
    }

    pub fn parse(&self) -> Option<NaiveDateTime> {
        self.as_str().and_then(parse_lenient)
    }

    /// `YYYY-MM-DD HH:MM` when parseable, the raw text otherwise.
    pub fn short(&self) -> String {
        match self.parse() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => self.to_string(),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::Text(dt.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Text(s) => f.write_str(s),
            Timestamp::Other(v) => match serde_yaml::to_string(v) {
                Ok(text) => f.write_str(text.trim_end()),
                Err(_) => f.write_str("?"),
            },
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Timestamp::Text(s) => serializer.serialize_str(s),
            Timestamp::Other(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Timestamp::Text(s),
            other => Timestamp::Other(other),
        })
    }
}

/// Accepts `T` or space separators, optional fractional seconds, an optional
/// UTC offset (dropped, keeping wall time) and bare dates (midnight).
pub fn parse_lenient(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.naive_local());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

static PLAIN_STAMP_RE: OnceLock<Regex> = OnceLock::new();

fn plain_stamp_re() -> &'static Regex {
    PLAIN_STAMP_RE.get_or_init(|| {
        Regex::new(r"(?m)^([ ]*(?:- )?(?:timestamp|updated): )(\d{4}-\d{2}-\d{2}[^'\n]*)$")
            .unwrap()
    })
}

/// Single-quote plain ISO-looking `timestamp:` and `updated:` scalars in
/// emitted YAML.
pub fn quote_timestamps(yaml: &str) -> String {
    plain_stamp_re()
        .replace_all(yaml, "${1}'${2}'")
        .into_owned()
}
