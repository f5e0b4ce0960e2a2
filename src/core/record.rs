//! Structured record assembly and encoding
//!
//! Every emission produces one self-describing JSON line:
//!
//! ```json
//! {"time":"...","level":"warn","caller":"core/logger.rs:42","msg":"...","meta":{...}}
//! ```
//!
//! Key names follow the fixed schema: `time`, `level`, `caller`, `msg`,
//! optional `error`, and the `meta` group holding the logger's static
//! fields merged with per-call metas.

use super::field::Fields;
use super::severity::Severity;
use super::timestamp::TimeLayout;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully assembled record, ready for encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub time: String,
    pub level: Severity,
    pub caller: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub meta: Map<String, Value>,
}

impl Record {
    /// Assemble a record from an emission call.
    ///
    /// Static fields are copied first, then per-call metas; a meta wins
    /// over a static field on key collision.
    pub fn assemble(
        level: Severity,
        msg: impl Into<String>,
        caller: String,
        timestamp: &DateTime<Local>,
        layout: &TimeLayout,
        static_fields: &Map<String, Value>,
        fields: &Fields,
    ) -> Self {
        let mut meta = static_fields.clone();
        for m in fields.metas() {
            meta.insert(m.key().to_string(), m.value().to_json_value());
        }

        Self {
            time: layout.format(timestamp),
            level,
            caller,
            msg: msg.into(),
            error: fields.error().map(String::from),
            meta,
        }
    }

    /// Encode as a single newline-terminated JSON line.
    pub fn to_line(&self) -> super::error::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parse from a JSON line
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Shorten a call-site path to its last two components, `dir/file.rs:42`.
pub(crate) fn short_caller(file: &str, line: u32) -> String {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    match parts.next() {
        Some(dir) => format!("{}/{}:{}", dir, name, line),
        None => format!("{}:{}", name, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{wrap_metas, Meta};

    fn sample_statics() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("domain".to_string(), Value::String("api".to_string()));
        map
    }

    #[test]
    fn test_assemble_merges_static_and_metas() {
        let fields = wrap_metas(None, vec![Meta::new("uid", 7)]);
        let record = Record::assemble(
            Severity::Info,
            "user login",
            "core/logger.rs:1".to_string(),
            &Local::now(),
            &TimeLayout::default(),
            &sample_statics(),
            &fields,
        );

        assert_eq!(record.meta["domain"], Value::String("api".to_string()));
        assert_eq!(record.meta["uid"], serde_json::json!(7));
    }

    #[test]
    fn test_meta_wins_on_collision() {
        let fields = wrap_metas(None, vec![Meta::new("domain", "override")]);
        let record = Record::assemble(
            Severity::Info,
            "m",
            "a.rs:1".to_string(),
            &Local::now(),
            &TimeLayout::default(),
            &sample_statics(),
            &fields,
        );
        assert_eq!(record.meta["domain"], Value::String("override".to_string()));
    }

    #[test]
    fn test_line_encoding() {
        let record = Record::assemble(
            Severity::Warn,
            "low disk space",
            "sinks/file.rs:10".to_string(),
            &Local::now(),
            &TimeLayout::default(),
            &Map::new(),
            &Fields::new(),
        );

        let line = record.to_line().unwrap();
        assert_eq!(*line.last().unwrap(), b'\n');

        let parsed: Value = serde_json::from_slice(&line[..line.len() - 1]).unwrap();
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["msg"], "low disk space");
        assert_eq!(parsed["caller"], "sinks/file.rs:10");
        assert!(parsed.get("error").is_none());
        assert!(parsed["meta"].is_object());
    }

    #[test]
    fn test_json_roundtrip() {
        let fields = wrap_metas(None, vec![Meta::new("attempt", 3)]);
        let record = Record::assemble(
            Severity::Error,
            "retry exhausted",
            "core/router.rs:9".to_string(),
            &Local::now(),
            &TimeLayout::Iso8601Millis,
            &Map::new(),
            &fields,
        );

        let line = record.to_line().unwrap();
        let decoded = Record::from_json(std::str::from_utf8(&line).unwrap().trim_end()).unwrap();
        assert_eq!(decoded.level, Severity::Error);
        assert_eq!(decoded.msg, "retry exhausted");
        assert_eq!(decoded.meta["attempt"], serde_json::json!(3));
    }

    #[test]
    fn test_short_caller() {
        assert_eq!(short_caller("src/core/logger.rs", 42), "core/logger.rs:42");
        assert_eq!(short_caller("main.rs", 7), "main.rs:7");
    }
}
