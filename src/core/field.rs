//! Per-call contextual metadata
//!
//! This module provides:
//! - `FieldValue`: typed values for annotation fields
//! - `Meta`: a single key/value annotation attached to one emission call
//! - `Fields`: the field list handed to an emission call
//!
//! Metas are grouped under the `"meta"` key of the encoded record, next
//! to the logger's static fields, so per-call context stays structurally
//! distinguishable from top-level record keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type for annotation fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for record encoding
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// A single (key, value) annotation for one emission call.
///
/// A `Meta` is attached to exactly one log call and is never merged into
/// the logger's static fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    key: String,
    value: FieldValue,
}

impl Meta {
    /// Create a meta annotation
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Field list handed to a single emission call.
///
/// Produced by [`wrap_metas`] or built up directly. The optional error is
/// encoded as the record's top-level `error` key; metas land under the
/// `"meta"` group.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    error: Option<String>,
    metas: Vec<Meta>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a meta annotation
    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.metas.push(meta);
        self
    }

    /// Attach an error, rendered through `Display`
    #[must_use]
    pub fn with_error(mut self, err: &dyn std::error::Error) -> Self {
        self.error = Some(err.to_string());
        self
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metas(&self) -> &[Meta] {
        &self.metas
    }
}

impl From<Vec<Meta>> for Fields {
    fn from(metas: Vec<Meta>) -> Self {
        Self { error: None, metas }
    }
}

/// Wrap an optional error and metas into a field list.
///
/// If `err` is present an `error` field is prepended to the record; all
/// metas are grouped under the `"meta"` namespace at emission time.
///
/// # Examples
///
/// ```
/// use service_kit::core::{wrap_metas, Meta};
///
/// let fields = wrap_metas(None, vec![Meta::new("uid", 7), Meta::new("action", "login")]);
/// assert_eq!(fields.metas().len(), 2);
/// assert!(fields.error().is_none());
/// ```
pub fn wrap_metas(err: Option<&dyn std::error::Error>, metas: Vec<Meta>) -> Fields {
    Fields {
        error: err.map(|e| e.to_string()),
        metas,
    }
}
