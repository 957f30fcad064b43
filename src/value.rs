// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! XML-RPC value model.
//!
//! `Value` is a closed tagged union over every kind the protocol can carry.
//! It is pure data: construction, structural equality and a deterministic
//! debug rendering. Nothing in this module can fail.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;

use crate::codec::format_datetime;
use crate::constants::wire;

/// A single XML-RPC value. Composite variants own their children.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i32),
    Double(f64),
    String(String),
    Base64(Vec<u8>),
    /// Timestamp without an enforced timezone.
    DateTime(NaiveDateTime),
    Array(Vec<Value>),
    Struct(Members),
}

impl Value {
    /// Wraps raw bytes as a base64 payload.
    pub fn base64(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Base64(bytes.into())
    }

    /// The wire tag name of this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => wire::TAG_NIL,
            Value::Boolean(_) => wire::TAG_BOOLEAN,
            Value::Integer(_) => wire::TAG_I4,
            Value::Double(_) => wire::TAG_DOUBLE,
            Value::String(_) => wire::TAG_STRING,
            Value::Base64(_) => wire::TAG_BASE64,
            Value::DateTime(_) => wire::TAG_DATETIME,
            Value::Array(_) => wire::TAG_ARRAY,
            Value::Struct(_) => wire::TAG_STRUCT,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Base64(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Members> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Multi-line rendering for diagnostics. Not the wire format.
    pub fn pprint(&self) -> String {
        let mut out = String::new();
        self.pprint_into(&mut out, 0);
        out
    }

    fn pprint_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Value::Array(items) => {
                out.push_str(&format!("{}array[{}]\n", pad, items.len()));
                for item in items {
                    item.pprint_into(out, depth + 1);
                }
            }
            Value::Struct(members) => {
                out.push_str(&format!("{}struct{{{}}}\n", pad, members.len()));
                for (name, value) in members.iter() {
                    out.push_str(&format!("{}  {}:\n", pad, name));
                    value.pprint_into(out, depth + 2);
                }
            }
            scalar => out.push_str(&format!("{}{}\n", pad, scalar)),
        }
    }
}

/// Single-line rendering, e.g. `struct{a: i4(1), b: array[string("x")]}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "boolean({})", b),
            Value::Integer(i) => write!(f, "i4({})", i),
            Value::Double(d) => write!(f, "double({:?})", d),
            Value::String(s) => write!(f, "string({:?})", s),
            Value::Base64(b) => write!(f, "base64({})", STANDARD.encode(b)),
            Value::DateTime(dt) => write!(f, "dateTime({})", format_datetime(dt)),
            Value::Array(items) => {
                write!(f, "array[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(members) => {
                write!(f, "struct{{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Struct members in insertion order with unique names.
///
/// Inserting a name that is already present replaces its value and keeps
/// the original position, so the last value written for a name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Members {
    entries: Vec<(String, Value)>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a member. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder form of [`Members::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Members {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut entries: Vec<(String, Value)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (name, value) in iter {
            let name = name.into();
            match index.get(&name) {
                Some(&pos) => entries[pos].1 = value,
                None => {
                    index.insert(name.clone(), entries.len());
                    entries.push((name, value));
                }
            }
        }
        Self { entries }
    }
}

impl IntoIterator for Members {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Members> for Value {
    fn from(members: Members) -> Self {
        Value::Struct(members)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Value::Nil => Json::Null,
            Value::Boolean(b) => Json::Bool(b),
            Value::Integer(i) => Json::from(i),
            Value::Double(d) => serde_json::Number::from_f64(d)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(d.to_string())),
            Value::String(s) => Json::String(s),
            Value::Base64(b) => Json::String(STANDARD.encode(b)),
            Value::DateTime(dt) => Json::String(format_datetime(&dt)),
            Value::Array(items) => Json::Array(items.into_iter().map(Json::from).collect()),
            Value::Struct(members) => Json::Object(
                members
                    .into_iter()
                    .map(|(name, value)| (name, Json::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                Some(i) => Value::Integer(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Value::Struct(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_members_insert_keeps_last_value_at_first_position() {
        let mut m = Members::new();
        assert!(m.insert("a", Value::Integer(1)).is_none());
        m.insert("b", Value::Integer(2));
        let prev = m.insert("a", Value::Integer(3));

        assert_eq!(prev, Some(Value::Integer(1)));
        assert_eq!(m.len(), 2);
        let names: Vec<&str> = m.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_members_from_iter_deduplicates() {
        let m: Members = vec![
            ("x", Value::from("first")),
            ("y", Value::Nil),
            ("x", Value::from("second")),
        ]
        .into_iter()
        .collect();

        assert_eq!(m.len(), 2);
        assert_eq!(m.get("x"), Some(&Value::from("second")));
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::Array(vec![Value::Integer(1), Value::from("two")]);
        let b = Value::Array(vec![Value::Integer(1), Value::from("two")]);
        let c = Value::Array(vec![Value::from("two"), Value::Integer(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_is_deterministic() {
        let dt = NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap();
        let v = Value::Struct(
            Members::new()
                .with("n", 5)
                .with("when", dt)
                .with("tags", vec![Value::from("a"), Value::Boolean(true)]),
        );
        assert_eq!(
            v.to_string(),
            "struct{n: i4(5), when: dateTime(20261017T09:30:00), tags: array[string(\"a\"), boolean(true)]}"
        );
        assert_eq!(v.to_string(), v.clone().to_string());
    }

    #[test]
    fn test_pprint_nests() {
        let v = Value::Array(vec![Value::Integer(1), Value::Array(vec![Value::Nil])]);
        assert_eq!(v.pprint(), "array[2]\n  i4(1)\n  array[1]\n    nil\n");
    }

    #[test]
    fn test_json_conversion() {
        let v = Value::Struct(
            Members::new()
                .with("ok", true)
                .with("blob", Value::base64(b"hi".to_vec()))
                .with("ratio", 0.5),
        );
        let json = serde_json::Value::from(v);
        assert_eq!(json, serde_json::json!({"ok": true, "blob": "aGk=", "ratio": 0.5}));

        let back = Value::from(serde_json::json!([1, 2.5, null, "s", 10_000_000_000i64]));
        assert_eq!(
            back,
            Value::Array(vec![
                Value::Integer(1),
                Value::Double(2.5),
                Value::Nil,
                Value::from("s"),
                Value::Double(10_000_000_000.0),
            ])
        );
    }
}
