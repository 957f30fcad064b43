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

//! Typed parameter literals for the command line.
//!
//! `kind:text` picks the XML-RPC type explicitly. `nil` is the nil value,
//! `json:` converts a JSON document, and anything without a known prefix is
//! passed as a string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::codec::parse_datetime;
use crate::errors::LiteralError;
use crate::value::Value;

pub fn parse_param(raw: &str) -> Result<Value, LiteralError> {
    if raw == "nil" {
        return Ok(Value::Nil);
    }

    let Some((prefix, text)) = raw.split_once(':') else {
        return Ok(Value::String(raw.to_string()));
    };

    let invalid = |kind: &'static str| LiteralError::Invalid {
        kind,
        text: text.to_string(),
    };

    match prefix {
        "i4" | "int" => text.trim().parse().map(Value::Integer).map_err(|_| invalid("int")),
        "bool" | "boolean" => match text.trim() {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            _ => Err(invalid("bool")),
        },
        "double" => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map(Value::Double)
            .ok_or_else(|| invalid("double")),
        "str" | "string" => Ok(Value::String(text.to_string())),
        "b64" | "base64" => STANDARD
            .decode(text.trim())
            .map(Value::Base64)
            .map_err(|_| invalid("base64")),
        "datetime" => parse_datetime(text.trim())
            .map(Value::DateTime)
            .ok_or_else(|| invalid("datetime")),
        "json" => Ok(Value::from(serde_json::from_str::<serde_json::Value>(text)?)),
        // "http://..." and friends are plain strings.
        _ => Ok(Value::String(raw.to_string())),
    }
}
