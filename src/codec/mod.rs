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

//! XML-RPC wire codec.
//!
//! `encode` composes `methodCall` (and `methodResponse`) documents from the
//! value model; `decode` turns a response body back into a [`Response`].
//! Both directions are synchronous, pure and share no state.

pub mod decode;
pub mod encode;

pub use decode::decode_response;
pub use encode::{encode_call, encode_response};

use chrono::{Datelike, NaiveDateTime};

use crate::constants::wire;
use crate::value::Value;

/// Outcome of one decoded `methodResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The single return value
    Success(Value),
    /// Protocol-level fault reported by the server
    Fault { code: i32, message: String },
}

impl Response {
    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault { .. })
    }
}

/// Renders a `dateTime.iso8601` body.
///
/// Years 0000-9999 use the compact layout. Other years carry a sign and a
/// variable digit count, so they use the dashed layout where the separator
/// ends the year field.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    let layout = if (0..=9999).contains(&dt.year()) {
        wire::DATETIME_FORMAT
    } else {
        wire::DATETIME_FORMAT_DASHED
    };
    dt.format(layout).to_string()
}

/// Parses either `dateTime.iso8601` layout, with optional fractional seconds.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, wire::DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, wire::DATETIME_FORMAT_DASHED))
        .ok()
}
