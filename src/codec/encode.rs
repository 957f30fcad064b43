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

//! Request composition: value model -> wire XML.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::escape::escape;

use crate::codec::{format_datetime, Response};
use crate::constants::wire;
use crate::errors::EncodeError;
use crate::value::{Members, Value};

/// Encodes a `methodCall` document for `method` with `params` in order.
pub fn encode_call(method: &str, params: &[Value]) -> Result<Vec<u8>, EncodeError> {
    if method.is_empty() {
        return Err(EncodeError::InvalidMethodName);
    }

    let mut out = String::with_capacity(128);
    out.push_str(wire::XML_DECLARATION);
    open(&mut out, wire::METHOD_CALL);
    open(&mut out, wire::METHOD_NAME);
    out.push_str(&escape(method));
    close(&mut out, wire::METHOD_NAME);
    write_params(&mut out, params);
    close(&mut out, wire::METHOD_CALL);

    Ok(out.into_bytes())
}

/// Encodes a `methodResponse` document: one param on success, a
/// `faultCode`/`faultString` struct on fault.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut out = String::with_capacity(128);
    out.push_str(wire::XML_DECLARATION);
    open(&mut out, wire::METHOD_RESPONSE);
    match response {
        Response::Success(value) => write_params(&mut out, std::slice::from_ref(value)),
        Response::Fault { code, message } => {
            let fault = Members::new()
                .with(wire::FAULT_CODE, *code)
                .with(wire::FAULT_STRING, message.as_str());
            open(&mut out, wire::FAULT);
            write_value(&mut out, &Value::Struct(fault));
            close(&mut out, wire::FAULT);
        }
    }
    close(&mut out, wire::METHOD_RESPONSE);
    out.into_bytes()
}

fn write_params(out: &mut String, params: &[Value]) {
    open(out, wire::PARAMS);
    for param in params {
        open(out, wire::PARAM);
        write_value(out, param);
        close(out, wire::PARAM);
    }
    close(out, wire::PARAMS);
}

fn write_value(out: &mut String, value: &Value) {
    open(out, wire::VALUE);
    match value {
        Value::Nil => {
            out.push('<');
            out.push_str(wire::TAG_NIL);
            out.push_str("/>");
        }
        Value::Boolean(b) => scalar(out, wire::TAG_BOOLEAN, if *b { "1" } else { "0" }),
        Value::Integer(i) => scalar(out, wire::TAG_I4, &i.to_string()),
        Value::Double(d) => scalar(out, wire::TAG_DOUBLE, &format_double(*d)),
        Value::String(s) => scalar(out, wire::TAG_STRING, &escape(s.as_str())),
        Value::Base64(bytes) => scalar(out, wire::TAG_BASE64, &STANDARD.encode(bytes)),
        Value::DateTime(dt) => scalar(out, wire::TAG_DATETIME, &format_datetime(dt)),
        Value::Array(items) => {
            open(out, wire::TAG_ARRAY);
            open(out, wire::DATA);
            for item in items {
                write_value(out, item);
            }
            close(out, wire::DATA);
            close(out, wire::TAG_ARRAY);
        }
        Value::Struct(members) => {
            open(out, wire::TAG_STRUCT);
            for (name, member) in members.iter() {
                open(out, wire::MEMBER);
                scalar(out, wire::NAME, &escape(name));
                write_value(out, member);
                close(out, wire::MEMBER);
            }
            close(out, wire::TAG_STRUCT);
        }
    }
    close(out, wire::VALUE);
}

/// Decimal text that always carries a fractional part and never an exponent.
fn format_double(d: f64) -> String {
    // f64's Display is the shortest text that parses back to the same bits.
    let text = d.to_string();
    if d.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn scalar(out: &mut String, tag: &str, text: &str) {
    open(out, tag);
    out.push_str(text);
    close(out, tag);
}

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
