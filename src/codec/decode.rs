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

//! Response decoding: wire XML -> [`Response`].
//!
//! Decoding runs in two passes. `parse_tree` turns the byte buffer into a
//! small element tree using quick-xml events (any tokenizer failure is
//! `MalformedXml`). The tree is then matched against the `methodResponse`
//! shapes. A server fault is a successful decode, never a `DecodeError`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::codec::{parse_datetime, Response};
use crate::constants::{limits, wire};
use crate::errors::DecodeError;
use crate::value::{Members, Value};

/// Decodes one response body.
pub fn decode_response(bytes: &[u8]) -> Result<Response, DecodeError> {
    let root = parse_tree(bytes)?;
    if root.name != wire::METHOD_RESPONSE {
        return Err(shape(format!(
            "expected <{}> root, found <{}>",
            wire::METHOD_RESPONSE,
            root.name
        )));
    }

    let body = root.only_child()?;
    match body.name.as_str() {
        wire::PARAMS => {
            let param = body.only_child_named(wire::PARAM)?;
            let value = param.only_child_named(wire::VALUE)?;
            Ok(Response::Success(decode_value(value, 0)?))
        }
        wire::FAULT => {
            let value = body.only_child_named(wire::VALUE)?;
            decode_fault(decode_value(value, 0)?)
        }
        other => Err(shape(format!(
            "expected <{}> or <{}>, found <{}>",
            wire::PARAMS,
            wire::FAULT,
            other
        ))),
    }
}

fn decode_fault(value: Value) -> Result<Response, DecodeError> {
    let members = match value {
        Value::Struct(members) => members,
        other => {
            return Err(shape(format!("fault value must be a struct, found {}", other.kind())));
        }
    };

    let code = match members.get(wire::FAULT_CODE) {
        Some(Value::Integer(code)) => *code,
        Some(Value::String(text)) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| shape(format!("{} is not an integer: {:?}", wire::FAULT_CODE, text)))?,
        Some(other) => {
            return Err(shape(format!("{} has kind {}", wire::FAULT_CODE, other.kind())));
        }
        None => return Err(shape(format!("fault is missing {}", wire::FAULT_CODE))),
    };

    let message = match members.get(wire::FAULT_STRING) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Integer(i)) => i.to_string(),
        Some(Value::Double(d)) => d.to_string(),
        Some(Value::Boolean(b)) => b.to_string(),
        Some(other) => {
            return Err(shape(format!("{} has kind {}", wire::FAULT_STRING, other.kind())));
        }
        None => return Err(shape(format!("fault is missing {}", wire::FAULT_STRING))),
    };

    Ok(Response::Fault { code, message })
}

fn decode_value(element: &Element, depth: usize) -> Result<Value, DecodeError> {
    if depth > limits::MAX_VALUE_DEPTH {
        return Err(shape(format!(
            "values nested deeper than {}",
            limits::MAX_VALUE_DEPTH
        )));
    }

    // An untyped <value> is a string.
    let typed = match element.children.as_slice() {
        [] => return Ok(Value::String(element.text.clone())),
        [typed] => typed,
        _ => return Err(shape("<value> holds more than one type element")),
    };

    let text = typed.text.as_str();
    match typed.name.as_str() {
        wire::TAG_NIL => Ok(Value::Nil),
        wire::TAG_I4 | wire::TAG_INT => text
            .trim()
            .parse::<i32>()
            .map(Value::Integer)
            .map_err(|_| malformed(&typed.name, text)),
        wire::TAG_I8 => text
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|wide| i32::try_from(wide).ok())
            .map(Value::Integer)
            .ok_or_else(|| malformed(&typed.name, text)),
        wire::TAG_BOOLEAN => match text.trim() {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            _ => Err(malformed(&typed.name, text)),
        },
        wire::TAG_DOUBLE => text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| malformed(&typed.name, text)),
        wire::TAG_STRING => Ok(Value::String(text.to_string())),
        wire::TAG_BASE64 => {
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map(Value::Base64)
                .map_err(|_| malformed(&typed.name, text))
        }
        wire::TAG_DATETIME => parse_datetime(text.trim())
            .map(Value::DateTime)
            .ok_or_else(|| malformed(&typed.name, text)),
        wire::TAG_ARRAY => {
            let data = typed.only_child_named(wire::DATA)?;
            let items = data
                .children
                .iter()
                .map(|item| {
                    item.expect_name(wire::VALUE)?;
                    decode_value(item, depth + 1)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
        wire::TAG_STRUCT => {
            let entries = typed
                .children
                .iter()
                .map(|member| -> Result<(String, Value), DecodeError> {
                    member.expect_name(wire::MEMBER)?;
                    let name = member.child_named(wire::NAME)?.text.clone();
                    let value = decode_value(member.child_named(wire::VALUE)?, depth + 1)?;
                    Ok((name, value))
                })
                .collect::<Result<Vec<_>, _>>()?;
            // Duplicate names keep the last value.
            Ok(Value::Struct(entries.into_iter().collect::<Members>()))
        }
        other => Err(DecodeError::UnknownType(other.to_string())),
    }
}

fn shape(detail: impl Into<String>) -> DecodeError {
    DecodeError::InvalidResponseShape(detail.into())
}

fn malformed(kind: &str, text: &str) -> DecodeError {
    DecodeError::MalformedValue {
        kind: kind.to_string(),
        text: text.to_string(),
    }
}

/// Minimal element tree: name, concatenated text, element children.
#[derive(Debug)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| DecodeError::MalformedXml(format!("element name is not UTF-8: {}", e)))?
            .to_string();
        Ok(Self {
            name,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn expect_name(&self, name: &str) -> Result<(), DecodeError> {
        if self.name == name {
            Ok(())
        } else {
            Err(shape(format!("expected <{}>, found <{}>", name, self.name)))
        }
    }

    fn only_child(&self) -> Result<&Element, DecodeError> {
        match self.children.as_slice() {
            [child] => Ok(child),
            children => Err(shape(format!(
                "<{}> must hold exactly one element, found {}",
                self.name,
                children.len()
            ))),
        }
    }

    fn only_child_named(&self, name: &str) -> Result<&Element, DecodeError> {
        let child = self.only_child()?;
        child.expect_name(name)?;
        Ok(child)
    }

    fn child_named(&self, name: &str) -> Result<&Element, DecodeError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| shape(format!("<{}> is missing <{}>", self.name, name)))
    }
}

fn parse_tree(bytes: &[u8]) -> Result<Element, DecodeError> {
    // quick-xml reports a closing tag cut off at EOF (`</methodResponse`) as
    // a complete end event, so the tail is checked up front.
    match bytes.iter().rposition(|b| !b.is_ascii_whitespace()) {
        Some(last) if bytes[last] == b'>' => {}
        _ => {
            return Err(DecodeError::MalformedXml(
                "document does not end with a closed tag".to_string(),
            ));
        }
    }

    let mut reader = Reader::from_reader(bytes);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            DecodeError::MalformedXml(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(DecodeError::MalformedXml(
                        "element after the root element".to_string(),
                    ));
                }
                if stack.len() >= limits::MAX_ELEMENT_DEPTH {
                    return Err(DecodeError::MalformedXml(format!(
                        "elements nested deeper than {}",
                        limits::MAX_ELEMENT_DEPTH
                    )));
                }
                stack.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    DecodeError::MalformedXml("closing tag without opening tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| DecodeError::MalformedXml(format!("bad text content: {}", e)))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|e| DecodeError::MalformedXml(format!("CDATA is not UTF-8: {}", e)))?;
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::MalformedXml(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    let root = root.ok_or_else(|| DecodeError::MalformedXml("document has no root element".to_string()))?;
    trace!(root = %root.name, "parsed response tree");
    Ok(root)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DecodeError::MalformedXml(
                "more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => {
            return Err(DecodeError::MalformedXml(
                "text outside the root element".to_string(),
            ));
        }
    }
    Ok(())
}
