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

// Error types for encoding, decoding and client setup

use thiserror::Error;

/// Request composition errors (caller misuse, detected before any I/O)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Method name was empty
    #[error("Invalid method name: must not be empty")]
    InvalidMethodName,
}

/// Response decoding errors (malformed or non-conforming wire data)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is not well-formed XML
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// Well-formed XML that is not a methodResponse envelope
    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    /// Value element with an unrecognized type tag
    #[error("Unknown value type: <{0}>")]
    UnknownType(String),

    /// Text content does not parse as the claimed kind
    #[error("Malformed {kind} value: {text:?}")]
    MalformedValue { kind: String, text: String },
}

/// Client-level errors surfaced synchronously
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be encoded
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration or transport setup failed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Command-line parameter literal could not be parsed
#[derive(Error, Debug)]
pub enum LiteralError {
    #[error("Invalid {kind} literal: {text:?}")]
    Invalid { kind: &'static str, text: String },

    #[error("Invalid json literal: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: ClientError = EncodeError::InvalidMethodName.into();
        match err {
            ClientError::Encode(EncodeError::InvalidMethodName) => (),
            _ => panic!("Expected ClientError::Encode"),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = DecodeError::MalformedValue {
            kind: "i4".to_string(),
            text: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed i4 value: \"abc\"");
        assert_eq!(
            DecodeError::UnknownType("widget".into()).to_string(),
            "Unknown value type: <widget>"
        );
    }
}
