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

//! xmlrpc-client constants - single source of truth for codes, tags and names.

/// Fault codes the client reports on its own behalf
pub mod faults {
    /// Transfer failed below the protocol layer
    pub const TRANSPORT_ERROR: i32 = -32300;
    /// Response body was not a conforming XML-RPC document
    pub const INVALID_RESPONSE: i32 = -32600;
    /// Message paired with `INVALID_RESPONSE`
    pub const INVALID_RESPONSE_MESSAGE: &str = "Server error: Invalid xml-rpc response";
}

/// XML-RPC wire vocabulary
pub mod wire {
    pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

    pub const METHOD_CALL: &str = "methodCall";
    pub const METHOD_NAME: &str = "methodName";
    pub const METHOD_RESPONSE: &str = "methodResponse";
    pub const PARAMS: &str = "params";
    pub const PARAM: &str = "param";
    pub const FAULT: &str = "fault";
    pub const VALUE: &str = "value";
    pub const DATA: &str = "data";
    pub const MEMBER: &str = "member";
    pub const NAME: &str = "name";

    pub const TAG_NIL: &str = "nil";
    pub const TAG_BOOLEAN: &str = "boolean";
    pub const TAG_I4: &str = "i4";
    pub const TAG_INT: &str = "int";
    pub const TAG_I8: &str = "i8";
    pub const TAG_DOUBLE: &str = "double";
    pub const TAG_STRING: &str = "string";
    pub const TAG_BASE64: &str = "base64";
    pub const TAG_DATETIME: &str = "dateTime.iso8601";
    pub const TAG_ARRAY: &str = "array";
    pub const TAG_STRUCT: &str = "struct";

    pub const FAULT_CODE: &str = "faultCode";
    pub const FAULT_STRING: &str = "faultString";

    /// Canonical `dateTime.iso8601` layout. `%.f` writes nothing for whole
    /// seconds and is optional when parsing.
    pub const DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S%.f";
    /// Dashed layout, written for years outside 0000-9999 and accepted on decode
    pub const DATETIME_FORMAT_DASHED: &str = "%Y-%m-%dT%H:%M:%S%.f";
}

/// HTTP header names and values attached to every call
pub mod http {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const USER_AGENT: &str = "User-Agent";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const TEXT_XML: &str = "text/xml";
    pub const DEFAULT_USER_AGENT: &str = concat!("xmlrpc-client/", env!("CARGO_PKG_VERSION"));
}

/// Configuration environment variables
pub mod config {
    pub const ENV_URL: &str = "XMLRPC_URL";
    pub const ENV_USER: &str = "XMLRPC_USER";
    pub const ENV_PASSWORD: &str = "XMLRPC_PASSWORD";
    pub const ENV_USER_AGENT: &str = "XMLRPC_USER_AGENT";
    pub const ENV_PROXY: &str = "XMLRPC_PROXY";
    pub const ENV_PROXY_USER: &str = "XMLRPC_PROXY_USER";
    pub const ENV_PROXY_PASSWORD: &str = "XMLRPC_PROXY_PASSWORD";
    pub const ENV_TIMEOUT_SECS: &str = "XMLRPC_TIMEOUT_SECS";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

    pub const DEFAULT_URL: &str = "http://localhost:80/";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Transport limits
pub mod limits {
    /// Maximum accepted response body (10 MB)
    pub const MAX_RESPONSE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    /// Maximum element nesting accepted by the response parser
    pub const MAX_ELEMENT_DEPTH: usize = 1024;
    /// Maximum array/struct nesting inside one decoded value
    pub const MAX_VALUE_DEPTH: usize = 64;
}
