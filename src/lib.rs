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

//! xmlrpc-client: an asynchronous XML-RPC client.
//!
//! Calls are encoded to `methodCall` XML, posted through a pluggable
//! [`transport::Transport`], and completed out of band: each submitted
//! request yields exactly one [`client::ClientEvent`] carrying either the
//! decoded result or a fault code and message.

pub mod client;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod literal;
pub mod transport;
pub mod value;
