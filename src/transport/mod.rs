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

//! Transport capability consumed by the client.
//!
//! A transport accepts an HTTP POST, hands back an opaque [`TransferHandle`]
//! immediately, and later reports exactly how the transfer ended by pushing a
//! [`TransportEvent`] through its [`TransportNotifier`]. The transport knows
//! nothing about XML-RPC; it moves bytes.

pub mod http;

use std::fmt;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Opaque token identifying one in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferHandle(pub u64);

impl fmt::Display for TransferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fully composed POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPost {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpPost {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Completion notifications a transport emits for each accepted handle.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Response body fully received
    Completed { handle: TransferHandle, body: Bytes },
    /// Transfer failed below the protocol layer
    Failed {
        handle: TransferHandle,
        error: String,
    },
}

impl TransportEvent {
    pub fn handle(&self) -> TransferHandle {
        match self {
            TransportEvent::Completed { handle, .. } | TransportEvent::Failed { handle, .. } => {
                *handle
            }
        }
    }
}

/// Sending half given to a transport so it can report completions.
#[derive(Debug, Clone)]
pub struct TransportNotifier {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportNotifier {
    pub fn completed(&self, handle: TransferHandle, body: impl Into<Bytes>) {
        self.notify(TransportEvent::Completed {
            handle,
            body: body.into(),
        });
    }

    pub fn failed(&self, handle: TransferHandle, error: impl Into<String>) {
        self.notify(TransportEvent::Failed {
            handle,
            error: error.into(),
        });
    }

    fn notify(&self, event: TransportEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("transport event dropped: dispatcher has shut down");
        }
    }
}

/// Creates a notifier and the receiver the dispatcher drains.
pub fn channel() -> (TransportNotifier, mpsc::UnboundedReceiver<TransportEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TransportNotifier { tx }, rx)
}

/// An asynchronous HTTP POST capability.
///
/// # Invariants
/// - `send` must return without waiting on the network.
/// - Every returned handle must eventually be reported once through the
///   notifier, as `Completed` or `Failed`.
/// - `send` must not report a completion synchronously by calling back into
///   the client; completions travel through the notifier channel.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, post: HttpPost) -> TransferHandle;
}
