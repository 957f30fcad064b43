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

//! XML-RPC client and completion-correlation engine.
//!
//! `Client::submit` encodes a call, hands it to the [`Transport`] and returns
//! a [`RequestId`] at once. The transport later reports how the transfer
//! ended; the client maps the transfer handle back to the request, decodes
//! the body and emits exactly one [`ClientEvent`] for that id.
//!
//! ## Locking discipline
//!
//! The pending table is a single `Mutex<HashMap<TransferHandle, _>>`.
//! - `submit` holds the lock across `Transport::send` and the insert, so a
//!   completion racing the insert waits behind it.
//! - Notifications remove under the lock; only the caller that gets the
//!   entry back emits an event. Misses are no-ops.
//! - Events are emitted after the lock is released.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::codec::{self, Response};
use crate::config::ClientConfig;
use crate::constants::{faults, http};
use crate::dispatch::spawn_dispatcher;
use crate::errors::ClientError;
use crate::transport::http::HttpTransport;
use crate::transport::{self, HttpPost, TransferHandle, Transport, TransportEvent};
use crate::value::Value;

/// Client-assigned identifier correlating `submit` with its terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal event for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Done {
        id: RequestId,
        value: Value,
    },
    Failed {
        id: RequestId,
        code: i32,
        message: String,
    },
}

impl ClientEvent {
    pub fn id(&self) -> RequestId {
        match self {
            ClientEvent::Done { id, .. } | ClientEvent::Failed { id, .. } => *id,
        }
    }
}

/// Receives terminal events. Called outside the client's internal lock.
pub trait CompletionListener: Send + Sync + 'static {
    fn notify(&self, event: ClientEvent);
}

impl CompletionListener for mpsc::UnboundedSender<ClientEvent> {
    fn notify(&self, event: ClientEvent) {
        if let Err(e) = self.send(event) {
            debug!(request_id = %e.0.id(), "Event dropped: listener closed");
        }
    }
}

#[derive(Debug)]
struct PendingRequest {
    id: RequestId,
    method: String,
}

pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    listener: Arc<dyn CompletionListener>,
    pending: Mutex<HashMap<TransferHandle, PendingRequest>>,
    next_id: AtomicU64,
}

impl Client {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        listener: Arc<dyn CompletionListener>,
    ) -> Self {
        Self {
            config,
            transport,
            listener,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Builds a client on the HTTP transport with its dispatcher task
    /// running, and returns the receiver of its terminal events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(
        config: ClientConfig,
    ) -> Result<(Arc<Client>, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let (notifier, transport_events) = transport::channel();
        let transport = HttpTransport::new(&config, notifier)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let client = Arc::new(Client::new(config, Arc::new(transport), Arc::new(events_tx)));
        spawn_dispatcher(&client, transport_events);

        info!(url = %client.config.url, "XML-RPC client ready");
        Ok((client, events_rx))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of requests still awaiting their transport notification.
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    /// Encodes and sends a call. Returns its id without waiting on the network.
    ///
    /// An empty method name fails here: nothing is sent and nothing is
    /// registered.
    pub fn submit(&self, method: &str, params: &[Value]) -> Result<RequestId, ClientError> {
        let body = codec::encode_call(method, params)?;
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let post = self.compose_post(body);

        let displaced = {
            let mut pending = self.lock_pending();
            let handle = self.transport.send(post);
            debug!(request_id = %id, handle = %handle, method = %method, "Request submitted");
            pending.insert(
                handle,
                PendingRequest {
                    id,
                    method: method.to_string(),
                },
            )
        };

        // A transport that hands out a live handle twice would strand the
        // earlier request; fail it so it still gets its one terminal event.
        if let Some(stale) = displaced {
            warn!(request_id = %stale.id, method = %stale.method, "Transport reused a live handle");
            self.listener.notify(ClientEvent::Failed {
                id: stale.id,
                code: faults::TRANSPORT_ERROR,
                message: "Transfer handle reused by transport".to_string(),
            });
        }

        Ok(id)
    }

    /// The transfer behind `handle` failed below the protocol layer.
    pub fn on_transport_failure(&self, handle: TransferHandle, description: &str) {
        let Some(request) = self.take_pending(handle) else {
            debug!(handle = %handle, "Ignoring failure for unknown or finished transfer");
            return;
        };

        warn!(
            request_id = %request.id,
            method = %request.method,
            error = %description,
            "Request failed in transport"
        );
        self.listener.notify(ClientEvent::Failed {
            id: request.id,
            code: faults::TRANSPORT_ERROR,
            message: description.to_string(),
        });
    }

    /// The transfer behind `handle` delivered its full response body.
    pub fn on_transport_success(&self, handle: TransferHandle, body: &[u8]) {
        let Some(request) = self.take_pending(handle) else {
            debug!(handle = %handle, "Ignoring completion for unknown or finished transfer");
            return;
        };

        let event = match codec::decode_response(body) {
            Ok(Response::Success(value)) => {
                debug!(request_id = %request.id, method = %request.method, "Request done");
                ClientEvent::Done {
                    id: request.id,
                    value,
                }
            }
            Ok(Response::Fault { code, message }) => {
                info!(
                    request_id = %request.id,
                    method = %request.method,
                    code = code,
                    fault = %message,
                    "Request returned fault"
                );
                ClientEvent::Failed {
                    id: request.id,
                    code,
                    message,
                }
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    method = %request.method,
                    error = %e,
                    "Invalid XML-RPC response"
                );
                ClientEvent::Failed {
                    id: request.id,
                    code: faults::INVALID_RESPONSE,
                    message: faults::INVALID_RESPONSE_MESSAGE.to_string(),
                }
            }
        };

        self.listener.notify(event);
    }

    /// Routes one transport notification.
    pub fn dispatch(&self, event: TransportEvent) {
        match event {
            TransportEvent::Completed { handle, body } => self.on_transport_success(handle, &body),
            TransportEvent::Failed { handle, error } => self.on_transport_failure(handle, &error),
        }
    }

    fn take_pending(&self, handle: TransferHandle) -> Option<PendingRequest> {
        self.lock_pending().remove(&handle)
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<TransferHandle, PendingRequest>> {
        // The table holds plain data; a panic elsewhere cannot leave it half-updated.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn compose_post(&self, body: Vec<u8>) -> HttpPost {
        let mut headers = vec![
            (http::CONTENT_TYPE.to_string(), http::TEXT_XML.to_string()),
            (http::CONTENT_LENGTH.to_string(), body.len().to_string()),
            (http::USER_AGENT.to_string(), self.config.user_agent.clone()),
        ];
        if let Some(auth) = self.config.authorization() {
            headers.push((http::AUTHORIZATION.to_string(), auth));
        }

        HttpPost {
            url: self.config.url.clone(),
            headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_response;
    use crate::value::Members;
    use std::collections::HashSet;

    /// Records posts and hands out sequential handles; never notifies.
    #[derive(Default)]
    struct RecordingTransport {
        posts: Mutex<Vec<HttpPost>>,
        next: AtomicU64,
    }

    impl Transport for RecordingTransport {
        fn send(&self, post: HttpPost) -> TransferHandle {
            self.posts.lock().unwrap().push(post);
            TransferHandle(self.next.fetch_add(1, Ordering::SeqCst) + 100)
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<ClientEvent>>,
    }

    impl CompletionListener for RecordingListener {
        fn notify(&self, event: ClientEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct Harness {
        client: Client,
        transport: Arc<RecordingTransport>,
        listener: Arc<RecordingListener>,
    }

    impl Harness {
        fn new(config: ClientConfig) -> Self {
            let transport = Arc::new(RecordingTransport::default());
            let listener = Arc::new(RecordingListener::default());
            let client = Client::new(config, transport.clone(), listener.clone());
            Self {
                client,
                transport,
                listener,
            }
        }

        fn events(&self) -> Vec<ClientEvent> {
            self.listener.events.lock().unwrap().clone()
        }

        fn last_handle(&self) -> TransferHandle {
            TransferHandle(self.transport.next.load(Ordering::SeqCst) + 99)
        }
    }

    #[test]
    fn test_submit_composes_post() {
        let config = ClientConfig::new("http://rpc.example/RPC2")
            .with_user_agent("probe/1.0")
            .with_credentials("user", "pass");
        let h = Harness::new(config);

        let id = h.client.submit("sum", &[Value::Integer(2), Value::Integer(3)]).unwrap();
        assert_eq!(id, RequestId(1));

        let posts = h.transport.posts.lock().unwrap();
        let post = &posts[0];
        assert_eq!(post.url, "http://rpc.example/RPC2");
        assert_eq!(post.header("content-type"), Some("text/xml"));
        assert_eq!(post.header("Content-Length"), Some(post.body.len().to_string().as_str()));
        assert_eq!(post.header("User-Agent"), Some("probe/1.0"));
        assert_eq!(post.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(
            post.body,
            codec::encode_call("sum", &[Value::Integer(2), Value::Integer(3)]).unwrap()
        );
        assert_eq!(h.client.pending_count(), 1);
    }

    #[test]
    fn test_no_authorization_without_credentials() {
        let h = Harness::new(ClientConfig::default());
        h.client.submit("ping", &[]).unwrap();
        let posts = h.transport.posts.lock().unwrap();
        assert!(posts[0].header("Authorization").is_none());
        assert_eq!(posts[0].header("User-Agent"), Some(http::DEFAULT_USER_AGENT));
    }

    #[test]
    fn test_invalid_method_is_synchronous_and_sends_nothing() {
        let h = Harness::new(ClientConfig::default());
        let err = h.client.submit("", &[Value::Nil]).unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
        assert!(h.transport.posts.lock().unwrap().is_empty());
        assert_eq!(h.client.pending_count(), 0);
        assert!(h.events().is_empty());

        // The failed submit does not consume an id.
        assert_eq!(h.client.submit("ok", &[]).unwrap(), RequestId(1));
    }

    #[test]
    fn test_success_emits_done_exactly_once() {
        let h = Harness::new(ClientConfig::default());
        let id = h.client.submit("sum", &[Value::Integer(2), Value::Integer(3)]).unwrap();
        let handle = h.last_handle();
        let body = encode_response(&Response::Success(Value::Integer(5)));

        h.client.on_transport_success(handle, &body);
        h.client.on_transport_success(handle, &body);
        h.client.on_transport_failure(handle, "late failure");

        assert_eq!(
            h.events(),
            vec![ClientEvent::Done {
                id,
                value: Value::Integer(5)
            }]
        );
        assert_eq!(h.client.pending_count(), 0);
    }

    #[test]
    fn test_fault_is_forwarded_verbatim() {
        let h = Harness::new(ClientConfig::default());
        let id = h.client.submit("sum", &[]).unwrap();
        let body = encode_response(&Response::Fault {
            code: 4,
            message: "Too many parameters.".into(),
        });

        h.client.on_transport_success(h.last_handle(), &body);

        assert_eq!(
            h.events(),
            vec![ClientEvent::Failed {
                id,
                code: 4,
                message: "Too many parameters.".into()
            }]
        );
    }

    #[test]
    fn test_garbage_body_reports_invalid_response() {
        let h = Harness::new(ClientConfig::default());
        let id = h.client.submit("sum", &[]).unwrap();

        h.client.on_transport_success(h.last_handle(), b"<html>502 Bad Gateway");

        assert_eq!(
            h.events(),
            vec![ClientEvent::Failed {
                id,
                code: faults::INVALID_RESPONSE,
                message: faults::INVALID_RESPONSE_MESSAGE.into()
            }]
        );
        assert_eq!(h.client.pending_count(), 0);
    }

    #[test]
    fn test_transport_failure_then_spurious_success() {
        let h = Harness::new(ClientConfig::default());
        let id = h.client.submit("sum", &[]).unwrap();
        let handle = h.last_handle();

        h.client.on_transport_failure(handle, "Connection refused");
        h.client
            .on_transport_success(handle, &encode_response(&Response::Success(Value::Nil)));

        assert_eq!(
            h.events(),
            vec![ClientEvent::Failed {
                id,
                code: faults::TRANSPORT_ERROR,
                message: "Connection refused".into()
            }]
        );
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let h = Harness::new(ClientConfig::default());
        h.client.submit("a", &[]).unwrap();
        h.client.on_transport_failure(TransferHandle(9999), "boom");
        h.client.on_transport_success(TransferHandle(9999), b"");
        assert!(h.events().is_empty());
        assert_eq!(h.client.pending_count(), 1);
    }

    #[test]
    fn test_out_of_order_completion_maps_to_right_ids() {
        let h = Harness::new(ClientConfig::default());
        let first = h.client.submit("first", &[]).unwrap();
        let first_handle = h.last_handle();
        let second = h.client.submit("second", &[]).unwrap();
        let second_handle = h.last_handle();
        assert!(second > first);

        let reply = |s: &str| {
            encode_response(&Response::Success(Value::Struct(Members::new().with("from", s))))
        };
        h.client.on_transport_success(second_handle, &reply("second"));
        h.client.on_transport_success(first_handle, &reply("first"));

        let events = h.events();
        assert_eq!(events[0].id(), second);
        assert_eq!(events[1].id(), first);
        match &events[1] {
            ClientEvent::Done { value, .. } => {
                assert_eq!(value.as_struct().and_then(|m| m.get("from")), Some(&Value::from("first")));
            }
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[test]
    fn test_reused_handle_fails_displaced_request() {
        struct FixedHandle;
        impl Transport for FixedHandle {
            fn send(&self, _post: HttpPost) -> TransferHandle {
                TransferHandle(7)
            }
        }
        let listener = Arc::new(RecordingListener::default());
        let client = Client::new(ClientConfig::default(), Arc::new(FixedHandle), listener.clone());

        let first = client.submit("a", &[]).unwrap();
        let second = client.submit("b", &[]).unwrap();
        client.on_transport_success(TransferHandle(7), &encode_response(&Response::Success(Value::Nil)));

        let events = listener.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ClientEvent::Failed { id, code, .. } if *id == first && *code == faults::TRANSPORT_ERROR));
        assert_eq!(events[1], ClientEvent::Done { id: second, value: Value::Nil });
    }

    #[test]
    fn test_concurrent_notifications_have_one_winner() {
        let h = Arc::new(Harness::new(ClientConfig::default()));
        let mut handles = Vec::new();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            ids.insert(h.client.submit("m", &[]).unwrap());
            handles.push(h.last_handle());
        }
        assert_eq!(ids.len(), 50);

        let body = encode_response(&Response::Success(Value::Boolean(true)));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let h = h.clone();
                let handles = handles.clone();
                let body = body.clone();
                std::thread::spawn(move || {
                    for handle in handles {
                        h.client.on_transport_success(handle, &body);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let events = h.events();
        assert_eq!(events.len(), 50);
        let emitted: HashSet<RequestId> = events.iter().map(ClientEvent::id).collect();
        assert_eq!(emitted, ids);
        assert_eq!(h.client.pending_count(), 0);
    }
}
