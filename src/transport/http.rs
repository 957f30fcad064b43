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

//! HTTP transport backed by `reqwest`.
//!
//! Each `send` spawns one task on the tokio runtime that was current when the
//! transport was built. The task performs the POST, reads the full body and
//! reports the outcome through the notifier. Connection pooling, TLS, proxy
//! handling and redirects are left to `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::constants::{http, limits};
use crate::errors::ClientError;
use crate::transport::{HttpPost, TransferHandle, Transport, TransportNotifier};

pub struct HttpTransport {
    http_client: reqwest::Client,
    notifier: TransportNotifier,
    runtime: Handle,
    next_handle: AtomicU64,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Builds the transport from the proxy and timeout settings of `config`.
    ///
    /// Must be called from within a tokio runtime. A `timeout_secs` of zero
    /// disables the request timeout.
    pub fn new(config: &ClientConfig, notifier: TransportNotifier) -> Result<Self, ClientError> {
        let runtime = Handle::try_current().map_err(|e| {
            ClientError::Configuration(format!("HTTP transport requires a tokio runtime: {}", e))
        })?;

        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));

        let mut builder = reqwest::Client::builder()
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url).map_err(|e| {
                ClientError::Configuration(format!("Invalid proxy URL {:?}: {}", proxy_config.url, e))
            })?;
            if let Some(creds) = &proxy_config.credentials {
                proxy = proxy.basic_auth(&creds.username, &creds.password);
            }
            builder = builder.proxy(proxy);
        }

        let http_client = builder.build().map_err(|e| {
            ClientError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            notifier,
            runtime,
            next_handle: AtomicU64::new(1),
            timeout,
        })
    }
}

async fn execute(client: &reqwest::Client, post: HttpPost) -> Result<Bytes, PerformError> {
    let mut request = client.post(&post.url);
    // reqwest derives Content-Length from the body it sends.
    for (name, value) in post
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(http::CONTENT_LENGTH))
    {
        request = request.header(name.as_str(), value.as_str());
    }

    let mut response = request.body(post.body).send().await.map_err(PerformError::Http)?;

    let status = response.status();
    if !status.is_success() {
        return Err(PerformError::Rejected(format!("HTTP {}", status)));
    }

    let limit = limits::MAX_RESPONSE_SIZE_BYTES;
    if let Some(len) = response.content_length() {
        if len > limit {
            return Err(PerformError::Rejected(format!(
                "Response of {} bytes exceeds limit of {} bytes",
                len, limit
            )));
        }
    }

    // Chunked bodies carry no length up front; stop reading once over the limit.
    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await.map_err(PerformError::Http)? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(PerformError::Rejected(format!(
                "Response exceeds limit of {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

enum PerformError {
    Http(reqwest::Error),
    Rejected(String),
}

impl Transport for HttpTransport {
    fn send(&self, post: HttpPost) -> TransferHandle {
        let handle = TransferHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        debug!(handle = %handle, url = %post.url, bytes = post.body.len(), "Sending XML-RPC POST");

        let http_client = self.http_client.clone();
        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        self.runtime.spawn(async move {
            let outcome = execute(&http_client, post).await.map_err(|e| match e {
                PerformError::Http(e) => describe(&e, timeout),
                PerformError::Rejected(msg) => msg,
            });
            match outcome {
                Ok(body) => {
                    debug!(handle = %handle, bytes = body.len(), "Transfer completed");
                    notifier.completed(handle, body);
                }
                Err(error) => {
                    warn!(handle = %handle, error = %error, "Transfer failed");
                    notifier.failed(handle, error);
                }
            }
        });

        handle
    }
}

fn describe(error: &reqwest::Error, timeout: Option<Duration>) -> String {
    if error.is_timeout() {
        match timeout {
            Some(t) => format!("Request timeout after {}s", t.as_secs()),
            None => "Request timeout".to_string(),
        }
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        format!("HTTP request failed: {}", error)
    }
}
