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

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::Client;
use crate::transport::TransportEvent;

/// Spawns the task that feeds transport notifications into `client`.
///
/// The task holds only a weak reference, so dropping the last `Arc<Client>`
/// drops the transport and its notifier, which closes the channel and ends
/// the task.
pub fn spawn_dispatcher(
    client: &Arc<Client>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) -> JoinHandle<()> {
    let client: Weak<Client> = Arc::downgrade(client);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(client) = client.upgrade() else {
                debug!(handle = %event.handle(), "Client dropped; discarding transport event");
                break;
            };
            client.dispatch(event);
        }
        debug!("Transport event channel closed, dispatcher exiting");
    })
}
