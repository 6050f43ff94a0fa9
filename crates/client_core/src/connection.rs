//! Ownership of the single logical channel to the chat server.
//!
//! `connect` and `send` never wait on the network. Opening the channel and
//! moving frames happens on a spawned pump task; inbound events come back
//! through [`ConnectionManager::next_event`] tagged with the generation of the
//! channel that produced them, and anything from an older generation is
//! dropped there.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::{ClientRequest, ConnectAuth, ServerEvent};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// Both ends of an open transport channel, as seen from the client.
pub struct TransportChannel {
    pub outbound: mpsc::UnboundedSender<ClientRequest>,
    pub inbound: mpsc::UnboundedReceiver<ServerEvent>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, auth: &ConnectAuth) -> Result<TransportChannel>;
}

struct ActiveChannel {
    generation: u64,
    outbound: mpsc::UnboundedSender<ClientRequest>,
    pump: JoinHandle<()>,
}

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    generation: u64,
    active: Option<ActiveChannel>,
    events_tx: mpsc::UnboundedSender<(u64, ServerEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, ServerEvent)>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            generation: 0,
            active: None,
            events_tx,
            events_rx,
        }
    }

    /// Number of channels opened so far; identifies the current one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_connected(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.pump.is_finished())
    }

    /// Replaces any existing channel with a new one opened with `auth`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self, auth: ConnectAuth) {
        self.teardown();
        self.generation += 1;
        let generation = self.generation;

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump(
            Arc::clone(&self.transport),
            auth,
            generation,
            outbound_rx,
            self.events_tx.clone(),
        ));
        self.active = Some(ActiveChannel {
            generation,
            outbound,
            pump,
        });
    }

    /// Drops the current channel. Events it already queued are discarded.
    pub fn disconnect(&mut self) {
        if self.teardown() {
            // Advance so anything the old channel queued counts as stale.
            self.generation += 1;
        }
    }

    fn teardown(&mut self) -> bool {
        let Some(previous) = self.active.take() else {
            return false;
        };
        previous.pump.abort();
        info!(
            generation = previous.generation,
            "connection: previous channel torn down"
        );
        true
    }

    /// Queues `request` on the current channel. Delivery is not confirmed.
    pub fn send(&self, request: ClientRequest) {
        let kind = request.kind();
        let Some(active) = &self.active else {
            warn!(kind, "connection: dropping request, no channel");
            return;
        };
        if active.outbound.send(request).is_err() {
            warn!(
                kind,
                generation = active.generation,
                "connection: dropping request, channel closed"
            );
        }
    }

    /// Next event from the current channel, in delivery order.
    ///
    /// Cancel safe. Pending until an event for the current generation arrives.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        while let Some((generation, event)) = self.events_rx.recv().await {
            if generation == self.generation {
                return Some(event);
            }
            debug!(
                generation,
                current = self.generation,
                kind = event.kind(),
                "connection: dropping stale event"
            );
        }
        None
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.pump.abort();
        }
    }
}

async fn pump(
    transport: Arc<dyn Transport>,
    auth: ConnectAuth,
    generation: u64,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientRequest>,
    events_tx: mpsc::UnboundedSender<(u64, ServerEvent)>,
) {
    let TransportChannel {
        outbound,
        mut inbound,
    } = match transport.open(&auth).await {
        Ok(channel) => channel,
        Err(err) => {
            warn!(generation, "connection: failed to open channel: {err:#}");
            return;
        }
    };
    info!(generation, "connection: channel open");

    loop {
        tokio::select! {
            request = outbound_rx.recv() => {
                let Some(request) = request else {
                    break;
                };
                if outbound.send(request).is_err() {
                    warn!(generation, "connection: transport stopped accepting requests");
                    break;
                }
            }
            event = inbound.recv() => {
                let Some(event) = event else {
                    info!(generation, "connection: channel closed by transport");
                    break;
                };
                if events_tx.send((generation, event)).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/connection_tests.rs"]
mod tests;
