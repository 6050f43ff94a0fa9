//! In-process transport used by the controller and connection tests.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::protocol::{ClientRequest, ConnectAuth, ServerEvent};
use tokio::sync::{mpsc, Mutex};

use crate::{
    connection::{Transport, TransportChannel},
    Navigator,
};

pub const WAIT: Duration = Duration::from_secs(2);

/// Server side of one opened channel.
pub struct ServerEnd {
    pub auth: ConnectAuth,
    pub events: mpsc::UnboundedSender<ServerEvent>,
    pub requests: mpsc::UnboundedReceiver<ClientRequest>,
}

impl ServerEnd {
    pub fn push(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }

    pub async fn next_request(&mut self) -> ClientRequest {
        tokio::time::timeout(WAIT, self.requests.recv())
            .await
            .expect("request timeout")
            .expect("request channel open")
    }
}

pub struct TestTransport {
    opened_tx: mpsc::UnboundedSender<ServerEnd>,
    fail_with: Option<String>,
}

pub struct Opened {
    rx: Mutex<mpsc::UnboundedReceiver<ServerEnd>>,
}

impl Opened {
    pub async fn next(&self) -> ServerEnd {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("open timeout")
            .expect("transport alive")
    }

    pub async fn none_pending(&self) -> bool {
        self.rx.lock().await.try_recv().is_err()
    }
}

impl TestTransport {
    pub fn new() -> (Arc<Self>, Opened) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                opened_tx,
                fail_with: None,
            }),
            Opened {
                rx: Mutex::new(opened_rx),
            },
        )
    }

    pub fn failing(err: impl Into<String>) -> Arc<Self> {
        let (opened_tx, _) = mpsc::unbounded_channel();
        Arc::new(Self {
            opened_tx,
            fail_with: Some(err.into()),
        })
    }
}

#[async_trait]
impl Transport for TestTransport {
    async fn open(&self, auth: &ConnectAuth) -> Result<TransportChannel> {
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        let (outbound, requests) = mpsc::unbounded_channel();
        let (events, inbound) = mpsc::unbounded_channel();
        let _ = self.opened_tx.send(ServerEnd {
            auth: auth.clone(),
            events,
            requests,
        });
        Ok(TransportChannel { outbound, inbound })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: std::sync::Mutex<u32>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> u32 {
        *self.visits.lock().expect("navigator lock")
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_chat(&self) {
        *self.visits.lock().expect("navigator lock") += 1;
    }
}
