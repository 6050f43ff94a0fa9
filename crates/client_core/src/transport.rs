use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shared::protocol::{ClientRequest, ConnectAuth, ServerEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::{
    connection::{Transport, TransportChannel},
    error::TransportError,
};

/// JSON-over-WebSocket transport. One text frame per protocol event.
pub struct WebSocketTransport {
    server_url: String,
}

impl WebSocketTransport {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }

    /// `<server>/ws` with the credential in the query string.
    pub fn socket_url(&self, auth: &ConnectAuth) -> Result<Url, TransportError> {
        let mut url = Url::parse(self.server_url.trim())?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(TransportError::UnsupportedScheme(self.server_url.clone())),
        };
        url.set_scheme(scheme)
            .map_err(|_| TransportError::UnsupportedScheme(self.server_url.clone()))?;
        let path = format!("{}/ws", url.path().trim_end_matches('/'));
        url.set_path(&path);
        let (key, value) = auth.query_pair();
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, auth: &ConnectAuth) -> Result<TransportChannel> {
        let ws_url = self.socket_url(auth)?;
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("failed to connect websocket: {}", ws_url.path()))?;
        let (mut ws_writer, mut ws_reader) = ws_stream.split();

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientRequest>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel::<ServerEvent>();

        tokio::spawn(async move {
            while let Some(request) = outbound_rx.recv().await {
                let text = match request.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(kind = request.kind(), "websocket: failed to encode request: {err}");
                        continue;
                    }
                };
                if let Err(err) = ws_writer.send(Message::Text(text)).await {
                    warn!("websocket send failed: {err}");
                    break;
                }
            }
            let _ = ws_writer.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = ws_reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => match ServerEvent::decode(&text) {
                        Ok(event) => {
                            if inbound_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!("websocket: invalid server event: {err}"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!("websocket receive failed: {err}");
                        break;
                    }
                }
            }
            debug!("websocket: reader finished");
        });

        Ok(TransportChannel { outbound, inbound })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
