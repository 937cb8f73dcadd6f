//! Discord gateway (WebSocket) client.
//!
//! Keeps a bot session open and forwards the dispatches the bot cares about
//! (ready, messages, reactions) to an mpsc channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::models::{intents, opcodes, ChatEvent, GatewayPayload, Hello};

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Client for the Discord gateway.
pub struct DiscordGateway {
    url: String,
    token: String,
    intents: u64,
    connected: Arc<AtomicBool>,
    event_tx: mpsc::Sender<ChatEvent>,
}

impl DiscordGateway {
    pub fn new(url: String, token: String, event_tx: mpsc::Sender<ChatEvent>) -> Self {
        Self {
            url,
            token,
            intents: intents::BOT,
            connected: Arc::new(AtomicBool::new(false)),
            event_tx,
        }
    }

    /// Check if a gateway session is currently open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Keep a session open until `shutdown` is cancelled or nobody listens anymore.
    ///
    /// A dropped session is re-established after a fixed delay.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                result = self.run_websocket() => {
                    if let Err(e) = result {
                        warn!("Discord gateway session ended: {:#}", e);
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Discord gateway received shutdown signal");
                    break;
                }
            }

            self.connected.store(false, Ordering::SeqCst);

            if self.event_tx.is_closed() {
                info!("No more gateway event listeners, stopping");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        info!("Discord gateway stopped");
    }

    /// Run one gateway session.
    ///
    /// Connects, identifies, heartbeats at the interval announced by the
    /// server and forwards dispatches until the session is closed. Always
    /// returns an error describing why the session ended.
    pub async fn run_websocket(&self) -> Result<()> {
        info!("Connecting to Discord gateway: {}", self.url);

        let (ws_stream, _) = connect_async(&self.url)
            .await
            .map_err(|e| anyhow!("WebSocket connection failed: {}", e))?;

        let (mut write, mut read) = ws_stream.split();

        let hello = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let payload: GatewayPayload =
                        serde_json::from_str(&text).context("Failed to parse gateway frame")?;
                    if payload.op == opcodes::HELLO {
                        break serde_json::from_value::<Hello>(payload.d)
                            .context("Failed to parse gateway hello")?;
                    }
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("WebSocket error before hello: {}", e),
                None => bail!("Gateway closed before hello"),
            }
        };

        send_payload(&mut write, &GatewayPayload::identify(&self.token, self.intents)).await?;
        self.connected.store(true, Ordering::SeqCst);
        info!(
            "Connected to Discord gateway (heartbeat every {} ms)",
            hello.heartbeat_interval
        );

        let mut heartbeat =
            tokio::time::interval(Duration::from_millis(hello.heartbeat_interval.max(1)));
        // The first tick completes immediately.
        heartbeat.tick().await;

        let mut sequence: Option<u64> = None;
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        warn!("Discord gateway missed a heartbeat ack");
                        break;
                    }
                    send_payload(&mut write, &GatewayPayload::heartbeat(sequence)).await?;
                    awaiting_ack = true;
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let payload: GatewayPayload = match serde_json::from_str(&text) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("Failed to parse gateway frame: {}", e);
                                continue;
                            }
                        };

                        match payload.op {
                            opcodes::DISPATCH => {
                                if payload.s.is_some() {
                                    sequence = payload.s;
                                }
                                let Some(event_type) = payload.t else {
                                    continue;
                                };
                                match ChatEvent::from_dispatch(&event_type, payload.d) {
                                    Ok(Some(event)) => {
                                        debug!("Received gateway dispatch {}", event_type);
                                        if self.event_tx.send(event).await.is_err() {
                                            bail!("Gateway event receiver dropped");
                                        }
                                    }
                                    Ok(None) => {}
                                    Err(e) => warn!("Failed to decode {} dispatch: {}", event_type, e),
                                }
                            }
                            opcodes::HEARTBEAT => {
                                send_payload(&mut write, &GatewayPayload::heartbeat(sequence)).await?;
                            }
                            opcodes::HEARTBEAT_ACK => awaiting_ack = false,
                            opcodes::RECONNECT => {
                                info!("Discord gateway asked for a reconnect");
                                break;
                            }
                            opcodes::INVALID_SESSION => {
                                warn!("Discord gateway invalidated the session");
                                break;
                            }
                            other => debug!("Ignoring gateway opcode {}", other),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            error!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("Discord gateway closed by server: {:?}", frame);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        Err(anyhow!("Discord gateway connection closed"))
    }
}

async fn send_payload<S>(write: &mut S, payload: &GatewayPayload) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let text = serde_json::to_string(payload).context("Failed to encode gateway frame")?;
    write
        .send(Message::Text(text.into()))
        .await
        .context("Failed to send gateway frame")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_creation() {
        let (tx, _rx) = mpsc::channel(8);
        let gateway = DiscordGateway::new(
            DEFAULT_GATEWAY_URL.to_string(),
            "token".to_string(),
            tx,
        );
        assert!(!gateway.is_connected());
        assert_eq!(gateway.intents, intents::BOT);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (tx, _rx) = mpsc::channel(8);
        let gateway = DiscordGateway::new("ws://127.0.0.1:1".to_string(), "token".to_string(), tx);

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), gateway.run(shutdown))
            .await
            .unwrap();
        assert!(!gateway.is_connected());
    }
}
