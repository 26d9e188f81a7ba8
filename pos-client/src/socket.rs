//! Real-time connection to the backend's Socket.IO server.
//!
//! [`RealtimeClient::connect`] opens a WebSocket, completes the Engine.IO and
//! Socket.IO handshakes, then hands the stream to a background task. That task
//! answers heartbeats and forwards every decoded [`ServerEvent`] over a
//! channel. The client is a plain value; callers own it and pass it where it
//! is needed.
//!
//! The event channel is bounded. While it is full the reader task waits for
//! room, so heartbeats go unanswered until the consumer catches up, but a
//! [`RealtimeClient::disconnect`] still ends the task.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use realtime::packet::DEFAULT_NAMESPACE;
use realtime::{EnginePacket, Handshake, ServerEvent, SocketPacket, SocketPacketKind};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::ClientConfig;
use crate::error::ClientError;

pub const SOCKET_IO_PATH: &str = "/socket.io/";
const EVENT_BUFFER: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of a [`RealtimeClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Build the WebSocket endpoint for a server origin.
///
/// `http`/`https` origins map to `ws`/`wss`; `ws`/`wss` pass through.
///
/// # Errors
///
/// Returns [`ClientError::InvalidBaseUrl`] for any other scheme.
pub fn socket_url(origin: &str) -> Result<String, ClientError> {
    let origin = origin.trim_end_matches('/');
    let ws_origin = if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if origin.starts_with("ws://") || origin.starts_with("wss://") {
        origin.to_owned()
    } else {
        return Err(ClientError::InvalidBaseUrl(origin.to_owned()));
    };
    Ok(format!(
        "{ws_origin}{SOCKET_IO_PATH}?EIO={}&transport=websocket",
        realtime::packet::ENGINE_IO_VERSION
    ))
}

/// A live Socket.IO session on the default namespace.
pub struct RealtimeClient {
    sid: String,
    events: mpsc::Receiver<ServerEvent>,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RealtimeClient {
    /// Connect to the configured socket origin, bounding every handshake
    /// step by `timeouts.connect_secs`.
    ///
    /// # Errors
    ///
    /// See [`RealtimeClient::connect_to`].
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::connect_to(config.socket_origin(), Duration::from_secs(config.timeouts.connect_secs)).await
    }

    /// Connect to `origin` and join the default namespace. The WebSocket
    /// upgrade and each handshake packet must arrive within `step_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WebSocket`] if the socket cannot be opened,
    /// [`ClientError::Timeout`] if the upgrade or a handshake step stalls, and
    /// [`ClientError::Handshake`] if the server refuses the namespace.
    pub async fn connect_to(origin: &str, step_timeout: Duration) -> Result<Self, ClientError> {
        let url = socket_url(origin)?;
        tracing::debug!(%url, timeout_ms = step_timeout.as_millis(), "connecting realtime socket");
        let (mut stream, _) = tokio::time::timeout(step_timeout, connect_async(url))
            .await
            .map_err(|_| ClientError::Timeout("websocket upgrade"))??;

        let handshake = tokio::time::timeout(step_timeout, read_open(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout("engine.io open"))??;
        send_packet(&mut stream, &EnginePacket::message(&SocketPacket::connect(DEFAULT_NAMESPACE))).await?;
        tokio::time::timeout(step_timeout, read_connect(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout("socket.io connect"))??;

        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (status_tx, status) = watch::channel(ConnectionStatus::Connected);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let sid = handshake.sid.clone();
        tracing::info!(sid = %sid, ping_interval_ms = handshake.ping_interval, "realtime connected");

        let task = tokio::spawn(run(stream, handshake, event_tx, status_tx, shutdown_rx));
        Ok(Self { sid, events, status, shutdown, task })
    }

    /// Engine.IO session id assigned by the server.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Wait for the next server event. Returns `None` once the connection
    /// has ended and every buffered event has been read.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// A receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Leave the namespace, close the socket, and wait for the reader task.
    pub async fn disconnect(self) {
        let Self { sid, events, shutdown, task, .. } = self;
        // The task may be parked on a full channel; closing it lets the send fail.
        drop(events);
        if shutdown.send(()).is_err() {
            tracing::debug!(%sid, "realtime task already stopped");
        }
        if let Err(error) = task.await {
            tracing::warn!(%error, "realtime task ended abnormally");
        }
    }
}

async fn send_packet(stream: &mut WsStream, packet: &EnginePacket) -> Result<(), ClientError> {
    stream.send(Message::Text(packet.encode().into())).await?;
    Ok(())
}

/// Next text frame, decoded. Binary and control frames are skipped.
async fn next_packet(stream: &mut WsStream) -> Result<EnginePacket, ClientError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(ClientError::WsClosed);
        };
        match message? {
            Message::Text(text) => return Ok(EnginePacket::decode(text.as_str())?),
            Message::Close(_) => return Err(ClientError::WsClosed),
            _ => {}
        }
    }
}

async fn read_open(stream: &mut WsStream) -> Result<Handshake, ClientError> {
    match next_packet(stream).await? {
        EnginePacket::Open(handshake) => Ok(handshake),
        other => Err(ClientError::Handshake(format!("expected open packet, got {}", other.encode()))),
    }
}

async fn read_connect(stream: &mut WsStream) -> Result<(), ClientError> {
    loop {
        match next_packet(stream).await? {
            EnginePacket::Ping(probe) => send_packet(stream, &EnginePacket::Pong(probe)).await?,
            EnginePacket::Message(body) => {
                let packet = SocketPacket::decode(&body)?;
                match packet.kind {
                    SocketPacketKind::Connect => return Ok(()),
                    SocketPacketKind::ConnectError => {
                        let reason = packet
                            .data
                            .as_ref()
                            .and_then(|d| d.get("message"))
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or("connection refused");
                        return Err(ClientError::Handshake(reason.to_owned()));
                    }
                    _ => {}
                }
            }
            EnginePacket::Close => return Err(ClientError::WsClosed),
            _ => {}
        }
    }
}

enum Flow {
    Continue,
    Forward(ServerEvent),
    Stop(&'static str),
}

async fn run(
    mut stream: WsStream,
    handshake: Handshake,
    events: mpsc::Sender<ServerEvent>,
    status: watch::Sender<ConnectionStatus>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // The server pings every interval; silence past interval + timeout means the session is gone.
    let liveness = Duration::from_millis(handshake.ping_interval.saturating_add(handshake.ping_timeout));

    let reason = loop {
        tokio::select! {
            _ = &mut shutdown => {
                close(&mut stream).await;
                break "client disconnect";
            }
            next = tokio::time::timeout(liveness, stream.next()) => {
                let flow = match next {
                    Err(_) => Flow::Stop("ping timeout"),
                    Ok(None) => Flow::Stop("stream ended"),
                    Ok(Some(Err(error))) => {
                        tracing::warn!(%error, "realtime transport error");
                        Flow::Stop("transport error")
                    }
                    Ok(Some(Ok(Message::Text(text)))) => on_frame(&mut stream, text.as_str()).await,
                    Ok(Some(Ok(Message::Close(_)))) => Flow::Stop("server closed socket"),
                    Ok(Some(Ok(_))) => Flow::Continue,
                };
                match flow {
                    Flow::Continue => {}
                    Flow::Stop(reason) => break reason,
                    Flow::Forward(event) => {
                        tokio::select! {
                            sent = events.send(event) => {
                                if sent.is_err() {
                                    close(&mut stream).await;
                                    break "event receiver dropped";
                                }
                            }
                            _ = &mut shutdown => {
                                close(&mut stream).await;
                                break "client disconnect";
                            }
                        }
                    }
                }
            }
        }
    };

    status.send_replace(ConnectionStatus::Disconnected);
    tracing::info!(sid = %handshake.sid, reason, "realtime disconnected");
}

async fn on_frame(stream: &mut WsStream, text: &str) -> Flow {
    let packet = match EnginePacket::decode(text) {
        Ok(packet) => packet,
        Err(error) => {
            tracing::warn!(%error, frame = text, "undecodable engine.io frame");
            return Flow::Continue;
        }
    };
    match packet {
        EnginePacket::Ping(probe) => {
            if let Err(error) = send_packet(stream, &EnginePacket::Pong(probe)).await {
                tracing::warn!(%error, "pong failed");
                return Flow::Stop("pong failed");
            }
            Flow::Continue
        }
        EnginePacket::Close => Flow::Stop("server closed session"),
        EnginePacket::Message(body) => on_message(&body),
        _ => Flow::Continue,
    }
}

fn on_message(body: &str) -> Flow {
    let packet = match SocketPacket::decode(body) {
        Ok(packet) => packet,
        Err(error) => {
            tracing::warn!(%error, "undecodable socket.io packet");
            return Flow::Continue;
        }
    };
    if packet.kind == SocketPacketKind::Disconnect {
        return Flow::Stop("server disconnected namespace");
    }
    match ServerEvent::from_packet(&packet) {
        Ok(Some(event)) => {
            tracing::debug!(event = event.name(), "realtime event");
            Flow::Forward(event)
        }
        Ok(None) => Flow::Continue,
        Err(error) => {
            tracing::warn!(%error, "dropping malformed realtime event");
            Flow::Continue
        }
    }
}

async fn close(stream: &mut WsStream) {
    let leave = EnginePacket::message(&SocketPacket::disconnect(DEFAULT_NAMESPACE));
    if let Err(error) = send_packet(stream, &leave).await {
        tracing::debug!(%error, "socket.io disconnect not sent");
    }
    if let Err(error) = stream.close(None).await {
        tracing::debug!(%error, "websocket close failed");
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;
