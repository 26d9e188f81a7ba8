//! Engine.IO v4 and Socket.IO v5 text packets.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by an optional payload. Socket.IO packets ride inside Engine.IO
//! `message` packets and add a namespace, an optional ack id, and a JSON body:
//!
//! ```text
//! 42["table-update",{"id":null,"status":"refresh"}]
//! ^^ engine.io message + socket.io event, default namespace, no ack
//! ```

#[cfg(test)]
#[path = "packet_test.rs"]
mod packet_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CodecError;

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_IO_VERSION: u8 = 4;

/// Namespace used when a packet names none.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Session parameters sent by the server in the `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong before dropping the session.
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    /// Heartbeat from the server. Must be answered with a `Pong`.
    Ping(Option<String>),
    Pong(Option<String>),
    /// Carries one encoded Socket.IO packet.
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    /// Wrap a Socket.IO packet for sending.
    #[must_use]
    pub fn message(packet: &SocketPacket) -> Self {
        Self::Message(packet.encode())
    }

    /// Encode to a WebSocket text frame.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(h) => {
                let mut body = serde_json::json!({
                    "sid": h.sid,
                    "upgrades": h.upgrades,
                    "pingInterval": h.ping_interval,
                    "pingTimeout": h.ping_timeout,
                });
                if let Some(max) = h.max_payload {
                    body["maxPayload"] = Value::from(max);
                }
                format!("0{body}")
            }
            Self::Close => "1".to_owned(),
            Self::Ping(probe) => format!("2{}", probe.as_deref().unwrap_or_default()),
            Self::Pong(probe) => format!("3{}", probe.as_deref().unwrap_or_default()),
            Self::Message(body) => format!("4{body}"),
            Self::Upgrade => "5".to_owned(),
            Self::Noop => "6".to_owned(),
        }
    }

    /// Decode a WebSocket text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Empty`] for an empty frame,
    /// [`CodecError::UnknownEnginePacket`] for an unrecognized type digit, and
    /// [`CodecError::Json`] for a malformed `open` handshake.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(CodecError::Empty)?;
        let body = chars.as_str();
        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(body)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(non_empty(body))),
            '3' => Ok(Self::Pong(non_empty(body))),
            '4' => Ok(Self::Message(body.to_owned())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(CodecError::UnknownEnginePacket(other)),
        }
    }
}

/// Socket.IO packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
}

impl SocketPacketKind {
    fn as_char(self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
        }
    }

    fn from_char(c: char) -> Result<Self, CodecError> {
        match c {
            '0' => Ok(Self::Connect),
            '1' => Ok(Self::Disconnect),
            '2' => Ok(Self::Event),
            '3' => Ok(Self::Ack),
            '4' => Ok(Self::ConnectError),
            '5' | '6' => Err(CodecError::BinaryUnsupported),
            other => Err(CodecError::UnknownSocketPacket(other)),
        }
    }
}

/// One Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    /// Join `namespace`.
    #[must_use]
    pub fn connect(namespace: &str) -> Self {
        Self { kind: SocketPacketKind::Connect, namespace: namespace.to_owned(), ack_id: None, data: None }
    }

    /// Leave `namespace`.
    #[must_use]
    pub fn disconnect(namespace: &str) -> Self {
        Self { kind: SocketPacketKind::Disconnect, namespace: namespace.to_owned(), ack_id: None, data: None }
    }

    /// An event on the default namespace: `[name, ...args]`.
    #[must_use]
    pub fn event(name: &str, args: Vec<Value>) -> Self {
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(Value::from(name));
        items.extend(args);
        Self {
            kind: SocketPacketKind::Event,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            ack_id: None,
            data: Some(Value::Array(items)),
        }
    }

    /// Encode to the body of an Engine.IO `message`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.as_char());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Decode the body of an Engine.IO `message`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Empty`] for an empty body,
    /// [`CodecError::UnknownSocketPacket`] or [`CodecError::BinaryUnsupported`]
    /// for a type we cannot handle, [`CodecError::InvalidAckId`] for an
    /// overflowing ack id, and [`CodecError::Json`] for a malformed body.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let mut chars = text.chars();
        let kind = SocketPacketKind::from_char(chars.next().ok_or(CodecError::Empty)?)?;
        let mut rest = chars.as_str();

        let mut namespace = DEFAULT_NAMESPACE.to_owned();
        if rest.starts_with('/') {
            let (ns, tail) = rest.split_once(',').unwrap_or((rest, ""));
            ns.clone_into(&mut namespace);
            rest = tail;
        }

        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let ack_id = if digits == 0 {
            None
        } else {
            let raw = &rest[..digits];
            Some(raw.parse::<u64>().map_err(|_| CodecError::InvalidAckId(raw.to_owned()))?)
        };

        let body = &rest[digits..];
        let data = if body.is_empty() { None } else { Some(serde_json::from_str(body)?) };

        Ok(Self { kind, namespace, ack_id, data })
    }

    /// Split an event's data into its name and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedEvent`] if the data is not a non-empty
    /// array headed by a string.
    pub fn event_parts(&self) -> Result<(&str, &[Value]), CodecError> {
        let Some(Value::Array(items)) = &self.data else {
            return Err(CodecError::MalformedEvent("event data is not an array".to_owned()));
        };
        let Some((head, args)) = items.split_first() else {
            return Err(CodecError::MalformedEvent("event array is empty".to_owned()));
        };
        let Some(name) = head.as_str() else {
            return Err(CodecError::MalformedEvent(format!("event name is not a string: {head}")));
        };
        Ok((name, args))
    }
}

fn non_empty(body: &str) -> Option<String> {
    (!body.is_empty()).then(|| body.to_owned())
}
