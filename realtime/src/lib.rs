//! Wire model for the POS backend's real-time channel.
//!
//! The backend pushes notifications over Socket.IO (protocol v5) carried by
//! Engine.IO (protocol v4) on a WebSocket. This crate owns the text framing
//! for both layers and the typed catalogue of server events. It does no I/O;
//! the connection itself lives in `pos-client`.
//!
//! | Module | Responsibility |
//! |--------|---------------|
//! | [`packet`] | Engine.IO and Socket.IO packet encode/decode |
//! | [`event`] | Typed server events and their JSON payloads |

pub mod event;
pub mod packet;

pub use event::ServerEvent;
pub use packet::{EnginePacket, Handshake, SocketPacket, SocketPacketKind};

/// Error returned when a frame or event payload cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A text frame with no packet type.
    #[error("empty packet")]
    Empty,
    /// The leading Engine.IO type digit is not one we know.
    #[error("unknown engine.io packet type: {0:?}")]
    UnknownEnginePacket(char),
    /// The leading Socket.IO type digit is not one we know.
    #[error("unknown socket.io packet type: {0:?}")]
    UnknownSocketPacket(char),
    /// Binary events and acks need attachment frames, which this client does not speak.
    #[error("binary socket.io packets are not supported")]
    BinaryUnsupported,
    /// The ack id did not fit in a `u64`.
    #[error("invalid ack id: {0}")]
    InvalidAckId(String),
    /// The JSON part of a packet did not parse.
    #[error("invalid packet json: {0}")]
    Json(#[from] serde_json::Error),
    /// An event packet whose data is not `[name, ...args]`.
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    /// A known event whose payload has the wrong shape.
    #[error("invalid payload for {event}: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}
