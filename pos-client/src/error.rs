/// Error returned by every network-facing operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The base URL is not `http://` or `https://` (or `ws://`/`wss://` for sockets).
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The admin secret cannot be sent as a header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request did not complete.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{method} {path} returned {status}: {message}")]
    Status { method: String, path: String, status: u16, message: String },

    /// The backend answered 2xx but with `success: false`.
    #[error("{path} was rejected by the backend")]
    Rejected { path: String },

    /// A response body did not match the expected shape.
    #[error("invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The WebSocket transport failed.
    #[error("websocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// The server closed the real-time channel.
    #[error("websocket closed")]
    WsClosed,

    /// The server sent something other than the expected handshake packet.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// No frame arrived in time.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// A real-time frame could not be decoded.
    #[error(transparent)]
    Codec(#[from] realtime::CodecError),

    /// The PromptPay target is not a phone number, tax id, or e-wallet id.
    #[error("invalid PromptPay target: {0}")]
    InvalidPromptPayTarget(String),

    /// The PromptPay amount is negative or not finite.
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(error))
    }
}
