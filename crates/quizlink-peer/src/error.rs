/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] quizlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] quizlink_frame::FrameError),

    /// The request is not a sequence headed by a command name.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The command name is not one the display knows.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A command parameter is missing or has the wrong kind.
    #[error("bad parameter for '{command}': {reason}")]
    BadParameter { command: String, reason: String },

    /// JSON serialization/deserialization error in a structured payload.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A structured payload carries a schema version this build cannot read.
    #[error("unsupported payload version {found} (expected {expected})")]
    UnsupportedPayloadVersion { found: u32, expected: u32 },

    /// The response is not a status value.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The client has no open connection.
    #[error("not connected")]
    NotConnected,

    /// The session was closed after a transport failure or shutdown.
    #[error("session closed")]
    SessionClosed,

    /// A request handler failed or panicked.
    #[error("handler failed: {0}")]
    Handler(String),

    /// The rendering frontend failed.
    #[error("frontend failed: {0}")]
    Frontend(String),
}

impl PeerError {
    /// True for failures of the underlying connection, after which it
    /// cannot carry further transactions.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::NotConnected | Self::SessionClosed => true,
            Self::Frame(err) => err.is_transport(),
            _ => false,
        }
    }

    pub(crate) fn bad_parameter(command: &str, reason: impl Into<String>) -> Self {
        Self::BadParameter {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
