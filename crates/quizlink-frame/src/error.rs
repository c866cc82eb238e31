/// Errors that can occur during TLV encoding, decoding and stream framing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Encoded content does not fit the 16-bit length field.
    #[error("content too large ({size} bytes, max {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// A received header declares more content than the reader accepts.
    /// The content is left unread, so the stream is out of step.
    #[error("incoming frame too large ({size} bytes, max {max})")]
    OversizedFrame { size: usize, max: usize },

    /// A buffer ended before the declared header or content length.
    #[error("truncated value (needed {needed} bytes, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// A value's content does not match the format its tag requires.
    #[error("format error in {tag_name} value: {reason}")]
    Format {
        tag: u8,
        tag_name: &'static str,
        reason: String,
    },

    /// Sequences are nested deeper than the decoder accepts.
    #[error("sequence nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },

    /// Bytes remained after the single value that was expected.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    pub(crate) fn format(tag: u8, reason: impl Into<String>) -> Self {
        Self::Format {
            tag,
            tag_name: crate::tag::tag_name(tag),
            reason: reason.into(),
        }
    }

    /// True for failures after which the connection cannot be used for
    /// further transactions: the stream broke or lost frame alignment.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::ConnectionClosed | Self::OversizedFrame { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
