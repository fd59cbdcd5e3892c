//! Error handling for the monitoring wire protocol
//!
//! All decode failures are local to a single frame: a consumer that hits a
//! recoverable error logs it, discards the offending frame and keeps
//! processing the stream. Only `FrameTooLarge` is fatal to a stream, since
//! it means the peer stopped terminating frames and the accumulation buffer
//! would otherwise grow without bound.

use thiserror::Error;

/// Result type alias for wire protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for encoding, decoding and framing of monitoring events
#[derive(Error, Debug)]
pub enum Error {
    /// The frame cannot be decoded: too few fields, a field failed to
    /// parse, or the embedded dialog fragment is mandatory-but-broken
    #[error("Malformed frame: {details}")]
    MalformedFrame { details: String },

    /// The leading discriminator token does not name a known event kind
    #[error("Unknown event kind: discriminator {discriminator:?}")]
    UnknownEventKind { discriminator: String },

    /// The embedded dialog fragment is not a well-formed XML document
    #[error("Malformed dialog XML: {details}")]
    MalformedDialogXml { details: String },

    /// The accumulation buffer exceeded the configured cap without a
    /// frame terminator arriving
    #[error("Frame too large: {size} bytes buffered without terminator (max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

impl Error {
    /// Create a new malformed frame error
    pub fn malformed_frame(details: impl Into<String>) -> Self {
        Self::MalformedFrame {
            details: details.into(),
        }
    }

    /// Create a new unknown event kind error
    pub fn unknown_event_kind(discriminator: impl Into<String>) -> Self {
        Self::UnknownEventKind {
            discriminator: discriminator.into(),
        }
    }

    /// Create a new malformed dialog XML error
    pub fn malformed_dialog_xml(details: impl Into<String>) -> Self {
        Self::MalformedDialogXml {
            details: details.into(),
        }
    }

    /// Create a new frame too large error
    pub fn frame_too_large(size: usize, max: usize) -> Self {
        Self::FrameTooLarge { size, max }
    }

    /// Check if this error is recoverable by discarding one frame and
    /// continuing with the rest of the stream
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MalformedFrame { .. }
            | Self::UnknownEventKind { .. }
            | Self::MalformedDialogXml { .. } => true,

            // Without a terminator there is no frame boundary to resume from
            Self::FrameTooLarge { .. } => false,
        }
    }
}

/// Convert from XML errors raised while writing or reading a dialog fragment
impl From<quick_xml::Error> for Error {
    fn from(error: quick_xml::Error) -> Self {
        Self::MalformedDialogXml {
            details: error.to_string(),
        }
    }
}
