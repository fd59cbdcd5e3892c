//! Dialog participant value object and its structured sub-document codec
//!
//! A monitoring event may embed a snapshot of one dialog participant. The
//! participant is carried on the wire as a small XML fragment nested in the
//! last frame field; the [`xml`] module maps between the value object and
//! that fragment.

pub mod xml;

use serde::{Deserialize, Serialize};

/// One party of a signalling dialog as seen by the monitoring layer
///
/// All fields are optional at the protocol level. A `cseq` of zero means
/// the counter is unset and is omitted from the encoded fragment; a display
/// name is only meaningful (and only emitted) alongside an identity URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogParticipant {
    /// Human-readable display name, only emitted together with `identity`
    pub display_name: Option<String>,

    /// Identity URI of the participant
    pub identity: Option<String>,

    /// Target URI the participant is reachable at
    pub target: Option<String>,

    /// Monotonically non-negative sequence counter; zero means unset
    pub cseq: u32,

    /// Raw session description payload (opaque multi-line text)
    pub sdp: Option<String>,
}

impl DialogParticipant {
    /// Create an empty participant
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity URI with an optional display name
    pub fn with_identity(
        mut self,
        uri: impl Into<String>,
        display_name: Option<&str>,
    ) -> Self {
        self.identity = Some(uri.into());
        self.display_name = display_name.map(|name| name.to_string());
        self
    }

    /// Set the target URI
    pub fn with_target(mut self, uri: impl Into<String>) -> Self {
        self.target = Some(uri.into());
        self
    }

    /// Set the sequence counter
    pub fn with_cseq(mut self, cseq: u32) -> Self {
        self.cseq = cseq;
        self
    }

    /// Set the session description payload
    pub fn with_sdp(mut self, sdp: impl Into<String>) -> Self {
        self.sdp = Some(sdp.into());
        self
    }
}
