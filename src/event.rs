//! Event value objects carried by the monitoring wire protocol
//!
//! Events form a closed family of kinds, each with a fixed single-character
//! wire discriminator. This slice of the platform documents the machine
//! event kind: server-side conditions such as a call being established or a
//! registration changing, optionally carrying a snapshot of one dialog
//! participant.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::dialog::DialogParticipant;

/// Fixed table of machine event types and their integer wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineEventType {
    /// Server process started
    ServerStartup,
    /// Server process shutting down
    ServerShutdown,
    /// Outbound or inbound call setup begun
    CallSetup,
    /// Call answered and media established
    CallEstablished,
    /// Call torn down
    CallCleared,
    /// Endpoint registration created, refreshed or expired
    RegistrationChange,
    /// Miscellaneous server status change
    StatusChange,
}

impl MachineEventType {
    /// Integer code used on the wire
    pub fn code(&self) -> u8 {
        match self {
            Self::ServerStartup => 0,
            Self::ServerShutdown => 1,
            Self::CallSetup => 2,
            Self::CallEstablished => 3,
            Self::CallCleared => 4,
            Self::RegistrationChange => 5,
            Self::StatusChange => 6,
        }
    }

    /// Look up an event type by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::ServerStartup),
            1 => Some(Self::ServerShutdown),
            2 => Some(Self::CallSetup),
            3 => Some(Self::CallEstablished),
            4 => Some(Self::CallCleared),
            5 => Some(Self::RegistrationChange),
            6 => Some(Self::StatusChange),
            _ => None,
        }
    }
}

impl fmt::Display for MachineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServerStartup => "server-startup",
            Self::ServerShutdown => "server-shutdown",
            Self::CallSetup => "call-setup",
            Self::CallEstablished => "call-established",
            Self::CallCleared => "call-cleared",
            Self::RegistrationChange => "registration-change",
            Self::StatusChange => "status-change",
        };
        write!(f, "{}", name)
    }
}

/// Role label under which a participant is embedded in an event
///
/// The label becomes the XML element name of the embedded fragment. `local`
/// and `remote` are the conventional labels; anything else is carried
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogRole {
    /// The server-local party of the dialog
    Local,
    /// The remote party of the dialog
    Remote,
    /// Any other caller-chosen label
    Other(String),
}

impl DialogRole {
    /// The XML element name for this role
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for DialogRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for DialogRole {
    fn from(name: &str) -> Self {
        match name {
            "local" => Self::Local,
            "remote" => Self::Remote,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A dialog participant snapshot embedded in an event, together with the
/// role label it is (or will be) serialized under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSnapshot {
    /// Element name of the embedded fragment
    pub role: DialogRole,
    /// The participant state
    pub participant: DialogParticipant,
}

/// A machine event: a server-side condition fired at a point in time
///
/// Absence is modelled with `Option` throughout; the wire's empty-string
/// convention is confined to the frame codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    /// What happened
    pub event_type: MachineEventType,
    /// When it happened, with the originating offset
    pub timestamp: DateTime<FixedOffset>,
    /// Username the condition is attributed to
    pub username: Option<String>,
    /// Remote network endpoint involved, if any
    pub remote: Option<SocketAddr>,
    /// Free-text description; must not contain the frame terminator
    pub message: Option<String>,
    /// Embedded dialog participant snapshot
    pub dialog: Option<DialogSnapshot>,
}

impl MachineEvent {
    /// Wire discriminator of the machine event kind, written first in
    /// every frame of this kind
    pub const DISCRIMINATOR: &'static str = "2";

    /// Create a machine event with all optional fields absent
    pub fn new(event_type: MachineEventType, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            event_type,
            timestamp,
            username: None,
            remote: None,
            message: None,
            dialog: None,
        }
    }

    /// Set the originating username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the remote endpoint
    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Set the free-text message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Embed a dialog participant snapshot under the given role label
    pub fn with_dialog(mut self, role: DialogRole, participant: DialogParticipant) -> Self {
        self.dialog = Some(DialogSnapshot { role, participant });
        self
    }
}

/// Closed union over the event kinds of the monitoring protocol
///
/// Frame decoding dispatches on the leading discriminator token to select
/// the matching variant decoder; unknown discriminators are rejected with
/// [`Error::UnknownEventKind`](crate::Error::UnknownEventKind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonitorEvent {
    /// A machine event (discriminator `2`)
    Machine(MachineEvent),
}

impl MonitorEvent {
    /// Wire discriminator of this event's kind
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Machine(_) => MachineEvent::DISCRIMINATOR,
        }
    }
}

impl From<MachineEvent> for MonitorEvent {
    fn from(event: MachineEvent) -> Self {
        Self::Machine(event)
    }
}
