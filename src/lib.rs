//! Monitoring event wire protocol for the sigmon signalling platform
//!
//! This crate implements the line protocol used to stream internal
//! monitoring/diagnostic events from a server process to monitoring
//! clients: encoding a typed event into exactly one `|`-delimited,
//! CRLF-terminated text frame, splitting a continuous byte stream back into
//! frames, decoding frames into typed events by their leading discriminator,
//! embedding a dialog participant as an XML sub-document in the last frame
//! field, and producing a privacy-preserving anonymized variant of an event
//! for restricted audiences.
//!
//! The crate is pure and synchronous: it performs no I/O and owns no
//! sockets. The transport connection belongs to the caller, which feeds
//! received bytes into an [`EventReader`] (or a bare [`StreamFramer`]) and
//! writes encoded frames out itself.
//!
//! # Example
//!
//! ```
//! use sigmon_wire::prelude::*;
//! use chrono::{FixedOffset, TimeZone};
//!
//! let timestamp = FixedOffset::east_opt(0).unwrap()
//!     .with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
//! let event = MachineEvent::new(MachineEventType::CallEstablished, timestamp)
//!     .with_username("alice")
//!     .with_remote("192.168.1.55:5060".parse().unwrap())
//!     .with_message("call-established");
//!
//! let frame = sigmon_wire::frame::encode(&event.clone().into(), false).unwrap();
//!
//! let mut reader = EventReader::new();
//! reader.feed(frame.as_bytes());
//! let decoded = reader.next_event().unwrap().unwrap();
//! assert_eq!(decoded, MonitorEvent::Machine(event));
//! ```

pub mod anonymize;
pub mod dialog;
pub mod error;
pub mod event;
pub mod frame;
pub mod framer;

// Re-export commonly used types and functions
pub use anonymize::{anonymize_addr, anonymize_endpoint};
pub use dialog::DialogParticipant;
pub use error::{Error, Result};
pub use event::{DialogRole, DialogSnapshot, MachineEvent, MachineEventType, MonitorEvent};
pub use frame::{decode, encode};
pub use framer::{ErrorSink, EventReader, StreamFramer, TracingSink};

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{
        anonymize_addr, anonymize_endpoint, decode, encode, DialogParticipant, DialogRole,
        DialogSnapshot, Error, ErrorSink, EventReader, MachineEvent, MachineEventType,
        MonitorEvent, Result, StreamFramer, TracingSink,
    };
    pub use crate::dialog::xml::{from_fragment, to_fragment, SDP_FILTER};
}
