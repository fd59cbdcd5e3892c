//! Frame codec for the monitoring event line protocol
//!
//! One event is serialized to exactly one delimited text frame:
//!
//! ```text
//! <discriminator>|<eventTypeCode>|<timestamp>|<username>|<address:port>|<message>|<dialogFragmentOrEmpty><CRLF>
//! ```
//!
//! Fields are joined with `|` and the frame is terminated by CRLF. No field
//! may contain the terminator sequence; this is a documented constraint on
//! the free-text message (and on SDP text, which therefore travels with
//! bare LFs on the wire), not something the codec escapes. The dialog
//! fragment is placed last and consumes the remainder of the frame, so it
//! may contain `|` without ambiguity. Its presence is marked by a `#`
//! wrapper; a blank last field means no embedded dialog.
//!
//! The anonymized variant of a frame blanks the username and message,
//! coarsens the remote address (see [`crate::anonymize`]), renders the
//! timestamp without its offset and omits the dialog fragment entirely.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::anonymize::anonymize_endpoint;
use crate::dialog::xml;
use crate::error::{Error, Result};
use crate::event::{DialogRole, DialogSnapshot, MachineEvent, MachineEventType, MonitorEvent};

/// Single-character field separator
pub const FIELD_SEPARATOR: char = '|';

/// Fixed two-character end-of-message marker
pub const TERMINATOR: &str = "\r\n";

/// Marker wrapped around a dialog fragment to signal its presence
pub const FRAGMENT_MARKER: char = '#';

/// Number of fields in a machine event frame
const MACHINE_FIELD_COUNT: usize = 7;

/// Timestamp rendering with microsecond precision and numeric UTC offset
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f %:z";

/// Offset-less timestamp rendering used by the anonymized variant
const TIMESTAMP_FORMAT_ANONYMOUS: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Encode one event into one terminated frame.
///
/// With `anonymize` set, identifying fields are stripped or coarsened for
/// restricted audiences; the transform is lossy and not reversible. Encode
/// failures surface as an error, never as a truncated frame.
pub fn encode(event: &MonitorEvent, anonymize: bool) -> Result<String> {
    match event {
        MonitorEvent::Machine(machine) => encode_machine(machine, anonymize),
    }
}

/// Decode one frame into a typed event, dispatching on the leading
/// discriminator token.
///
/// A trailing terminator is stripped if present. Failures are per-frame and
/// recoverable: the caller logs and discards the frame, and subsequent
/// frames remain decodable.
pub fn decode(frame: &str) -> Result<MonitorEvent> {
    let frame = frame.strip_suffix(TERMINATOR).unwrap_or(frame);

    let (discriminator, _) = frame
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| Error::malformed_frame("frame has no field separator"))?;

    match discriminator {
        MachineEvent::DISCRIMINATOR => decode_machine(frame).map(MonitorEvent::Machine),
        other => Err(Error::unknown_event_kind(other)),
    }
}

fn encode_machine(event: &MachineEvent, anonymize: bool) -> Result<String> {
    let timestamp = if anonymize {
        event.timestamp.format(TIMESTAMP_FORMAT_ANONYMOUS).to_string()
    } else {
        event.timestamp.format(TIMESTAMP_FORMAT).to_string()
    };

    let username = if anonymize {
        ""
    } else {
        event.username.as_deref().unwrap_or("")
    };

    let endpoint = match event.remote {
        Some(remote) if anonymize => anonymize_endpoint(remote).to_string(),
        Some(remote) => remote.to_string(),
        None => String::new(),
    };

    let message = if anonymize {
        ""
    } else {
        event.message.as_deref().unwrap_or("")
    };

    let fragment = match &event.dialog {
        Some(snapshot) if !anonymize => {
            let xml = xml::to_fragment(
                &snapshot.participant,
                snapshot.role.as_str(),
                xml::SDP_FILTER,
            )?;
            format!("{marker}{xml}{marker}", marker = FRAGMENT_MARKER)
        }
        _ => String::new(),
    };

    Ok(format!(
        "{disc}{sep}{code}{sep}{timestamp}{sep}{username}{sep}{endpoint}{sep}{message}{sep}{fragment}{term}",
        disc = MachineEvent::DISCRIMINATOR,
        sep = FIELD_SEPARATOR,
        code = event.event_type.code(),
        timestamp = timestamp,
        username = username,
        endpoint = endpoint,
        message = message,
        fragment = fragment,
        term = TERMINATOR,
    ))
}

fn decode_machine(frame: &str) -> Result<MachineEvent> {
    let fields: Vec<&str> = frame.splitn(MACHINE_FIELD_COUNT, FIELD_SEPARATOR).collect();
    if fields.len() < MACHINE_FIELD_COUNT {
        return Err(Error::malformed_frame(format!(
            "expected {} fields, got {}",
            MACHINE_FIELD_COUNT,
            fields.len()
        )));
    }

    let code: u8 = fields[1].parse().map_err(|_| {
        Error::malformed_frame(format!("event type code is not an integer: {:?}", fields[1]))
    })?;
    let event_type = MachineEventType::from_code(code)
        .ok_or_else(|| Error::malformed_frame(format!("unknown event type code {}", code)))?;

    let timestamp = parse_timestamp(fields[2])?;

    let remote = match fields[4] {
        "" => None,
        endpoint => Some(endpoint.parse().map_err(|_| {
            Error::malformed_frame(format!("invalid remote endpoint: {:?}", endpoint))
        })?),
    };

    Ok(MachineEvent {
        event_type,
        timestamp,
        username: optional(fields[3]),
        remote,
        message: optional(fields[5]),
        dialog: decode_fragment(fields[6])?,
    })
}

/// Map the wire's empty-string convention back to an explicit absence
fn optional(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// Parse the last frame field: blank (after trimming the `#` wrapper)
/// means no embedded dialog, anything else must be a well-formed fragment.
fn decode_fragment(field: &str) -> Result<Option<DialogSnapshot>> {
    let inner = field.trim().trim_matches(FRAGMENT_MARKER).trim();
    if inner.is_empty() {
        return Ok(None);
    }

    let (role, participant) = xml::from_fragment_named(inner)?;
    Ok(Some(DialogSnapshot {
        role: DialogRole::from(role.as_str()),
        participant,
    }))
}

/// Parse either timestamp rendering; the offset-less anonymized form is
/// read as UTC.
fn parse_timestamp(field: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S%.f %:z") {
        return Ok(timestamp);
    }

    NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| Error::malformed_frame(format!("invalid timestamp {:?}: {}", field, e)))
}
