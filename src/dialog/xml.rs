//! XML fragment mapping for dialog participants
//!
//! A participant is embedded in a frame as a self-contained XML element. The
//! element name is chosen by the caller as a role label (e.g. `local` or
//! `remote`):
//!
//! ```xml
//! <remote>
//!   <identity display-name="Alice">sip:alice@example.com</identity>
//!   <target uri="sip:alice@192.168.1.55:5060"/>
//!   <cseq>42</cseq>
//!   <sdp xmlns="urn:sigmon:xml:ns:monitor:sdp">v=0
//! o=- 0 0 IN IP4 192.168.1.55
//! ...</sdp>
//! </remote>
//! ```
//!
//! Children are emitted only when present: no identity URI means no
//! `identity` element (a display name alone is meaningless and dropped), a
//! `cseq` of zero is treated as unset and omitted, and the `sdp` element is
//! additionally gated by the caller-supplied filter token.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

use crate::dialog::DialogParticipant;
use crate::error::{Error, Result};

/// Filter token that enables inclusion of the session description payload.
/// Any other filter value omits the `sdp` element regardless of content.
pub const SDP_FILTER: &str = "sdp";

/// Namespace qualifying the `sdp` element separately from the rest of the
/// fragment, since its text is an opaque payload rather than dialog state.
pub const SDP_NAMESPACE: &str = "urn:sigmon:xml:ns:monitor:sdp";

/// Write one event, mapping the writer's error into the crate error type
fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::malformed_dialog_xml(e.to_string()))
}

/// Serialize a participant into an XML fragment rooted at `node_name`.
///
/// `node_name` is the caller-chosen role label for this participant within
/// the event (e.g. `"local"` or `"remote"`). The session description child
/// is written only when `filter` equals [`SDP_FILTER`] and the participant
/// actually carries SDP text.
pub fn to_fragment(
    participant: &DialogParticipant,
    node_name: &str,
    filter: &str,
) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    write(&mut writer, Event::Start(BytesStart::new(node_name)))?;

    if let Some(identity) = &participant.identity {
        let mut elem = BytesStart::new("identity");
        if let Some(name) = &participant.display_name {
            elem.push_attribute(("display-name", name.as_str()));
        }
        write(&mut writer, Event::Start(elem))?;
        write(&mut writer, Event::Text(BytesText::new(identity)))?;
        write(&mut writer, Event::End(BytesStart::new("identity").to_end()))?;
    }

    if let Some(target) = &participant.target {
        let mut elem = BytesStart::new("target");
        elem.push_attribute(("uri", target.as_str()));
        write(&mut writer, Event::Empty(elem))?;
    }

    // Zero means the counter was never set
    if participant.cseq > 0 {
        let cseq = participant.cseq.to_string();
        write(&mut writer, Event::Start(BytesStart::new("cseq")))?;
        write(&mut writer, Event::Text(BytesText::new(&cseq)))?;
        write(&mut writer, Event::End(BytesStart::new("cseq").to_end()))?;
    }

    if filter == SDP_FILTER {
        if let Some(sdp) = &participant.sdp {
            if !sdp.is_empty() {
                let mut elem = BytesStart::new("sdp");
                elem.push_attribute(("xmlns", SDP_NAMESPACE));
                write(&mut writer, Event::Start(elem))?;
                write(&mut writer, Event::Text(BytesText::new(sdp)))?;
                write(&mut writer, Event::End(BytesStart::new("sdp").to_end()))?;
            }
        }
    }

    write(&mut writer, Event::End(BytesStart::new(node_name).to_end()))?;

    let xml = writer.into_inner().into_inner();
    String::from_utf8(xml).map_err(|e| Error::malformed_dialog_xml(e.to_string()))
}

/// Parse an XML fragment back into a participant.
///
/// Absent children decode to `None` (or `0` for the sequence counter). Bare
/// line feeds in the session description text are normalized to CRLF pairs;
/// this normalization is decode-only and not reversed by [`to_fragment`].
pub fn from_fragment(fragment: &str) -> Result<DialogParticipant> {
    from_fragment_named(fragment).map(|(_, participant)| participant)
}

/// Which child element text is currently being read
enum Child {
    Identity,
    Cseq,
    Sdp,
}

/// Parse an XML fragment, also returning the root element name (the role
/// label the encoder was given).
pub fn from_fragment_named(fragment: &str) -> Result<(String, DialogParticipant)> {
    let mut reader = Reader::from_str(fragment);

    let mut participant = DialogParticipant::new();
    let mut root: Option<String> = None;
    let mut current: Option<Child> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.name();
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(name.as_ref()).to_string());
                    continue;
                }
                match name.as_ref() {
                    b"identity" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"display-name" {
                                participant.display_name =
                                    Some(attr.unescape_value()?.to_string());
                            }
                        }
                        // Present even when the text turns out empty
                        participant.identity = Some(String::new());
                        current = Some(Child::Identity);
                    }
                    b"target" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"uri" {
                                participant.target = Some(attr.unescape_value()?.to_string());
                            }
                        }
                    }
                    b"cseq" => current = Some(Child::Cseq),
                    b"sdp" => current = Some(Child::Sdp),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if root.is_none() {
                    // A childless participant encodes as a lone empty element
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
                    continue;
                }
                if e.name().as_ref() == b"target" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"uri" {
                            participant.target = Some(attr.unescape_value()?.to_string());
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape()?;
                match current {
                    Some(Child::Identity) => {
                        participant.identity = Some(text.to_string());
                    }
                    Some(Child::Cseq) => {
                        participant.cseq = text.trim().parse().map_err(|_| {
                            Error::malformed_dialog_xml(format!(
                                "cseq is not a non-negative integer: {:?}",
                                text
                            ))
                        })?;
                    }
                    Some(Child::Sdp) => {
                        participant.sdp = Some(normalize_newlines(&text));
                    }
                    None => {}
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(Error::malformed_dialog_xml("unbalanced end tag"));
                }
                depth -= 1;
                current = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::malformed_dialog_xml("unclosed element"));
    }

    match root {
        Some(name) => Ok((name, participant)),
        None => Err(Error::malformed_dialog_xml("no root element")),
    }
}

/// Normalize bare line feeds to CRLF pairs, leaving existing CRLF intact
fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cr = false;
    for c in text.chars() {
        if c == '\n' && !prev_cr {
            out.push('\r');
        }
        prev_cr = c == '\r';
        out.push(c);
    }
    out
}
