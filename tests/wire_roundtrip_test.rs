//! End-to-end encode/decode properties of the monitoring wire protocol

use chrono::{DateTime, FixedOffset, TimeZone};
use sigmon_wire::prelude::*;

fn example_timestamp() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 5, 10, 0, 0)
        .unwrap()
}

fn full_event() -> MachineEvent {
    let participant = DialogParticipant::new()
        .with_identity("sip:alice@example.com", Some("Alice"))
        .with_target("sip:alice@192.168.1.55:5060")
        .with_cseq(7)
        .with_sdp("v=0\no=- 1 1 IN IP4 192.168.1.55\ns=-\nm=audio 4000 RTP/AVP 0");

    MachineEvent::new(MachineEventType::CallEstablished, example_timestamp())
        .with_username("alice")
        .with_remote("192.168.1.55:5060".parse().unwrap())
        .with_message("call-established")
        .with_dialog(DialogRole::Remote, participant)
}

#[test]
fn worked_example_frame_is_byte_exact() {
    let event = MachineEvent::new(MachineEventType::CallEstablished, example_timestamp())
        .with_username("alice")
        .with_remote("192.168.1.55:5060".parse().unwrap())
        .with_message("call-established");

    let frame = encode(&event.into(), false).unwrap();
    assert_eq!(
        frame,
        "2|3|2024-01-05 10:00:00.000000 +00:00|alice|192.168.1.55:5060|call-established|\r\n"
    );
}

#[test]
fn roundtrip_reproduces_all_fields_modulo_newline_normalization() {
    let event = full_event();
    let frame = encode(&event.clone().into(), false).unwrap();
    let MonitorEvent::Machine(decoded) = decode(&frame).unwrap();

    assert_eq!(decoded.event_type, event.event_type);
    assert_eq!(decoded.timestamp, event.timestamp);
    assert_eq!(decoded.username, event.username);
    assert_eq!(decoded.remote, event.remote);
    assert_eq!(decoded.message, event.message);

    let original = event.dialog.unwrap();
    let snapshot = decoded.dialog.unwrap();
    assert_eq!(snapshot.role, original.role);
    assert_eq!(snapshot.participant.display_name, original.participant.display_name);
    assert_eq!(snapshot.participant.identity, original.participant.identity);
    assert_eq!(snapshot.participant.target, original.participant.target);
    assert_eq!(snapshot.participant.cseq, original.participant.cseq);
    // The single documented normalization: bare LF becomes CRLF on decode
    assert_eq!(
        snapshot.participant.sdp.as_deref(),
        Some("v=0\r\no=- 1 1 IN IP4 192.168.1.55\r\ns=-\r\nm=audio 4000 RTP/AVP 0")
    );
}

#[test]
fn second_pass_newline_style_is_stable() {
    let frame = encode(&full_event().into(), false).unwrap();
    let first = decode(&frame).unwrap();

    let reencoded = encode(&first, false).unwrap();
    let second = decode(&reencoded).unwrap();

    // The CRLF style picked up on the first decode survives unchanged
    assert_eq!(first, second);
}

#[test]
fn anonymized_frame_carries_no_identifying_data() {
    let event = full_event();
    let frame = encode(&event.into(), true).unwrap();

    assert!(!frame.contains("alice"));
    assert!(!frame.contains("call-established"));
    assert!(!frame.contains("Alice"));
    assert!(!frame.contains('#'));
    assert_eq!(frame, "2|3|2024-01-05 10:00:00.000000||192.168.0.0:5060||\r\n");

    // The surviving address has its last 12 bits zeroed
    let MonitorEvent::Machine(decoded) = decode(&frame).unwrap();
    let remote = decoded.remote.unwrap();
    match remote.ip() {
        std::net::IpAddr::V4(v4) => {
            let octets = v4.octets();
            assert_eq!(octets[3], 0);
            assert_eq!(octets[2] & 0x0F, 0);
        }
        other => panic!("expected IPv4, got {}", other),
    }
    assert_eq!(remote.port(), 5060);
}

#[test]
fn cseq_zero_survives_a_full_frame_roundtrip() {
    let participant = DialogParticipant::new().with_identity("sip:bob@example.com", None);
    let event = MachineEvent::new(MachineEventType::CallSetup, example_timestamp())
        .with_dialog(DialogRole::Local, participant);

    let frame = encode(&event.into(), false).unwrap();
    assert!(!frame.contains("cseq"));

    let MonitorEvent::Machine(decoded) = decode(&frame).unwrap();
    assert_eq!(decoded.dialog.unwrap().participant.cseq, 0);
}

#[test]
fn sdp_filter_gates_fragment_content() {
    let participant = DialogParticipant::new()
        .with_identity("sip:carol@example.com", None)
        .with_sdp("v=0\ns=-");

    let included = to_fragment(&participant, "remote", SDP_FILTER).unwrap();
    assert!(included.contains("v=0"));

    let excluded = to_fragment(&participant, "remote", "no-sdp").unwrap();
    assert!(!excluded.contains("v=0"));
    assert_eq!(from_fragment(&excluded).unwrap().sdp, None);
}

#[test]
fn events_serialize_to_json() {
    let event: MonitorEvent = full_event().into();
    let json = serde_json::to_string(&event).unwrap();
    let back: MonitorEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
