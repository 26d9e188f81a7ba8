use serde_json::json;

use super::*;

fn handshake() -> Handshake {
    Handshake {
        sid: "lv_VI97HAXpY6yYWAAAC".to_owned(),
        upgrades: Vec::new(),
        ping_interval: 25_000,
        ping_timeout: 20_000,
        max_payload: Some(1_000_000),
    }
}

// =============================================================
// Engine.IO
// =============================================================

#[test]
fn decodes_open_handshake_from_server() {
    let text = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
    let packet = EnginePacket::decode(text).expect("open");
    assert_eq!(packet, EnginePacket::Open(handshake()));
}

#[test]
fn open_encodes_camel_case_keys() {
    let text = EnginePacket::Open(handshake()).encode();
    assert!(text.starts_with('0'));
    let body: serde_json::Value = serde_json::from_str(&text[1..]).expect("json");
    assert_eq!(body["pingInterval"], 25_000);
    assert_eq!(body["maxPayload"], 1_000_000);
}

#[test]
fn heartbeat_packets() {
    assert_eq!(EnginePacket::decode("2").expect("ping"), EnginePacket::Ping(None));
    assert_eq!(EnginePacket::decode("2probe").expect("ping"), EnginePacket::Ping(Some("probe".to_owned())));
    assert_eq!(EnginePacket::Pong(None).encode(), "3");
    assert_eq!(EnginePacket::Pong(Some("probe".to_owned())).encode(), "3probe");
}

#[test]
fn control_packets_have_no_body() {
    assert_eq!(EnginePacket::decode("1").expect("close"), EnginePacket::Close);
    assert_eq!(EnginePacket::decode("5").expect("upgrade"), EnginePacket::Upgrade);
    assert_eq!(EnginePacket::decode("6").expect("noop"), EnginePacket::Noop);
    assert_eq!(EnginePacket::Close.encode(), "1");
}

#[test]
fn message_keeps_body_verbatim() {
    let packet = EnginePacket::decode(r#"42["kitchen-update"]"#).expect("message");
    assert_eq!(packet, EnginePacket::Message(r#"2["kitchen-update"]"#.to_owned()));
}

#[test]
fn engine_decode_rejects_empty_and_unknown() {
    assert!(matches!(EnginePacket::decode(""), Err(CodecError::Empty)));
    assert!(matches!(EnginePacket::decode("9"), Err(CodecError::UnknownEnginePacket('9'))));
    assert!(matches!(EnginePacket::decode("0{not json"), Err(CodecError::Json(_))));
}

// =============================================================
// Socket.IO
// =============================================================

#[test]
fn connect_on_default_namespace_is_bare() {
    assert_eq!(SocketPacket::connect(DEFAULT_NAMESPACE).encode(), "0");
    assert_eq!(EnginePacket::message(&SocketPacket::connect("/")).encode(), "40");
}

#[test]
fn connect_on_custom_namespace_has_comma() {
    assert_eq!(SocketPacket::disconnect("/admin").encode(), "1/admin,");
}

#[test]
fn decodes_connect_ack_with_sid() {
    let packet = SocketPacket::decode(r#"0{"sid":"abc"}"#).expect("connect");
    assert_eq!(packet.kind, SocketPacketKind::Connect);
    assert_eq!(packet.namespace, "/");
    assert_eq!(packet.data, Some(json!({ "sid": "abc" })));
}

#[test]
fn encodes_event_array() {
    let packet = SocketPacket::event("call-bill", vec![json!({ "tableName": "A1" })]);
    assert_eq!(packet.encode(), r#"2["call-bill",{"tableName":"A1"}]"#);
}

#[test]
fn decodes_event_with_namespace_and_ack() {
    let packet = SocketPacket::decode(r#"2/admin,13["order-update"]"#).expect("event");
    assert_eq!(packet.kind, SocketPacketKind::Event);
    assert_eq!(packet.namespace, "/admin");
    assert_eq!(packet.ack_id, Some(13));
    assert_eq!(packet.encode(), r#"2/admin,13["order-update"]"#);
}

#[test]
fn namespace_without_body() {
    let packet = SocketPacket::decode("1/admin").expect("disconnect");
    assert_eq!(packet.kind, SocketPacketKind::Disconnect);
    assert_eq!(packet.namespace, "/admin");
    assert_eq!(packet.data, None);
}

#[test]
fn socket_decode_rejects_binary_and_garbage() {
    assert!(matches!(SocketPacket::decode(r#"51-["x",{"_placeholder":true,"num":0}]"#), Err(CodecError::BinaryUnsupported)));
    assert!(matches!(SocketPacket::decode("x"), Err(CodecError::UnknownSocketPacket('x'))));
    assert!(matches!(SocketPacket::decode(""), Err(CodecError::Empty)));
    assert!(matches!(SocketPacket::decode("299999999999999999999999[]"), Err(CodecError::InvalidAckId(_))));
    assert!(matches!(SocketPacket::decode("2[oops"), Err(CodecError::Json(_))));
}

#[test]
fn event_parts_splits_name_and_args() {
    let packet = SocketPacket::event("order-ready", vec![json!({ "orderId": 7 }), json!(1)]);
    let (name, args) = packet.event_parts().expect("parts");
    assert_eq!(name, "order-ready");
    assert_eq!(args, &[json!({ "orderId": 7 }), json!(1)]);
}

#[test]
fn event_parts_rejects_nameless_events() {
    let empty = SocketPacket::decode("2[]").expect("decode");
    assert!(matches!(empty.event_parts(), Err(CodecError::MalformedEvent(_))));

    let numeric = SocketPacket::decode("2[5]").expect("decode");
    assert!(matches!(numeric.event_parts(), Err(CodecError::MalformedEvent(_))));
}
