//! Wire protocol tests for the AcornDB native client.

use acorndb::protocol::{
  decode_payload, encode_frame, encode_hello, encode_payload, parse_frame_header, ClientMessage,
  Encoding, HandshakeStatus, MessageType, ProtocolFlags, ServerMessage, WireDocument,
  ERR_NOT_FOUND, MAGIC, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};
use acorndb::{field, BatchOperation, QuerySpec, SortDirection};
use serde_json::{json, Map, Value};

fn data(v: Value) -> Map<String, Value> {
  match v {
    Value::Object(map) => map,
    _ => panic!("expected object"),
  }
}

#[test]
fn test_magic_and_version() {
  assert_eq!(MAGIC, b"ACRN");
  assert_eq!(PROTOCOL_VERSION, 0x01);
  assert_eq!(MAX_MESSAGE_SIZE, 16 * 1024 * 1024);
}

#[test]
fn test_handshake_status_round_trip() {
  for status in [
    HandshakeStatus::Success,
    HandshakeStatus::VersionMismatch,
    HandshakeStatus::AuthFailed,
    HandshakeStatus::ProjectUnknown,
  ] {
    assert_eq!(HandshakeStatus::try_from(status as u8), Ok(status));
  }
  assert!(HandshakeStatus::try_from(0xff).is_err());
}

#[test]
fn test_message_type_round_trip() {
  assert_eq!(MessageType::try_from(0x01), Ok(MessageType::Request));
  assert_eq!(MessageType::try_from(0x02), Ok(MessageType::Response));
  assert!(MessageType::try_from(0x03).is_err());
}

#[test]
fn test_encoding_round_trip() {
  assert_eq!(Encoding::try_from(0x01), Ok(Encoding::MessagePack));
  assert_eq!(Encoding::try_from(0x02), Ok(Encoding::Json));
  assert!(Encoding::try_from(0x00).is_err());
}

#[test]
fn test_protocol_flags_bits() {
  let flags = ProtocolFlags {
    messagepack: true,
    json_fallback: false,
  };
  assert_eq!(u8::from(flags), 0x01);

  let parsed = ProtocolFlags::from(0x03);
  assert!(parsed.messagepack);
  assert!(parsed.json_fallback);
}

#[test]
fn test_hello_contains_project_and_token() {
  let hello = encode_hello(ProtocolFlags::default(), "my-project", "secret-token");
  assert_eq!(&hello[..4], MAGIC);
  assert_eq!(hello[4], PROTOCOL_VERSION);

  let project_len = u16::from_be_bytes([hello[6], hello[7]]) as usize;
  assert_eq!(&hello[8..8 + project_len], b"my-project");
}

#[test]
fn test_frame_header_round_trip() {
  let frame = encode_frame(MessageType::Response, Encoding::MessagePack, b"abc").unwrap();
  let header: [u8; 6] = frame[..6].try_into().unwrap();
  let (msg_type, encoding, len) = parse_frame_header(&header).unwrap();

  assert_eq!(msg_type, MessageType::Response);
  assert_eq!(encoding, Encoding::MessagePack);
  assert_eq!(len, 3);
}

#[test]
fn test_insert_message_shape() {
  let msg = ClientMessage::Insert {
    id: "req-1".to_string(),
    collection: "users".to_string(),
    data: data(json!({"name": "Alice"})),
  };

  let v = serde_json::to_value(&msg).unwrap();
  assert_eq!(v["type"], "insert");
  assert_eq!(v["collection"], "users");
  assert_eq!(v["data"]["name"], "Alice");
}

#[test]
fn test_query_message_carries_spec() {
  let msg = ClientMessage::Query {
    id: "req-2".to_string(),
    spec: QuerySpec::collection("products")
      .filter(field("price").gte(100))
      .order_by("price", SortDirection::Descending)
      .limit(5),
  };

  let v = serde_json::to_value(&msg).unwrap();
  assert_eq!(v["type"], "query");
  assert_eq!(v["spec"]["collection"], "products");
  assert_eq!(v["spec"]["conditions"][0]["op"], ">=");
  assert_eq!(v["spec"]["sort"]["direction"], "desc");
  assert_eq!(v["spec"]["limit"], 5);
}

#[test]
fn test_batch_message_shape() {
  let msg = ClientMessage::Batch {
    id: "req-3".to_string(),
    operations: vec![
      BatchOperation::Set {
        collection: "users".to_string(),
        id: "u1".to_string(),
        data: data(json!({"name": "Alice"})),
      },
      BatchOperation::Delete {
        collection: "users".to_string(),
        id: "u2".to_string(),
      },
    ],
  };

  let v = serde_json::to_value(&msg).unwrap();
  assert_eq!(v["type"], "batch");
  assert_eq!(v["operations"][0]["op"], "set");
  assert_eq!(v["operations"][1]["op"], "delete");
}

#[test]
fn test_client_message_request_id() {
  let msg = ClientMessage::Ping {
    id: "req-9".to_string(),
  };
  assert_eq!(msg.request_id(), "req-9");
}

#[test]
fn test_server_document_miss_is_none() {
  let raw = json!({"type": "document", "id": "req-1", "document": null});
  let msg: ServerMessage = serde_json::from_value(raw).unwrap();
  match msg {
    ServerMessage::Document { document, .. } => assert!(document.is_none()),
    other => panic!("expected Document, got {:?}", other),
  }
}

#[test]
fn test_server_documents_payload() {
  let raw = json!({
      "type": "documents",
      "id": "req-1",
      "documents": [
          {"id": "d1", "data": {"n": 1}},
          {"id": "d2", "data": {"n": 2}}
      ]
  });
  let msg: ServerMessage = serde_json::from_value(raw).unwrap();
  match msg {
    ServerMessage::Documents { documents, .. } => {
      assert_eq!(documents.len(), 2);
      assert_eq!(documents[0].id, "d1");
      assert_eq!(documents[1].data["n"], json!(2));
    }
    other => panic!("expected Documents, got {:?}", other),
  }
}

#[test]
fn test_not_found_error_code() {
  let msg = ServerMessage::Error {
    id: "req-1".to_string(),
    code: ERR_NOT_FOUND.to_string(),
    message: "no such document".to_string(),
  };
  let v = serde_json::to_value(&msg).unwrap();
  assert_eq!(v["code"], "not-found");
}

#[test]
fn test_payload_both_encodings() {
  let wire = WireDocument {
    id: "d1".to_string(),
    data: data(json!({"name": "Alice", "age": 30})),
  };
  let msg = ServerMessage::Document {
    id: "req-1".to_string(),
    document: Some(wire.clone()),
  };

  for encoding in [Encoding::MessagePack, Encoding::Json] {
    let payload = match encoding {
      Encoding::MessagePack => rmp_serde::to_vec_named(&msg).unwrap(),
      Encoding::Json => serde_json::to_vec(&msg).unwrap(),
    };
    let decoded = decode_payload(&payload, encoding).unwrap();
    match decoded {
      ServerMessage::Document { document, .. } => assert_eq!(document, Some(wire.clone())),
      other => panic!("expected Document, got {:?}", other),
    }
  }
}

#[test]
fn test_client_payload_round_trips_through_frame() {
  let msg = ClientMessage::Get {
    id: "req-5".to_string(),
    collection: "users".to_string(),
    document_id: "u1".to_string(),
  };

  let payload = encode_payload(&msg, Encoding::Json).unwrap();
  let frame = encode_frame(MessageType::Request, Encoding::Json, &payload).unwrap();

  let header: [u8; 6] = frame[..6].try_into().unwrap();
  let (_, encoding, len) = parse_frame_header(&header).unwrap();
  assert_eq!(len as usize, payload.len());

  let decoded: ClientMessage = serde_json::from_slice(&frame[6..]).unwrap();
  assert_eq!(decoded.request_id(), "req-5");
  assert_eq!(encoding, Encoding::Json);
}
