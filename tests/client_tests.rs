//! Client configuration and error surface tests.

use acorndb::{Credentials, DocumentStore, Error, RemoteClient, StoreConfig, DEFAULT_PORT};

#[test]
fn test_config_defaults() {
  let config = StoreConfig::new("localhost", DEFAULT_PORT, "my-project");
  assert_eq!(config.host, "localhost");
  assert_eq!(config.port, 8484);
  assert_eq!(config.project_id, "my-project");
  assert_eq!(config.credentials, Credentials::Anonymous);
  assert!(config.use_messagepack);
  assert!(config.json_fallback);
}

#[test]
fn test_config_with_api_key() {
  let config = StoreConfig::new("db.example.com", 9000, "proj").with_api_key("public-key");
  assert_eq!(config.credentials, Credentials::ApiKey("public-key".to_string()));
  assert!(!config.credentials.is_privileged());
}

#[test]
fn test_config_with_service_account_is_privileged() {
  let config =
    StoreConfig::new("db.example.com", 9000, "proj").with_service_account("key-1", "s3cret");
  assert!(config.credentials.is_privileged());
}

#[test]
fn test_config_addr() {
  let config = StoreConfig::new("db.example.com", 9000, "proj");
  assert_eq!(config.addr(), "db.example.com:9000");
}

#[test]
fn test_error_display() {
  let err = Error::Connection("failed to connect".to_string());
  assert_eq!(format!("{}", err), "Connection error: failed to connect");

  let err = Error::Handshake("invalid magic".to_string());
  assert_eq!(format!("{}", err), "Handshake failed: invalid magic");

  let err = Error::VersionMismatch { server: 2, client: 1 };
  assert!(format!("{}", err).contains("server=2"));
  assert!(format!("{}", err).contains("client=1"));

  let err = Error::AuthFailed;
  assert_eq!(format!("{}", err), "Authentication failed");

  let err = Error::NotFound {
    collection: "users".to_string(),
    id: "u1".to_string(),
  };
  assert_eq!(format!("{}", err), "Document not found: users/u1");

  let err = Error::Server {
    code: "quota".to_string(),
    message: "write quota exceeded".to_string(),
  };
  assert_eq!(format!("{}", err), "Server error [quota]: write quota exceeded");

  let err = Error::Timeout;
  assert_eq!(format!("{}", err), "Timeout");

  let err = Error::ChannelClosed;
  assert_eq!(format!("{}", err), "Channel closed");
}

#[test]
fn test_error_taxonomy_helpers() {
  let source = Error::NotFound {
    collection: "users".to_string(),
    id: "u1".to_string(),
  };
  let err = Error::Write {
    operation: "update_document",
    collection: "users".to_string(),
    id: Some("u1".to_string()),
    source: Box::new(source),
  };

  assert!(err.is_write());
  assert!(!err.is_read());
  assert!(err.is_not_found());

  let err = Error::Read {
    operation: "get_document",
    collection: "users".to_string(),
    id: Some("u1".to_string()),
    source: Box::new(Error::Timeout),
  };
  assert!(err.is_read());
  assert!(!err.is_not_found());
}

#[test]
fn test_error_from_io() {
  let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
  let err: Error = io_err.into();
  match err {
    Error::Io(_) => {}
    _ => panic!("Expected Io error"),
  }
}

#[test]
fn test_error_from_json() {
  let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
  let err: Error = json_err.into();
  match err {
    Error::Serialization(_) => {}
    _ => panic!("Expected Serialization error"),
  }
}

#[tokio::test]
async fn test_connect_invalid_host() {
  let config = StoreConfig::new("invalid.host.that.does.not.exist", 8484, "proj");
  let result = RemoteClient::connect(&config).await;
  assert!(result.is_err());

  match result.unwrap_err() {
    Error::Connection(_) | Error::Io(_) => {}
    e => panic!("Expected Connection or Io error, got: {:?}", e),
  }
}

#[tokio::test]
async fn test_connect_refused() {
  // Try to connect to a port that's likely not listening
  let config = StoreConfig::new("127.0.0.1", 59999, "proj");
  let result = RemoteClient::connect(&config).await;
  assert!(result.is_err());
}

#[tokio::test]
async fn test_store_connect_refused() {
  let config = StoreConfig::new("127.0.0.1", 59999, "proj").with_api_key("key");
  let result = DocumentStore::connect(&config).await;
  assert!(result.is_err());
}

#[tokio::test]
async fn test_handshake_and_set_round_trip() {
  use acorndb::StoreClient;
  use serde_json::json;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let server = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();

    // hello: magic + version + flags, then project id and token
    let mut head = [0u8; 6];
    socket.read_exact(&mut head).await.unwrap();
    assert_eq!(&head[..4], b"ACRN");
    assert_eq!(head[4], 0x01);
    let mut len = [0u8; 2];
    socket.read_exact(&mut len).await.unwrap();
    let mut project = vec![0u8; u16::from_be_bytes(len) as usize];
    socket.read_exact(&mut project).await.unwrap();
    assert_eq!(project, b"proj");
    socket.read_exact(&mut len).await.unwrap();
    let mut token = vec![0u8; u16::from_be_bytes(len) as usize];
    socket.read_exact(&mut token).await.unwrap();
    assert_eq!(token, b"public-key");

    // accept, selecting the JSON encoding
    socket.write_all(&[0x00, 0x02]).await.unwrap();

    // one request frame
    let mut header = [0u8; 6];
    socket.read_exact(&mut header).await.unwrap();
    let len = u32::from_be_bytes(header[2..6].try_into().unwrap()) as usize;
    let mut payload = vec![0u8; len];
    socket.read_exact(&mut payload).await.unwrap();
    let request: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(request["type"], "set");
    assert_eq!(request["collection"], "users");
    assert_eq!(request["document_id"], "u1");
    assert_eq!(request["data"]["name"], "Alice");

    // acknowledge it
    let ack = serde_json::to_vec(&json!({"type": "ack", "id": request["id"]})).unwrap();
    let mut frame = vec![0x02, 0x02];
    frame.extend_from_slice(&(ack.len() as u32).to_be_bytes());
    frame.extend_from_slice(&ack);
    socket.write_all(&frame).await.unwrap();
  });

  let config = StoreConfig::new("127.0.0.1", addr.port(), "proj").with_api_key("public-key");
  let client = RemoteClient::connect(&config).await.unwrap();
  assert!(!client.session_id().is_empty());

  let data = json!({"name": "Alice"}).as_object().unwrap().clone();
  client.merge("users", "u1", data).await.unwrap();

  server.await.unwrap();
}
