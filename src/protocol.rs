//! Wire protocol types and serialization for the AcornDB native client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::batch::BatchOperation;
use crate::error::Error;
use crate::query::QuerySpec;

/// Protocol magic bytes
pub const MAGIC: &[u8; 4] = b"ACRN";

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Maximum message size (16MB)
pub const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Handshake status codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandshakeStatus {
  Success = 0x00,
  VersionMismatch = 0x01,
  AuthFailed = 0x02,
  ProjectUnknown = 0x03,
}

impl TryFrom<u8> for HandshakeStatus {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, ()> {
    match v {
      0x00 => Ok(Self::Success),
      0x01 => Ok(Self::VersionMismatch),
      0x02 => Ok(Self::AuthFailed),
      0x03 => Ok(Self::ProjectUnknown),
      _ => Err(()),
    }
  }
}

/// Message types
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageType {
  Request = 0x01,
  Response = 0x02,
}

impl TryFrom<u8> for MessageType {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, ()> {
    match v {
      0x01 => Ok(Self::Request),
      0x02 => Ok(Self::Response),
      _ => Err(()),
    }
  }
}

/// Encoding formats
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Encoding {
  #[default]
  MessagePack = 0x01,
  Json = 0x02,
}

impl TryFrom<u8> for Encoding {
  type Error = ();
  fn try_from(v: u8) -> Result<Self, ()> {
    match v {
      0x01 => Ok(Self::MessagePack),
      0x02 => Ok(Self::Json),
      _ => Err(()),
    }
  }
}

/// Protocol flags in handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolFlags {
  pub messagepack: bool,
  pub json_fallback: bool,
}

impl From<u8> for ProtocolFlags {
  fn from(byte: u8) -> Self {
    Self {
      messagepack: byte & 0x01 != 0,
      json_fallback: byte & 0x02 != 0,
    }
  }
}

impl From<ProtocolFlags> for u8 {
  fn from(flags: ProtocolFlags) -> u8 {
    let mut byte = 0u8;
    if flags.messagepack {
      byte |= 0x01;
    }
    if flags.json_fallback {
      byte |= 0x02;
    }
    byte
  }
}

/// Document record as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
  pub id: String,
  pub data: Map<String, Value>,
}

/// Client-to-server message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
  Insert {
    id: String,
    collection: String,
    data: Map<String, Value>,
  },
  /// Create-or-merge at a caller-chosen document id.
  Set {
    id: String,
    collection: String,
    document_id: String,
    data: Map<String, Value>,
  },
  Get {
    id: String,
    collection: String,
    document_id: String,
  },
  GetAll {
    id: String,
    collection: String,
  },
  /// Partial update; the server rejects it when the target is absent.
  Update {
    id: String,
    collection: String,
    document_id: String,
    data: Map<String, Value>,
  },
  Delete {
    id: String,
    collection: String,
    document_id: String,
  },
  Query {
    id: String,
    spec: QuerySpec,
  },
  Batch {
    id: String,
    operations: Vec<BatchOperation>,
  },
  Ping {
    id: String,
  },
}

impl ClientMessage {
  pub fn request_id(&self) -> &str {
    match self {
      Self::Insert { id, .. }
      | Self::Set { id, .. }
      | Self::Get { id, .. }
      | Self::GetAll { id, .. }
      | Self::Update { id, .. }
      | Self::Delete { id, .. }
      | Self::Query { id, .. }
      | Self::Batch { id, .. }
      | Self::Ping { id } => id,
    }
  }
}

/// Server-to-client message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
  /// Identifier assigned by an insert.
  Id { id: String, document_id: String },
  /// Write acknowledged.
  Ack { id: String },
  /// Single-document read result; `document` is absent for a miss.
  Document {
    id: String,
    document: Option<WireDocument>,
  },
  /// Multi-document read or query result.
  Documents {
    id: String,
    documents: Vec<WireDocument>,
  },
  Error {
    id: String,
    code: String,
    message: String,
  },
  Pong { id: String },
}

impl ServerMessage {
  pub fn request_id(&self) -> &str {
    match self {
      Self::Id { id, .. }
      | Self::Ack { id }
      | Self::Document { id, .. }
      | Self::Documents { id, .. }
      | Self::Error { id, .. }
      | Self::Pong { id } => id,
    }
  }
}

/// Error code the server uses for a missing update target.
pub const ERR_NOT_FOUND: &str = "not-found";

/// Serialize a client message payload in the negotiated encoding.
pub fn encode_payload(message: &ClientMessage, encoding: Encoding) -> crate::Result<Vec<u8>> {
  match encoding {
    Encoding::MessagePack => Ok(rmp_serde::to_vec_named(message)?),
    Encoding::Json => Ok(serde_json::to_vec(message)?),
  }
}

/// Deserialize a server message payload in the negotiated encoding.
pub fn decode_payload(payload: &[u8], encoding: Encoding) -> crate::Result<ServerMessage> {
  match encoding {
    Encoding::MessagePack => Ok(rmp_serde::from_slice(payload)?),
    Encoding::Json => Ok(serde_json::from_slice(payload)?),
  }
}

/// Frame a payload: `[type][encoding][len: u32 BE][payload]`.
pub fn encode_frame(
  msg_type: MessageType,
  encoding: Encoding,
  payload: &[u8],
) -> crate::Result<Vec<u8>> {
  if payload.len() as u64 > MAX_MESSAGE_SIZE as u64 {
    return Err(Error::Serialization(format!(
      "message of {} bytes exceeds maximum of {}",
      payload.len(),
      MAX_MESSAGE_SIZE
    )));
  }
  let mut frame = Vec::with_capacity(6 + payload.len());
  frame.push(msg_type as u8);
  frame.push(encoding as u8);
  frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
  frame.extend_from_slice(payload);
  Ok(frame)
}

/// Parse a 6-byte frame header into `(type, encoding, payload length)`.
pub fn parse_frame_header(header: &[u8; 6]) -> crate::Result<(MessageType, Encoding, u32)> {
  let msg_type = MessageType::try_from(header[0])
    .map_err(|_| Error::Serialization(format!("unknown message type: {:#04x}", header[0])))?;
  let encoding = Encoding::try_from(header[1])
    .map_err(|_| Error::Serialization(format!("unknown encoding: {:#04x}", header[1])))?;
  let len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]);
  if len > MAX_MESSAGE_SIZE {
    return Err(Error::Serialization(format!(
      "frame of {} bytes exceeds maximum of {}",
      len, MAX_MESSAGE_SIZE
    )));
  }
  Ok((msg_type, encoding, len))
}

/// Client hello: magic, version, flags, then length-prefixed project id
/// and auth token.
pub fn encode_hello(flags: ProtocolFlags, project_id: &str, auth_token: &str) -> Vec<u8> {
  let mut hello = Vec::with_capacity(6 + 4 + project_id.len() + auth_token.len());
  hello.extend_from_slice(MAGIC);
  hello.push(PROTOCOL_VERSION);
  hello.push(flags.into());
  hello.extend_from_slice(&(project_id.len() as u16).to_be_bytes());
  hello.extend_from_slice(project_id.as_bytes());
  hello.extend_from_slice(&(auth_token.len() as u16).to_be_bytes());
  hello.extend_from_slice(auth_token.as_bytes());
  hello
}
