//! Error types for the AcornDB client SDK.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Connection error: {0}")]
  Connection(String),

  #[error("Handshake failed: {0}")]
  Handshake(String),

  #[error("Protocol version mismatch: server={server}, client={client}")]
  VersionMismatch { server: u8, client: u8 },

  #[error("Authentication failed")]
  AuthFailed,

  #[error("Unknown project")]
  ProjectUnknown,

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(String),

  #[error("Server error [{code}]: {message}")]
  Server { code: String, message: String },

  #[error("Document not found: {collection}/{id}")]
  NotFound { collection: String, id: String },

  #[error("Invalid name: {0}")]
  InvalidName(String),

  #[error("Timeout")]
  Timeout,

  #[error("Channel closed")]
  ChannelClosed,

  /// A read or query against the store failed. Carries the operation
  /// context the failure was logged with and the original cause.
  #[error("Read failed during {operation} on '{collection}': {source}")]
  Read {
    operation: &'static str,
    collection: String,
    id: Option<String>,
    source: Box<Error>,
  },

  /// A write (add/set/update/delete/batch) against the store failed.
  #[error("Write failed during {operation} on '{collection}': {source}")]
  Write {
    operation: &'static str,
    collection: String,
    id: Option<String>,
    source: Box<Error>,
  },
}

impl Error {
  /// True for failures surfaced by a read or query operation.
  pub fn is_read(&self) -> bool {
    matches!(self, Self::Read { .. })
  }

  /// True for failures surfaced by a write operation.
  pub fn is_write(&self) -> bool {
    matches!(self, Self::Write { .. })
  }

  /// True when the underlying cause is a missing document, looking
  /// through the read/write wrappers.
  pub fn is_not_found(&self) -> bool {
    match self {
      Self::NotFound { .. } => true,
      Self::Read { source, .. } | Self::Write { source, .. } => source.is_not_found(),
      _ => false,
    }
  }
}

impl From<rmp_serde::encode::Error> for Error {
  fn from(e: rmp_serde::encode::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

impl From<rmp_serde::decode::Error> for Error {
  fn from(e: rmp_serde::decode::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
