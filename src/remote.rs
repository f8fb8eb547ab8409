//! Native TCP client for the hosted store.
//!
//! One connection serves any number of in-flight requests: frames are
//! written under a lock, a background reader task routes responses to
//! per-request channels by request id, and callers resume in whatever
//! order responses arrive. The client imposes no timeouts; wrap calls
//! externally when cancellation is needed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::batch::BatchOperation;
use crate::client::StoreClient;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::protocol::{
    decode_payload, encode_frame, encode_hello, encode_payload, parse_frame_header, ClientMessage,
    Encoding, HandshakeStatus, MessageType, ServerMessage, WireDocument, ERR_NOT_FOUND,
    PROTOCOL_VERSION,
};
use crate::query::QuerySpec;

type Pending = Arc<parking_lot::Mutex<HashMap<String, oneshot::Sender<ServerMessage>>>>;

/// TCP implementation of [`StoreClient`].
#[derive(Debug)]
pub struct RemoteClient {
    writer: Mutex<OwnedWriteHalf>,
    pending: Pending,
    encoding: Encoding,
    session_id: String,
}

impl RemoteClient {
    /// Connect and perform the handshake described in the protocol
    /// module. The second status byte carries the negotiated encoding
    /// on success, or the server's protocol version on a mismatch.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let addr = config.addr();
        let mut stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        let token = config.credentials.auth_token(&config.project_id);
        let hello = encode_hello(config.flags(), &config.project_id, &token);
        stream.write_all(&hello).await?;
        stream.flush().await?;

        let mut response = [0u8; 2];
        stream.read_exact(&mut response).await?;
        match HandshakeStatus::try_from(response[0]) {
            Ok(HandshakeStatus::Success) => {}
            Ok(HandshakeStatus::VersionMismatch) => {
                return Err(Error::VersionMismatch {
                    server: response[1],
                    client: PROTOCOL_VERSION,
                })
            }
            Ok(HandshakeStatus::AuthFailed) => return Err(Error::AuthFailed),
            Ok(HandshakeStatus::ProjectUnknown) => return Err(Error::ProjectUnknown),
            Err(()) => {
                return Err(Error::Handshake(format!(
                    "unknown status byte: {:#04x}",
                    response[0]
                )))
            }
        }
        let encoding = Encoding::try_from(response[1]).map_err(|()| {
            Error::Handshake(format!("unknown encoding byte: {:#04x}", response[1]))
        })?;

        let session_id = Uuid::new_v4().to_string();
        debug!(%session_id, %addr, ?encoding, "connected");

        let (read_half, write_half) = stream.into_split();
        let pending: Pending = Arc::new(parking_lot::Mutex::new(HashMap::new()));
        tokio::spawn(read_loop(read_half, Arc::clone(&pending)));

        Ok(Self {
            writer: Mutex::new(write_half),
            pending,
            encoding,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Round-trip a liveness check.
    pub async fn ping(&self) -> Result<()> {
        let message = ClientMessage::Ping { id: request_id() };
        match self.request(message).await? {
            ServerMessage::Pong { .. } => Ok(()),
            other => Err(unexpected("ping", &other)),
        }
    }

    async fn request(&self, message: ClientMessage) -> Result<ServerMessage> {
        let id = message.request_id().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id.clone(), tx);

        let result: Result<()> = async {
            let payload = encode_payload(&message, self.encoding)?;
            let frame = encode_frame(MessageType::Request, self.encoding, &payload)?;
            let mut writer = self.writer.lock().await;
            writer.write_all(&frame).await?;
            writer.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Issue a request, mapping a server-side error response onto the
    /// crate taxonomy (`not-found` becomes [`Error::NotFound`] at the
    /// named document).
    async fn call(
        &self,
        message: ClientMessage,
        collection: &str,
        id: &str,
    ) -> Result<ServerMessage> {
        match self.request(message).await? {
            ServerMessage::Error { code, message, .. } => {
                if code == ERR_NOT_FOUND {
                    Err(Error::NotFound {
                        collection: collection.to_string(),
                        id: id.to_string(),
                    })
                } else {
                    Err(Error::Server { code, message })
                }
            }
            other => Ok(other),
        }
    }
}

fn request_id() -> String {
    Uuid::new_v4().to_string()
}

fn unexpected(context: &str, message: &ServerMessage) -> Error {
    Error::Serialization(format!("unexpected {} response: {:?}", context, message))
}

fn into_pairs(documents: Vec<WireDocument>) -> Vec<(String, Map<String, Value>)> {
    documents.into_iter().map(|doc| (doc.id, doc.data)).collect()
}

/// Routes response frames to their waiting request. When the
/// connection drops, clearing the pending map closes every waiting
/// channel and the callers observe `ChannelClosed`.
async fn read_loop(mut reader: OwnedReadHalf, pending: Pending) {
    loop {
        let mut header = [0u8; 6];
        if reader.read_exact(&mut header).await.is_err() {
            break;
        }
        let (_, encoding, len) = match parse_frame_header(&header) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "dropping connection on malformed frame header");
                break;
            }
        };
        let mut payload = vec![0u8; len as usize];
        if reader.read_exact(&mut payload).await.is_err() {
            break;
        }
        match decode_payload(&payload, encoding) {
            Ok(message) => {
                let sender = pending.lock().remove(message.request_id());
                match sender {
                    Some(tx) => {
                        let _ = tx.send(message);
                    }
                    None => warn!(request = message.request_id(), "response for unknown request"),
                }
            }
            Err(e) => warn!(error = %e, "undecodable response frame"),
        }
    }
    pending.lock().clear();
}

#[async_trait]
impl StoreClient for RemoteClient {
    async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<String> {
        let message = ClientMessage::Insert {
            id: request_id(),
            collection: collection.to_string(),
            data,
        };
        match self.call(message, collection, "").await? {
            ServerMessage::Id { document_id, .. } => Ok(document_id),
            other => Err(unexpected("insert", &other)),
        }
    }

    async fn merge(&self, collection: &str, id: &str, data: Map<String, Value>) -> Result<()> {
        let message = ClientMessage::Set {
            id: request_id(),
            collection: collection.to_string(),
            document_id: id.to_string(),
            data,
        };
        match self.call(message, collection, id).await? {
            ServerMessage::Ack { .. } => Ok(()),
            other => Err(unexpected("set", &other)),
        }
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Map<String, Value>>> {
        let message = ClientMessage::Get {
            id: request_id(),
            collection: collection.to_string(),
            document_id: id.to_string(),
        };
        match self.call(message, collection, id).await? {
            ServerMessage::Document { document, .. } => Ok(document.map(|doc| doc.data)),
            other => Err(unexpected("get", &other)),
        }
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<(String, Map<String, Value>)>> {
        let message = ClientMessage::GetAll {
            id: request_id(),
            collection: collection.to_string(),
        };
        match self.call(message, collection, "").await? {
            ServerMessage::Documents { documents, .. } => Ok(into_pairs(documents)),
            other => Err(unexpected("get-all", &other)),
        }
    }

    async fn update(&self, collection: &str, id: &str, data: Map<String, Value>) -> Result<()> {
        let message = ClientMessage::Update {
            id: request_id(),
            collection: collection.to_string(),
            document_id: id.to_string(),
            data,
        };
        match self.call(message, collection, id).await? {
            ServerMessage::Ack { .. } => Ok(()),
            other => Err(unexpected("update", &other)),
        }
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let message = ClientMessage::Delete {
            id: request_id(),
            collection: collection.to_string(),
            document_id: id.to_string(),
        };
        match self.call(message, collection, id).await? {
            ServerMessage::Ack { .. } => Ok(()),
            other => Err(unexpected("delete", &other)),
        }
    }

    async fn execute(&self, spec: QuerySpec) -> Result<Vec<(String, Map<String, Value>)>> {
        let collection = spec.collection.clone();
        let message = ClientMessage::Query {
            id: request_id(),
            spec,
        };
        match self.call(message, &collection, "").await? {
            ServerMessage::Documents { documents, .. } => Ok(into_pairs(documents)),
            other => Err(unexpected("query", &other)),
        }
    }

    async fn commit(&self, operations: Vec<BatchOperation>) -> Result<()> {
        let message = ClientMessage::Batch {
            id: request_id(),
            operations,
        };
        match self.request(message).await? {
            ServerMessage::Ack { .. } => Ok(()),
            ServerMessage::Error { code, message, .. } => Err(Error::Server { code, message }),
            other => Err(unexpected("batch", &other)),
        }
    }
}
