#![cfg(feature = "std")]

use std::sync::Arc;

use anyhow::anyhow;
use log::{debug, info, warn};

use crate::hub::SessionHub;
use crate::protocol::{Message, Response, ServiceError, PROTOCOL_VERSION};
use crate::transport::{is_peer_closed, Transport};

/// Server side of one client connection.
///
/// Requests must carry consecutive sequence numbers starting at 0. A request
/// out of sequence is answered with [`ServiceError::OutOfSequence`] and never
/// reaches the hub.
pub struct Skeleton<T: Transport> {
    hub: Arc<SessionHub>,
    transport: T,
    expected_seq: u64,
}

impl<T: Transport> Skeleton<T> {
    pub fn new(hub: Arc<SessionHub>, transport: T) -> Self {
        Self {
            hub,
            transport,
            expected_seq: 0,
        }
    }

    async fn handshake(&mut self) -> anyhow::Result<()> {
        match self.transport.recv().await? {
            Message::Hello { version } => {
                self.transport
                    .send(Message::HelloAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await?;
                if version != PROTOCOL_VERSION {
                    return Err(anyhow!(
                        "Protocol version mismatch: expected {}, got {}",
                        PROTOCOL_VERSION,
                        version
                    ));
                }
                Ok(())
            }
            other => Err(anyhow!("Expected Hello, got {:?}", other)),
        }
    }

    /// Serve requests until the peer closes the connection.
    ///
    /// Only an orderly close ends in `Ok`; a malformed frame, an oversized
    /// frame or a timeout is returned as an error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.handshake().await?;
        debug!("Handshake complete");

        loop {
            let msg = match self.transport.recv().await {
                Ok(msg) => msg,
                Err(e) if is_peer_closed(&e) => break,
                Err(e) => return Err(e),
            };
            let (seq, caller, body) = match msg {
                Message::Request { seq, caller, body } => (seq, caller, body),
                other => {
                    warn!("Unexpected message from client: {:?}", other);
                    return Err(anyhow!("Expected Request, got unexpected message (closing session)"));
                }
            };

            let reply = if seq != self.expected_seq {
                warn!("Out-of-order request: expected seq {}, got {}", self.expected_seq, seq);
                Response::Rejected(ServiceError::OutOfSequence {
                    expected: self.expected_seq,
                    got: seq,
                })
            } else {
                self.expected_seq += 1;
                self.hub.dispatch(caller, body).await
            };
            self.transport.send(Message::Response { seq, body: reply }).await?;
        }
        info!("Client disconnected after {} requests", self.expected_seq);
        Ok(())
    }
}
