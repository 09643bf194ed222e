use core::fmt;

use crate::protocol::Message;

/// Bidirectional, ordered message channel between a client and the server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

/// Returned by [`Transport::recv`] when the other end hung up between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerClosed;

impl fmt::Display for PeerClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Connection closed by peer")
    }
}

impl std::error::Error for PeerClosed {}

/// Whether `err` is an orderly close rather than a broken connection.
pub fn is_peer_closed(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PeerClosed>().is_some()
}

pub mod in_memory;
pub mod tcp;
