#![cfg(feature = "std")]

use anyhow::anyhow;

use crate::common::{Identity, Point};
use crate::config::SessionConfig;
use crate::game::{Event, SessionStatus, ShotOutcome};
use crate::protocol::{BattleApi, Message, Request, Response, SessionId, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Client side of a connection, acting as one identity.
///
/// Rejections come back as `anyhow` errors wrapping the
/// [`ServiceError`](crate::ServiceError), so callers can `downcast_ref` them.
pub struct Stub<T: Transport> {
    transport: T,
    caller: Identity,
    next_seq: u64,
    handshaken: bool,
}

impl<T: Transport> Stub<T> {
    pub fn new(transport: T, caller: Identity) -> Self {
        Self {
            transport,
            caller,
            next_seq: 0,
            handshaken: false,
        }
    }

    pub fn caller(&self) -> Identity {
        self.caller
    }

    async fn ensure_handshake(&mut self) -> anyhow::Result<()> {
        if self.handshaken {
            return Ok(());
        }
        self.transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match self.transport.recv().await? {
            Message::HelloAck { version } if version == PROTOCOL_VERSION => {
                self.handshaken = true;
                Ok(())
            }
            Message::HelloAck { version } => Err(anyhow!(
                "Protocol version mismatch in HelloAck: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow!("Expected HelloAck, got {:?}", other)),
        }
    }

    /// Send one request and wait for its response.
    pub async fn call(&mut self, body: Request) -> anyhow::Result<Response> {
        self.ensure_handshake().await?;
        let seq = self.next_seq;
        self.transport
            .send(Message::Request {
                seq,
                caller: self.caller,
                body,
            })
            .await?;
        self.next_seq += 1;
        match self.transport.recv().await? {
            Message::Response {
                seq: resp_seq,
                body: Response::Rejected(err),
            } if resp_seq == seq => Err(anyhow::Error::new(err)),
            Message::Response { seq: resp_seq, body } if resp_seq == seq => Ok(body),
            Message::Response { seq: resp_seq, .. } => Err(anyhow!(
                "Sequence mismatch in Response: expected {}, got {}",
                seq,
                resp_seq
            )),
            other => Err(anyhow!("Expected Response, got {:?}", other)),
        }
    }

    pub async fn create_session(&mut self) -> anyhow::Result<SessionId> {
        self.create_session_with(SessionConfig::default()).await
    }

    pub async fn create_session_with(&mut self, config: SessionConfig) -> anyhow::Result<SessionId> {
        match self.call(Request::CreateSession { config }).await? {
            Response::SessionCreated(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    /// Attach this connection to `session` as a [`BattleApi`].
    pub fn bind(self, session: SessionId) -> RemoteSeat<T> {
        RemoteSeat {
            stub: self,
            session,
        }
    }
}

fn unexpected(resp: Response) -> anyhow::Error {
    anyhow!("Unexpected response: {:?}", resp)
}

/// [`BattleApi`] over a [`Stub`] bound to one session.
pub struct RemoteSeat<T: Transport> {
    stub: Stub<T>,
    session: SessionId,
}

impl<T: Transport> RemoteSeat<T> {
    /// Detach from the session, keeping the connection.
    pub fn into_stub(self) -> Stub<T> {
        self.stub
    }
}

#[async_trait::async_trait]
impl<T: Transport> BattleApi for RemoteSeat<T> {
    fn caller(&self) -> Identity {
        self.stub.caller
    }

    fn session(&self) -> SessionId {
        self.session
    }

    async fn register_board(&mut self, cells: Vec<Point>) -> anyhow::Result<()> {
        let session = self.session;
        match self.stub.call(Request::RegisterBoard { session, cells }).await? {
            Response::Registered => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn take_shot(&mut self, point: Point) -> anyhow::Result<ShotOutcome> {
        let session = self.session;
        match self.stub.call(Request::TakeShot { session, point }).await? {
            Response::Shot(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    async fn finish_game(&mut self) -> anyhow::Result<()> {
        let session = self.session;
        match self.stub.call(Request::FinishGame { session }).await? {
            Response::Finished => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn is_started(&mut self) -> anyhow::Result<bool> {
        let session = self.session;
        match self.stub.call(Request::IsStarted { session }).await? {
            Response::Started(started) => Ok(started),
            other => Err(unexpected(other)),
        }
    }

    async fn active_player(&mut self) -> anyhow::Result<Identity> {
        let session = self.session;
        match self.stub.call(Request::ActivePlayer { session }).await? {
            Response::ActivePlayer(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    async fn player_at(&mut self, index: usize) -> anyhow::Result<Identity> {
        let session = self.session;
        match self.stub.call(Request::PlayerAt { session, index }).await? {
            Response::Player(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    async fn hit_count(&mut self, player: Identity) -> anyhow::Result<u32> {
        let session = self.session;
        match self.stub.call(Request::HitCount { session, player }).await? {
            Response::HitCount(n) => Ok(n),
            other => Err(unexpected(other)),
        }
    }

    async fn status(&mut self) -> anyhow::Result<SessionStatus> {
        let session = self.session;
        match self.stub.call(Request::Status { session }).await? {
            Response::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    async fn events(&mut self, from: usize) -> anyhow::Result<Vec<Event>> {
        let session = self.session;
        match self.stub.call(Request::Events { session, from }).await? {
            Response::Events(events) => Ok(events),
            other => Err(unexpected(other)),
        }
    }
}
