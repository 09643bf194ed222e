#![cfg(feature = "std")]
//! Wire messages between a client [`Stub`](crate::Stub) and a server
//! [`Skeleton`](crate::Skeleton), plus the per-player API both sides share.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{GameError, Identity, Point};
use crate::config::SessionConfig;
use crate::game::{Event, SessionStatus, ShotOutcome};

/// Current protocol version. Peers with a different version are refused.
pub const PROTOCOL_VERSION: u32 = 1;

/// Key of one session inside a [`SessionHub`](crate::SessionHub).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rejections produced by the service layer around the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
    /// No session with this id exists.
    UnknownSession(SessionId),
    /// Request sequence number was not the next one expected.
    OutOfSequence { expected: u64, got: u64 },
    /// The hub holds its maximum number of unfinished sessions.
    HubFull { limit: usize },
    /// The coordinator rejected the action.
    Game(GameError),
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        ServiceError::Game(err)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::UnknownSession(id) => write!(f, "Unknown session {}", id),
            ServiceError::OutOfSequence { expected, got } => {
                write!(f, "Out-of-order request: expected seq {}, got {}", expected, got)
            }
            ServiceError::HubFull { limit } => write!(f, "Session limit of {} reached", limit),
            ServiceError::Game(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Operations a caller can ask of the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    CreateSession { config: SessionConfig },
    RegisterBoard { session: SessionId, cells: Vec<Point> },
    TakeShot { session: SessionId, point: Point },
    FinishGame { session: SessionId },
    IsStarted { session: SessionId },
    ActivePlayer { session: SessionId },
    PlayerAt { session: SessionId, index: usize },
    HitCount { session: SessionId, player: Identity },
    Status { session: SessionId },
    /// Events from index `from` onward.
    Events { session: SessionId, from: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    SessionCreated(SessionId),
    Registered,
    Shot(ShotOutcome),
    Finished,
    Started(bool),
    ActivePlayer(Identity),
    Player(Identity),
    HitCount(u32),
    Status(SessionStatus),
    Events(Vec<Event>),
    Rejected(ServiceError),
}

/// Frames exchanged over a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Client greeting carrying its protocol version.
    Hello { version: u32 },
    /// Server acceptance of the greeting.
    HelloAck { version: u32 },
    /// A call made on behalf of `caller`.
    Request { seq: u64, caller: Identity, body: Request },
    /// Answer to the request with the same `seq`.
    Response { seq: u64, body: Response },
}

/// One player's view of one session.
#[async_trait::async_trait]
pub trait BattleApi: Send + Sync {
    /// Identity every call is made as.
    fn caller(&self) -> Identity;
    fn session(&self) -> SessionId;
    async fn register_board(&mut self, cells: Vec<Point>) -> anyhow::Result<()>;
    async fn take_shot(&mut self, point: Point) -> anyhow::Result<ShotOutcome>;
    async fn finish_game(&mut self) -> anyhow::Result<()>;
    async fn is_started(&mut self) -> anyhow::Result<bool>;
    async fn active_player(&mut self) -> anyhow::Result<Identity>;
    async fn player_at(&mut self, index: usize) -> anyhow::Result<Identity>;
    async fn hit_count(&mut self, player: Identity) -> anyhow::Result<u32>;
    async fn status(&mut self) -> anyhow::Result<SessionStatus>;
    async fn events(&mut self, from: usize) -> anyhow::Result<Vec<Event>>;
}
