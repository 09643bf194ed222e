//! Commonly used types and utilities for ease of import.

pub use crate::{
    random_cells, Action, BattleApi, Event, GameError, Identity, Point, Session, SessionConfig,
    SessionHub, SessionId, SessionStatus, ShotOutcome, ShotReport, EXPECTED_CELLS,
};

pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
pub use crate::{Skeleton, Stub};
