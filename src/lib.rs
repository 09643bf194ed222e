#![cfg_attr(not(feature = "std"), no_std)]
//! Deterministic two-player grid-battle coordinator.
//!
//! The core ([`Session`]) is a plain value that arbitrates one game: board
//! registration, turn order and shot resolution. With the `std` feature the
//! crate also provides a [`SessionHub`] holding many sessions, a wire
//! protocol, transports and a client [`Stub`].

extern crate alloc;

mod board;
mod common;
mod config;
mod game;
#[cfg(feature = "std")]
mod hub;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
mod skeleton;
#[cfg(feature = "std")]
mod stub;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
#[cfg(feature = "std")]
pub use hub::{Seat, SessionHub, DEFAULT_MAX_SESSIONS};
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_with, LOG_ENV};
#[cfg(feature = "std")]
pub use protocol::{BattleApi, Message, Request, Response, ServiceError, SessionId, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use skeleton::Skeleton;
#[cfg(feature = "std")]
pub use stub::{RemoteSeat, Stub};
#[cfg(feature = "std")]
pub use transport::{
    in_memory::InMemoryTransport, is_peer_closed, tcp::TcpTransport, PeerClosed, Transport,
};
