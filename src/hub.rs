#![cfg(feature = "std")]
//! Many concurrent sessions keyed by [`SessionId`].
//!
//! Each session sits behind its own mutex, so actions on one session are
//! applied one at a time while other sessions proceed independently. The map
//! lock is only held long enough to look a session up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock};

use crate::common::{GameError, Identity, Point};
use crate::config::SessionConfig;
use crate::game::{Event, Session, SessionSnapshot, SessionStatus, ShotOutcome};
use crate::protocol::{BattleApi, Request, Response, ServiceError, SessionId};

/// Sessions a hub holds before it refuses to create more.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

type SessionMap = HashMap<SessionId, Arc<Mutex<Session>>>;

pub struct SessionHub {
    sessions: RwLock<SessionMap>,
    next_id: AtomicU64,
    default_config: SessionConfig,
    max_sessions: usize,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        Self::with_default_config(SessionConfig::default())
    }

    /// Hub whose [`create_session`](Self::create_session) uses `config`.
    pub fn with_default_config(config: SessionConfig) -> Self {
        Self::with_limits(config, DEFAULT_MAX_SESSIONS)
    }

    /// Hub holding at most `max_sessions` sessions at once.
    pub fn with_limits(config: SessionConfig, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            default_config: config,
            max_sessions,
        }
    }

    pub async fn create_session(&self, owner: Identity) -> Result<SessionId, ServiceError> {
        self.create_session_with(owner, self.default_config).await
    }

    /// Add a session. At the limit, finished sessions are evicted first; if
    /// none can be, the request fails with [`ServiceError::HubFull`].
    pub async fn create_session_with(
        &self,
        owner: Identity,
        config: SessionConfig,
    ) -> Result<SessionId, ServiceError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            let evicted = evict_finished(&mut sessions);
            if evicted > 0 {
                info!("Evicted {} finished sessions", evicted);
            }
            if sessions.len() >= self.max_sessions {
                warn!("Session limit of {} reached, refusing {}", self.max_sessions, owner);
                return Err(ServiceError::HubFull {
                    limit: self.max_sessions,
                });
            }
        }
        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let session = Arc::new(Mutex::new(Session::with_config(owner, config)));
        sessions.insert(id, session);
        info!("Session {} created by {}", id, owner);
        Ok(id)
    }

    /// Number of sessions held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn session(&self, id: SessionId) -> Result<Arc<Mutex<Session>>, ServiceError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ServiceError::UnknownSession(id))
    }

    /// Run `f` with exclusive access to one session.
    async fn with_session<R, F>(&self, id: SessionId, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Session) -> Result<R, GameError>,
    {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        f(&mut *guard).map_err(|e| {
            debug!("Session {}: rejected: {}", id, e);
            ServiceError::from(e)
        })
    }

    pub async fn register_board(
        &self,
        id: SessionId,
        caller: Identity,
        cells: &[Point],
    ) -> Result<(), ServiceError> {
        self.with_session(id, |s| s.register_board(caller, cells)).await
    }

    pub async fn take_shot(
        &self,
        id: SessionId,
        caller: Identity,
        point: Point,
    ) -> Result<ShotOutcome, ServiceError> {
        self.with_session(id, |s| s.take_shot(caller, point)).await
    }

    pub async fn finish_game(&self, id: SessionId, caller: Identity) -> Result<(), ServiceError> {
        self.with_session(id, |s| s.finish_game(caller)).await
    }

    pub async fn is_started(&self, id: SessionId) -> Result<bool, ServiceError> {
        self.with_session(id, |s| Ok(s.is_started())).await
    }

    pub async fn active_player(&self, id: SessionId) -> Result<Identity, ServiceError> {
        self.with_session(id, |s| Ok(s.active_player())).await
    }

    pub async fn player_at(&self, id: SessionId, index: usize) -> Result<Identity, ServiceError> {
        self.with_session(id, |s| s.player_at(index)).await
    }

    pub async fn hit_count(&self, id: SessionId, player: Identity) -> Result<u32, ServiceError> {
        self.with_session(id, |s| s.hit_count(player)).await
    }

    pub async fn status(&self, id: SessionId) -> Result<SessionStatus, ServiceError> {
        self.with_session(id, |s| Ok(s.status())).await
    }

    pub async fn winner(&self, id: SessionId) -> Result<Option<Identity>, ServiceError> {
        self.with_session(id, |s| Ok(s.winner())).await
    }

    pub async fn events_since(&self, id: SessionId, from: usize) -> Result<Vec<Event>, ServiceError> {
        self.with_session(id, |s| Ok(s.events_since(from).to_vec())).await
    }

    pub async fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, ServiceError> {
        self.with_session(id, |s| Ok(s.snapshot())).await
    }

    /// Serve one protocol request on behalf of `caller`.
    pub async fn dispatch(&self, caller: Identity, request: Request) -> Response {
        let result = match request {
            Request::CreateSession { config } => self
                .create_session_with(caller, config)
                .await
                .map(Response::SessionCreated),
            Request::RegisterBoard { session, cells } => self
                .register_board(session, caller, &cells)
                .await
                .map(|()| Response::Registered),
            Request::TakeShot { session, point } => self
                .take_shot(session, caller, point)
                .await
                .map(Response::Shot),
            Request::FinishGame { session } => self
                .finish_game(session, caller)
                .await
                .map(|()| Response::Finished),
            Request::IsStarted { session } => self.is_started(session).await.map(Response::Started),
            Request::ActivePlayer { session } => {
                self.active_player(session).await.map(Response::ActivePlayer)
            }
            Request::PlayerAt { session, index } => {
                self.player_at(session, index).await.map(Response::Player)
            }
            Request::HitCount { session, player } => {
                self.hit_count(session, player).await.map(Response::HitCount)
            }
            Request::Status { session } => self.status(session).await.map(Response::Status),
            Request::Events { session, from } => {
                self.events_since(session, from).await.map(Response::Events)
            }
        };
        result.unwrap_or_else(Response::Rejected)
    }
}

/// Drop sessions that have finished. Sessions busy with a request are kept.
fn evict_finished(sessions: &mut SessionMap) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| match session.try_lock() {
        Ok(guard) => guard.status() != SessionStatus::Finished,
        Err(_) => true,
    });
    before - sessions.len()
}

/// In-process [`BattleApi`] for one caller in one session of a shared hub.
pub struct Seat {
    hub: Arc<SessionHub>,
    session: SessionId,
    caller: Identity,
}

impl Seat {
    pub fn new(hub: Arc<SessionHub>, session: SessionId, caller: Identity) -> Self {
        Self {
            hub,
            session,
            caller,
        }
    }
}

#[async_trait::async_trait]
impl BattleApi for Seat {
    fn caller(&self) -> Identity {
        self.caller
    }

    fn session(&self) -> SessionId {
        self.session
    }

    async fn register_board(&mut self, cells: Vec<Point>) -> anyhow::Result<()> {
        Ok(self.hub.register_board(self.session, self.caller, &cells).await?)
    }

    async fn take_shot(&mut self, point: Point) -> anyhow::Result<ShotOutcome> {
        Ok(self.hub.take_shot(self.session, self.caller, point).await?)
    }

    async fn finish_game(&mut self) -> anyhow::Result<()> {
        Ok(self.hub.finish_game(self.session, self.caller).await?)
    }

    async fn is_started(&mut self) -> anyhow::Result<bool> {
        Ok(self.hub.is_started(self.session).await?)
    }

    async fn active_player(&mut self) -> anyhow::Result<Identity> {
        Ok(self.hub.active_player(self.session).await?)
    }

    async fn player_at(&mut self, index: usize) -> anyhow::Result<Identity> {
        Ok(self.hub.player_at(self.session, index).await?)
    }

    async fn hit_count(&mut self, player: Identity) -> anyhow::Result<u32> {
        Ok(self.hub.hit_count(self.session, player).await?)
    }

    async fn status(&mut self) -> anyhow::Result<SessionStatus> {
        Ok(self.hub.status(self.session).await?)
    }

    async fn events(&mut self, from: usize) -> anyhow::Result<Vec<Event>> {
        Ok(self.hub.events_since(self.session, from).await?)
    }
}
