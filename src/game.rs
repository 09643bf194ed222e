//! The battle coordinator: session lifecycle, turn order and shot resolution.
//!
//! Every transition is a pure function of the prior session, the action and
//! the caller. Checks always run before the first write, so a rejected
//! action leaves the session exactly as it was.

use alloc::vec::Vec;
use core::fmt;
use log::{debug, info};

use crate::board::BoardRegistry;
use crate::common::{GameError, Identity, Point};
use crate::config::{RepeatShotPolicy, SessionConfig};

/// Lifecycle of a session. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionStatus {
    NotStarted,
    AwaitingSecondPlayer,
    InProgress,
    Finished,
}

/// Public record of one resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotReport {
    pub attacker: Identity,
    pub defender: Identity,
    pub point: Point,
    pub hit: bool,
}

/// Result of [`Session::take_shot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotOutcome {
    pub report: ShotReport,
    /// The shot sank the defender's last cell and ended the game.
    pub finished: bool,
}

/// Externally observable, append-only notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    ShotReport(ShotReport),
    GameFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    RegisterBoard(Vec<Point>),
    TakeShot(Point),
    FinishGame,
}

/// An accepted action together with the identity that submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub caller: Identity,
    pub kind: ActionKind,
}

impl Action {
    pub fn register(caller: Identity, cells: Vec<Point>) -> Self {
        Self {
            caller,
            kind: ActionKind::RegisterBoard(cells),
        }
    }

    pub fn shot(caller: Identity, point: Point) -> Self {
        Self {
            caller,
            kind: ActionKind::TakeShot(point),
        }
    }

    pub fn finish(caller: Identity) -> Self {
        Self {
            caller,
            kind: ActionKind::FinishGame,
        }
    }
}

/// Serializable copy of a whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    pub config: SessionConfig,
    pub owner: Identity,
    pub status: SessionStatus,
    pub boards: BoardRegistry,
    pub active_player: Identity,
    pub winner: Option<Identity>,
    pub events: Vec<Event>,
    pub history: Vec<Action>,
}

/// Failure rebuilding a session from its action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The action at `step` was rejected by the rules.
    Rejected { step: usize, error: GameError },
    /// Replaying the log produced a different session than the one claimed.
    Diverged,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Rejected { step, error } => {
                write!(f, "Action {} was rejected during replay: {}", step, error)
            }
            ReplayError::Diverged => write!(f, "Replayed session does not match the snapshot"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReplayError {}

/// A single two-player game and its authoritative state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    config: SessionConfig,
    owner: Identity,
    status: SessionStatus,
    registry: BoardRegistry,
    active_player: Identity,
    winner: Option<Identity>,
    events: Vec<Event>,
    history: Vec<Action>,
}

impl Session {
    /// Create an empty session with the default rules.
    pub fn new(owner: Identity) -> Self {
        Self::with_config(owner, SessionConfig::default())
    }

    pub fn with_config(owner: Identity, config: SessionConfig) -> Self {
        Self {
            config,
            owner,
            status: SessionStatus::NotStarted,
            registry: BoardRegistry::new(),
            active_player: Identity::NULL,
            winner: None,
            events: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Declare `caller`'s ship cells and take a seat.
    ///
    /// The second registration starts the game with the first registrant
    /// holding the turn.
    pub fn register_board(&mut self, caller: Identity, cells: &[Point]) -> Result<(), GameError> {
        let board = crate::board::Board::new(caller, cells)?;
        if caller.is_null() {
            return Err(GameError::ReservedIdentity);
        }
        if self.registry.is_full() {
            return Err(GameError::SessionFull);
        }
        if self.registry.is_registered(caller) {
            return Err(GameError::AlreadyRegistered(caller));
        }

        self.registry.insert(board);
        self.history.push(Action::register(caller, cells.to_vec()));
        if self.registry.is_full() {
            self.status = SessionStatus::InProgress;
            self.active_player = self.registry.player_at(0)?;
            info!(
                "Game started: {} vs {}, {} to move",
                self.active_player,
                caller,
                self.active_player
            );
        } else {
            self.status = SessionStatus::AwaitingSecondPlayer;
            debug!("Board registered for {}, awaiting second player", caller);
        }
        Ok(())
    }

    /// Fire at `target` on the opponent's board.
    ///
    /// A hit keeps the turn with the attacker, a miss hands it to the
    /// defender. Sinking the defender's last cell finishes the game.
    pub fn take_shot(&mut self, caller: Identity, target: Point) -> Result<ShotOutcome, GameError> {
        if self.status != SessionStatus::InProgress {
            return Err(GameError::GameNotStarted);
        }
        if caller != self.active_player {
            return Err(GameError::NotActivePlayer {
                caller,
                active: self.active_player,
            });
        }
        let defender = self.registry.opponent_of(caller)?;
        let board = self.registry.board_of(defender)?;
        let hit = board.occupies(target);
        if hit && self.config.repeat_shots == RepeatShotPolicy::Reject && board.was_hit(target) {
            return Err(GameError::AlreadyHit(target));
        }

        if hit {
            self.registry.record_hit(defender, target)?;
        }
        let report = ShotReport {
            attacker: caller,
            defender,
            point: target,
            hit,
        };
        self.events.push(Event::ShotReport(report));
        self.history.push(Action::shot(caller, target));
        debug!(
            "{} fired at {} on {}: {}",
            caller,
            target,
            defender,
            if hit { "hit" } else { "miss" }
        );

        let mut finished = false;
        if !hit {
            self.active_player = defender;
        } else if self.registry.is_fully_sunk(defender) {
            self.close();
            self.winner = Some(caller);
            finished = true;
            info!("All cells of {} sunk, {} wins", defender, caller);
        }
        Ok(ShotOutcome { report, finished })
    }

    /// End a game in progress. Any caller may do so; terminal.
    pub fn finish_game(&mut self, caller: Identity) -> Result<(), GameError> {
        if self.status != SessionStatus::InProgress {
            return Err(GameError::GameNotStarted);
        }
        self.history.push(Action::finish(caller));
        self.close();
        info!("Game finished by {}", caller);
        Ok(())
    }

    fn close(&mut self) {
        self.status = SessionStatus::Finished;
        self.active_player = Identity::NULL;
        self.events.push(Event::GameFinished);
    }

    /// Apply a logged action with the same rules as the direct calls.
    pub fn apply(&mut self, action: &Action) -> Result<(), GameError> {
        match &action.kind {
            ActionKind::RegisterBoard(cells) => self.register_board(action.caller, cells),
            ActionKind::TakeShot(point) => self.take_shot(action.caller, *point).map(|_| ()),
            ActionKind::FinishGame => self.finish_game(action.caller),
        }
    }

    /// Rebuild a session from an ordered log of accepted actions.
    pub fn replay<'a, I>(owner: Identity, config: SessionConfig, actions: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        let mut session = Self::with_config(owner, config);
        for (step, action) in actions.into_iter().enumerate() {
            session
                .apply(action)
                .map_err(|error| ReplayError::Rejected { step, error })?;
        }
        Ok(session)
    }

    /// Serializable copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            config: self.config,
            owner: self.owner,
            status: self.status,
            boards: self.registry.clone(),
            active_player: self.active_player,
            winner: self.winner,
            events: self.events.clone(),
            history: self.history.clone(),
        }
    }

    /// Rebuild a session from a snapshot, accepting it only if replaying
    /// its history reproduces every other field.
    pub fn restore(snapshot: &SessionSnapshot) -> Result<Self, ReplayError> {
        let session = Self::replay(snapshot.owner, snapshot.config, &snapshot.history)?;
        if session.snapshot() != *snapshot {
            return Err(ReplayError::Diverged);
        }
        Ok(session)
    }

    pub fn is_started(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Identity allowed to shoot, or [`Identity::NULL`] outside a game.
    pub fn active_player(&self) -> Identity {
        self.active_player
    }

    pub fn player_at(&self, index: usize) -> Result<Identity, GameError> {
        self.registry.player_at(index)
    }

    /// Hits taken by `id`'s board.
    pub fn hit_count(&self, id: Identity) -> Result<u32, GameError> {
        self.registry.hit_count(id)
    }

    /// Informational creator of the session; not consulted by any rule.
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Attacker that sank the opposing board, if the game ended that way.
    pub fn winner(&self) -> Option<Identity> {
        self.winner
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn boards(&self) -> &BoardRegistry {
        &self.registry
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events from index `from` onward; empty if `from` is past the end.
    pub fn events_since(&self, from: usize) -> &[Event] {
        self.events.get(from..).unwrap_or(&[])
    }

    /// Accepted actions in the order they were applied.
    pub fn history(&self) -> &[Action] {
        &self.history
    }
}
