//! Fixed game constants and per-session tunables.

/// Number of ship cells every board must declare at registration.
pub const EXPECTED_CELLS: usize = 20;

/// Number of participants in a session.
pub const PLAYER_COUNT: usize = 2;

/// How a shot at a cell that was already hit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeatShotPolicy {
    /// Every hit counts, including repeats at the same cell.
    #[default]
    Count,
    /// A repeated shot at a hit cell is rejected before any state change.
    Reject,
}

/// Options fixed for the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    pub repeat_shots: RepeatShotPolicy,
}

impl SessionConfig {
    /// Config that rejects repeated shots at already-hit cells.
    pub const fn dedupe_shots() -> Self {
        Self {
            repeat_shots: RepeatShotPolicy::Reject,
        }
    }
}
