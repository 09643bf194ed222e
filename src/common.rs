//! Common types for the coordinator: grid points, player identities and errors.

use core::fmt;
use core::str::FromStr;

/// A single cell on a grid. The coordinator never bounds-checks coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Opaque 20-byte account identifier of a participant.
///
/// The all-zero value is reserved as [`Identity::NULL`] and means "nobody".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity([u8; 20]);

impl Identity {
    /// Sentinel for "no active player".
    pub const NULL: Identity = Identity([0; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::NULL
    }
}

/// Places the value big-endian in the trailing eight bytes.
impl From<u64> for Identity {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

/// Error parsing an [`Identity`] from its hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityParseError {
    /// Expected 40 hex digits after the optional `0x` prefix.
    InvalidLength(usize),
    /// Non-hex character at the given offset.
    InvalidDigit(usize),
}

impl fmt::Display for IdentityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityParseError::InvalidLength(n) => {
                write!(f, "expected 40 hex digits, got {}", n)
            }
            IdentityParseError::InvalidDigit(at) => write!(f, "invalid hex digit at offset {}", at),
        }
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s)
            .as_bytes();
        if digits.len() != 40 {
            return Err(IdentityParseError::InvalidLength(digits.len()));
        }
        let mut bytes = [0u8; 20];
        for (i, pair) in digits.chunks(2).enumerate() {
            let hi = hex_value(pair[0]).ok_or(IdentityParseError::InvalidDigit(i * 2))?;
            let lo = hex_value(pair[1]).ok_or(IdentityParseError::InvalidDigit(i * 2 + 1))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Reasons an operation on a session is rejected. A rejected operation
/// leaves the session untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameError {
    /// Registration supplied the wrong number of ship cells.
    InvalidShipCount { expected: usize, actual: usize },
    /// Registration listed the same cell twice.
    DuplicateCell(Point),
    /// The null identity cannot take part in a game.
    ReservedIdentity,
    /// Both seats are already taken.
    SessionFull,
    /// The caller already registered a board in this session.
    AlreadyRegistered(Identity),
    /// The operation needs a game in progress.
    GameNotStarted,
    /// Shot submitted out of turn.
    NotActivePlayer { caller: Identity, active: Identity },
    /// Cell was already hit and the session rejects repeated shots.
    AlreadyHit(Point),
    /// No board registered for this identity.
    UnknownPlayer(Identity),
    /// Player index outside the registration order.
    OutOfRange(usize),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidShipCount { expected, actual } => write!(
                f,
                "Amount of cells do not match the expected: expected {}, got {}",
                expected, actual
            ),
            GameError::DuplicateCell(p) => write!(f, "Cell {} is declared more than once", p),
            GameError::ReservedIdentity => write!(f, "The null identity cannot register a board"),
            GameError::SessionFull => write!(f, "Session already has two players"),
            GameError::AlreadyRegistered(id) => write!(f, "Player {} already registered", id),
            GameError::GameNotStarted => write!(f, "Game has not started"),
            GameError::NotActivePlayer { caller, active } => write!(
                f,
                "Current player is not active: {} tried to shoot, {} has the turn",
                caller, active
            ),
            GameError::AlreadyHit(p) => write!(f, "Cell {} was already hit", p),
            GameError::UnknownPlayer(id) => write!(f, "Unknown player {}", id),
            GameError::OutOfRange(i) => write!(f, "Player index {} is out of range", i),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}
