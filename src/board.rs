//! Declared ship cells and hit counters for each registered player.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::Rng;

use crate::common::{GameError, Identity, Point};
use crate::config::{EXPECTED_CELLS, PLAYER_COUNT};

/// One player's declared ship cells plus the running hit counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    owner: Identity,
    cells: BTreeSet<Point>,
    hit_cells: u32,
    hits: BTreeSet<Point>,
}

impl Board {
    /// Validate `cells` and build a fresh board for `owner`.
    ///
    /// Exactly [`EXPECTED_CELLS`] pairwise distinct points are required.
    pub fn new(owner: Identity, cells: &[Point]) -> Result<Self, GameError> {
        if cells.len() != EXPECTED_CELLS {
            return Err(GameError::InvalidShipCount {
                expected: EXPECTED_CELLS,
                actual: cells.len(),
            });
        }
        let mut set = BTreeSet::new();
        for &p in cells {
            if !set.insert(p) {
                return Err(GameError::DuplicateCell(p));
            }
        }
        Ok(Self {
            owner,
            cells: set,
            hit_cells: 0,
            hits: BTreeSet::new(),
        })
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Declared ship cells in ascending order.
    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    /// Whether `p` is one of the declared ship cells.
    pub fn occupies(&self, p: Point) -> bool {
        self.cells.contains(&p)
    }

    /// Number of hits taken, repeats included.
    pub fn hit_cells(&self) -> u32 {
        self.hit_cells
    }

    /// Distinct cells that have been hit at least once.
    pub fn hit_points(&self) -> &BTreeSet<Point> {
        &self.hits
    }

    pub fn was_hit(&self, p: Point) -> bool {
        self.hits.contains(&p)
    }

    /// `true` once the hit counter reaches the board size.
    pub fn is_sunk(&self) -> bool {
        self.hit_cells as usize == EXPECTED_CELLS
    }

    fn record_hit(&mut self, p: Point) {
        debug_assert!((self.hit_cells as usize) < EXPECTED_CELLS);
        self.hit_cells += 1;
        self.hits.insert(p);
    }
}

/// Boards of both seats, kept in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardRegistry {
    boards: Vec<Board>,
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self { boards: Vec::new() }
    }

    /// Number of registered boards.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.boards.len() == PLAYER_COUNT
    }

    pub fn is_registered(&self, id: Identity) -> bool {
        self.boards.iter().any(|b| b.owner == id)
    }

    /// Registered identities in play order.
    pub fn players(&self) -> impl Iterator<Item = Identity> + '_ {
        self.boards.iter().map(|b| b.owner)
    }

    /// Append a validated board. Callers check capacity and ownership first.
    pub(crate) fn insert(&mut self, board: Board) {
        debug_assert!(!self.is_full());
        debug_assert!(!self.is_registered(board.owner));
        self.boards.push(board);
    }

    pub fn board_of(&self, id: Identity) -> Result<&Board, GameError> {
        self.boards
            .iter()
            .find(|b| b.owner == id)
            .ok_or(GameError::UnknownPlayer(id))
    }

    fn board_of_mut(&mut self, id: Identity) -> Result<&mut Board, GameError> {
        self.boards
            .iter_mut()
            .find(|b| b.owner == id)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Count one hit at `p` against `id`'s board.
    pub(crate) fn record_hit(&mut self, id: Identity, p: Point) -> Result<(), GameError> {
        self.board_of_mut(id)?.record_hit(p);
        Ok(())
    }

    /// `false` for identities that never registered.
    pub fn is_fully_sunk(&self, id: Identity) -> bool {
        self.board_of(id).map(Board::is_sunk).unwrap_or(false)
    }

    pub fn player_at(&self, index: usize) -> Result<Identity, GameError> {
        self.boards
            .get(index)
            .map(|b| b.owner)
            .ok_or(GameError::OutOfRange(index))
    }

    pub fn hit_count(&self, id: Identity) -> Result<u32, GameError> {
        self.board_of(id).map(Board::hit_cells)
    }

    /// The other registered identity.
    pub fn opponent_of(&self, id: Identity) -> Result<Identity, GameError> {
        self.players()
            .find(|&p| p != id)
            .ok_or(GameError::UnknownPlayer(id))
    }
}

/// Sample [`EXPECTED_CELLS`] distinct points inside a `width` x `height` grid.
///
/// Returns `None` when the grid has fewer cells than a board needs.
pub fn random_cells<R: Rng>(rng: &mut R, width: u32, height: u32) -> Option<Vec<Point>> {
    if (width as u64) * (height as u64) < EXPECTED_CELLS as u64 {
        return None;
    }
    let mut picked = BTreeSet::new();
    while picked.len() < EXPECTED_CELLS {
        let x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        picked.insert(Point::new(x, y));
    }
    Some(picked.into_iter().collect())
}
