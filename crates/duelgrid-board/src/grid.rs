use serde::{Deserialize, Serialize};

use crate::Mark;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// A 3x3 board stored row-major. Each cell is empty (`None`) or holds a mark.
///
/// Serializes as a plain 9-element array of `"X"`, `"O"` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid([Option<Mark>; CELL_COUNT]);

impl Grid {
    /// An all-empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a grid from raw cells. Handy for tests and replays.
    pub fn from_cells(cells: [Option<Mark>; CELL_COUNT]) -> Self {
        Self(cells)
    }

    /// Returns the mark at `index`, or `None` if the cell is empty or the
    /// index is off the board.
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    /// Writes `mark` into the cell at `index`.
    ///
    /// Callers check [`is_legal_move`](crate::is_legal_move) first; this
    /// does not re-validate.
    ///
    /// # Panics
    /// Panics if `index >= CELL_COUNT`.
    pub fn place(&mut self, index: usize, mark: Mark) {
        self.0[index] = Some(mark);
    }

    /// Raw view of every cell.
    pub fn cells(&self) -> &[Option<Mark>; CELL_COUNT] {
        &self.0
    }

    /// `true` once no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// `true` if no cell has been played.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}
