use crate::{CELL_COUNT, Grid, Mark};

/// Every winning triple, in scan order: rows top to bottom, columns left
/// to right, then the main and anti diagonal.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of inspecting a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No completed line and at least one empty cell.
    Undecided,
    /// `mark` occupies every cell of `line`.
    Win { mark: Mark, line: [usize; 3] },
    /// Every cell is filled and no line is complete.
    Draw,
}

impl Outcome {
    /// `true` for a win or a draw.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Undecided)
    }
}

/// `true` iff `0 <= index < 9` and that cell is empty.
///
/// `index` is signed so that whatever a client sent can be checked
/// without a lossy conversion first.
pub fn is_legal_move(grid: &Grid, index: i64) -> bool {
    match usize::try_from(index) {
        Ok(i) if i < CELL_COUNT => grid.get(i).is_none(),
        _ => false,
    }
}

/// Scans [`WINNING_LINES`] in order and reports the first complete line.
///
/// Boards with two complete lines cannot arise from alternating single
/// moves, but any 9-cell grid is accepted; the first match in scan order
/// wins.
pub fn detect_outcome(grid: &Grid) -> Outcome {
    for line in WINNING_LINES {
        let [a, b, c] = line;
        if let Some(mark) = grid.get(a) {
            if grid.get(b) == Some(mark) && grid.get(c) == Some(mark) {
                return Outcome::Win { mark, line };
            }
        }
    }

    if grid.is_full() {
        Outcome::Draw
    } else {
        Outcome::Undecided
    }
}
