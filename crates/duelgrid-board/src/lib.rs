//! Board rules for Duelgrid.
//!
//! Pure functions over a fixed 3x3 grid. Nothing in this crate holds state
//! between calls or does I/O; the room layer owns the grid and calls in
//! here to ask "may this cell be played?" and "is the game over?".
//!
//! ```text
//!  0 | 1 | 2
//!  ---------
//!  3 | 4 | 5
//!  ---------
//!  6 | 7 | 8
//! ```

mod grid;
mod mark;
mod rules;

pub use grid::{CELL_COUNT, Grid};
pub use mark::Mark;
pub use rules::{Outcome, WINNING_LINES, detect_outcome, is_legal_move};
