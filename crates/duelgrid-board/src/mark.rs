use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two symbols a participant plays as.
///
/// `X` is the first mark: it is handed to the first participant of a
/// fresh room and always moves first. Serializes as `"X"` / `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark that opens every game and every reset.
    pub const FIRST: Mark = Mark::X;

    /// Both marks in seating order.
    pub const ALL: [Mark; 2] = [Mark::X, Mark::O];

    /// Returns the other mark.
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Seat index of this mark: `X` is 0, `O` is 1.
    pub fn seat(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_flips() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.opponent(), Mark::X);
    }

    #[test]
    fn test_first_mark_is_x_in_seat_zero() {
        assert_eq!(Mark::FIRST, Mark::X);
        assert_eq!(Mark::FIRST.seat(), 0);
        assert_eq!(Mark::O.seat(), 1);
    }

    #[test]
    fn test_serializes_as_bare_letter() {
        assert_eq!(serde_json::to_string(&Mark::X).unwrap(), "\"X\"");
        let m: Mark = serde_json::from_str("\"O\"").unwrap();
        assert_eq!(m, Mark::O);
    }
}
