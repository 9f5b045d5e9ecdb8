//! A single room: two seats, one board, and the rules that referee them.
//!
//! Everything here is a synchronous state transition. Nothing in this
//! module sends to a connection; callers take a [`RoomSnapshot`] after a
//! successful transition and broadcast it themselves.

use duelgrid_board::{Grid, Mark, Outcome, detect_outcome, is_legal_move};
use duelgrid_protocol::{ParticipantView, RoomCode, RoomSnapshot};
use duelgrid_transport::ConnectionId;

use crate::RoomError;

/// Seats per room.
pub const ROOM_CAPACITY: usize = 2;

/// A connection seated in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection: ConnectionId,
    pub name: String,
    pub mark: Mark,
    /// Position in the room's join sequence (1 for the first join ever).
    pub joined: u64,
}

/// Where the current game stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won {
        winner: String,
        mark: Mark,
        line: [usize; 3],
    },
    Drawn,
}

impl GameStatus {
    /// `true` once the game was won or drawn. No moves are accepted until
    /// the room is reset.
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Authoritative state of one room.
///
/// Seats are indexed by mark (`seats[Mark::X.seat()]` holds X), so two
/// participants can never share a mark.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    seats: [Option<Participant>; ROOM_CAPACITY],
    grid: Grid,
    turn: Mark,
    status: GameStatus,
    /// Join-order counter. Bumped on every successful join, never reset.
    joins: u64,
}

impl Room {
    /// A fresh room: nobody seated, empty board, X to move.
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            seats: [None, None],
            grid: Grid::new(),
            turn: Mark::FIRST,
            status: GameStatus::InProgress,
            joins: 0,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Number of seated participants.
    pub fn len(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= ROOM_CAPACITY
    }

    /// Seats `connection` under `name` and returns the assigned mark.
    ///
    /// The mark is the first free seat in [`Mark::ALL`] order. In a fresh
    /// room that is exactly join order: first joiner X, second O. If a
    /// participant left, the newcomer inherits the vacated mark.
    pub fn join(&mut self, connection: ConnectionId, name: &str) -> Result<Mark, RoomError> {
        if name.trim().is_empty() {
            return Err(RoomError::Validation);
        }
        if self.participant(connection).is_some() {
            return Err(RoomError::AlreadySeated(connection, self.code.clone()));
        }

        let mark = Mark::ALL
            .into_iter()
            .find(|mark| self.seats[mark.seat()].is_none())
            .ok_or_else(|| RoomError::RoomFull(self.code.clone()))?;

        self.joins += 1;
        self.seats[mark.seat()] = Some(Participant {
            connection,
            name: name.to_owned(),
            mark,
            joined: self.joins,
        });
        Ok(mark)
    }

    /// Plays `index` for the participant on `connection`.
    ///
    /// Checks run in a fixed order: game over, seated, turn, legality. A
    /// rejected move leaves the grid, turn and status untouched. On
    /// success the mark is written, the turn flips, and the board is
    /// checked for a finished game. A missing index is an illegal move.
    pub fn make_move(
        &mut self,
        connection: ConnectionId,
        index: Option<i64>,
    ) -> Result<Outcome, RoomError> {
        if self.status.is_over() {
            return Err(RoomError::GameOver(self.code.clone()));
        }
        let mark = self
            .participant(connection)
            .map(|p| p.mark)
            .ok_or_else(|| RoomError::NotAParticipant(connection, self.code.clone()))?;
        if mark != self.turn {
            return Err(RoomError::Turn(connection, self.code.clone()));
        }
        let cell = match index {
            // Legal implies 0 <= i < 9.
            Some(i) if is_legal_move(&self.grid, i) => i as usize,
            _ => return Err(RoomError::IllegalMove { room: self.code.clone(), index }),
        };
        self.grid.place(cell, mark);
        self.turn = self.turn.opponent();

        let outcome = detect_outcome(&self.grid);
        match outcome {
            Outcome::Win { mark, line } => {
                let winner = self.seats[mark.seat()]
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                self.status = GameStatus::Won { winner, mark, line };
            }
            Outcome::Draw => self.status = GameStatus::Drawn,
            Outcome::Undecided => {}
        }
        Ok(outcome)
    }

    /// Clears the board, hands the move back to X, and forgets the result.
    /// Seats and marks are untouched.
    pub fn reset(&mut self) {
        self.grid = Grid::new();
        self.turn = Mark::FIRST;
        self.status = GameStatus::InProgress;
    }

    /// Unseats `connection`, returning who left. The board is left as is.
    pub fn remove(&mut self, connection: ConnectionId) -> Option<Participant> {
        self.seats
            .iter_mut()
            .find(|seat| seat.as_ref().is_some_and(|p| p.connection == connection))
            .and_then(Option::take)
    }

    /// The participant seated on `connection`, if any.
    pub fn participant(&self, connection: ConnectionId) -> Option<&Participant> {
        self.seats.iter().flatten().find(|p| p.connection == connection)
    }

    /// Seated participants in join order.
    pub fn participants(&self) -> Vec<&Participant> {
        let mut seated: Vec<&Participant> = self.seats.iter().flatten().collect();
        seated.sort_by_key(|p| p.joined);
        seated
    }

    /// Connections that receive this room's broadcasts.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.participants().iter().map(|p| p.connection).collect()
    }

    /// The state clients see.
    pub fn snapshot(&self) -> RoomSnapshot {
        let (winner, winning_line) = match &self.status {
            GameStatus::Won { winner, line, .. } => (Some(winner.clone()), Some(*line)),
            _ => (None, None),
        };
        RoomSnapshot {
            room: self.code.clone(),
            participants: self
                .participants()
                .into_iter()
                .map(|p| ParticipantView { name: p.name.clone(), mark: p.mark })
                .collect(),
            grid: self.grid,
            turn: self.turn,
            winner,
            draw: self.status == GameStatus::Drawn,
            winning_line,
        }
    }
}
