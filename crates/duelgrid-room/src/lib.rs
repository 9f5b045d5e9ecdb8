//! Room management for Duelgrid.
//!
//! Rooms are named by the players (a room code), created on first join and
//! dropped when the last participant disconnects. Each room referees one
//! two-player match using the rules in `duelgrid-board`.
//!
//! # Key types
//!
//! - [`RoomManager`]: the single entry point: join, move, reset, disconnect
//! - [`Room`]: one room's seats, board, turn, and result
//! - [`RoomStore`]: every active room, keyed by code
//! - [`ConnectionRegistry`]: which room each connection sits in
//! - [`RoomError`]: refusals, with the text shown to players
//!
//! Every operation is synchronous and returns a [`RoomUpdate`] describing
//! what to broadcast, so this crate can be exercised without a network.

mod error;
mod manager;
mod registry;
mod room;
mod store;

pub use error::RoomError;
pub use manager::{Joined, RoomManager, RoomUpdate};
pub use registry::ConnectionRegistry;
pub use room::{GameStatus, Participant, ROOM_CAPACITY, Room};
pub use store::RoomStore;
