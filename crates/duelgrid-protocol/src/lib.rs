//! Wire protocol for Duelgrid.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`Request`], [`ClientEvent`], [`ServerEvent`],
//!   [`RoomSnapshot`], ...): the frames that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those frames are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! The protocol layer knows nothing about connections or room rules.
//!
//! ```text
//! Transport (bytes) → Protocol (Request / ServerEvent) → Gateway → Rooms
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ParticipantView, Reply, Request, RoomCode, RoomSnapshot, ServerEvent,
};
