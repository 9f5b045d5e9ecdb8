//! The gateway: routes decoded requests into the room system and fans the
//! results out to connections.
//!
//! Every connection registers an outbound channel on connect. The gateway
//! never touches a socket; it pushes [`ServerEvent`]s onto those channels
//! and each connection's writer task drains its own. Pushing never blocks,
//! so a broadcast finishes while the caller still holds the gateway lock
//! and two state changes can never reach clients out of order.

use std::collections::HashMap;
use std::time::Instant;

use duelgrid_protocol::{ClientEvent, ProtocolError, Reply, Request, ServerEvent};
use duelgrid_room::{RoomManager, RoomUpdate};
use duelgrid_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::server::PROTOCOL_VERSION;

/// Outbound half of a connection's event queue.
pub type ClientSender = mpsc::UnboundedSender<ServerEvent>;

/// Shared coordinator state: the rooms plus a sender per live connection.
pub struct Gateway {
    rooms: RoomManager,
    clients: HashMap<ConnectionId, ClientSender>,
    started: Instant,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            rooms: RoomManager::new(),
            clients: HashMap::new(),
            started: Instant::now(),
        }
    }

    /// Registers a new connection and greets it.
    pub fn connect(&mut self, connection: ConnectionId, sender: ClientSender) {
        let _ = sender.send(ServerEvent::Welcome {
            connection: connection.into_inner(),
            protocol_version: PROTOCOL_VERSION,
        });
        self.clients.insert(connection, sender);
        tracing::info!(%connection, clients = self.clients.len(), "client connected");
    }

    /// Applies one request from `connection`.
    ///
    /// Join and move are acknowledged to the sender first; when they
    /// change a room, the new state follows to everyone seated there.
    /// Reset is broadcast only.
    pub fn handle(&mut self, connection: ConnectionId, request: Request) {
        let Request { seq, event } = request;
        match event {
            ClientEvent::Join { room, player_name } => {
                match self.rooms.join(connection, &room, &player_name) {
                    Ok(joined) => {
                        self.ack(
                            connection,
                            seq,
                            Reply::Joined {
                                symbol: joined.mark,
                                player_name: joined.player_name,
                            },
                        );
                        self.broadcast(joined.update);
                    }
                    Err(e) => {
                        tracing::debug!(%connection, room = %room, error = %e, "join refused");
                        self.ack(connection, seq, Reply::failed(e));
                    }
                }
            }

            ClientEvent::Move { room, index } => {
                match self.rooms.make_move(connection, &room, index) {
                    Ok(update) => {
                        self.ack(connection, seq, Reply::moved());
                        self.broadcast(update);
                    }
                    Err(e) => {
                        tracing::debug!(%connection, room = %room, ?index, error = %e, "move refused");
                        self.ack(connection, seq, Reply::failed(e));
                    }
                }
            }

            ClientEvent::Reset { room } => match self.rooms.reset(&room) {
                Some(update) => self.broadcast(update),
                None => tracing::debug!(%connection, room = %room, "reset of unknown room ignored"),
            },

            ClientEvent::Ping { client_time } => {
                let server_time = self.started.elapsed().as_millis() as u64;
                self.send(connection, ServerEvent::Pong { client_time, server_time });
            }
        }
    }

    /// Tells `connection` its last frame could not be decoded.
    pub fn reject_frame(&self, connection: ConnectionId, error: &ProtocolError) {
        self.send(
            connection,
            ServerEvent::Error {
                message: format!("invalid frame: {error}"),
            },
        );
    }

    /// Forgets `connection` and frees its seat, telling whoever is left.
    ///
    /// Idempotent.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        if self.clients.remove(&connection).is_none() {
            return;
        }
        if let Some(update) = self.rooms.disconnect(connection) {
            self.broadcast(update);
        }
        tracing::info!(%connection, clients = self.clients.len(), "client disconnected");
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Number of registered connections.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    fn ack(&self, connection: ConnectionId, seq: u64, reply: Reply) {
        self.send(connection, ServerEvent::Ack { seq, reply });
    }

    fn broadcast(&self, update: RoomUpdate) {
        let RoomUpdate { snapshot, recipients } = update;
        for connection in recipients {
            self.send(connection, ServerEvent::State(snapshot.clone()));
        }
    }

    // A closed receiver means the writer already stopped; its guard will
    // call `disconnect` shortly.
    fn send(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.clients.get(&connection) {
            if sender.send(event).is_err() {
                tracing::trace!(%connection, "dropping event for closing connection");
            }
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelgrid_board::Mark;
    use duelgrid_protocol::RoomSnapshot;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// Connects `id` and discards the welcome.
    fn attach(gateway: &mut Gateway, id: u64) -> UnboundedReceiver<ServerEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.connect(conn(id), tx);
        assert!(matches!(rx.try_recv(), Ok(ServerEvent::Welcome { .. })));
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn request(seq: u64, event: ClientEvent) -> Request {
        Request { seq, event }
    }

    fn join(room: &str, name: &str) -> ClientEvent {
        ClientEvent::Join { room: room.into(), player_name: name.into() }
    }

    fn mv(room: &str, index: i64) -> ClientEvent {
        ClientEvent::Move { room: room.into(), index: Some(index) }
    }

    fn state(event: &ServerEvent) -> &RoomSnapshot {
        match event {
            ServerEvent::State(snapshot) => snapshot,
            other => panic!("expected state, got {other:?}"),
        }
    }

    #[test]
    fn test_welcome_carries_connection_and_version() {
        let mut gateway = Gateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.connect(conn(42), tx);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Welcome { connection: 42, protocol_version: PROTOCOL_VERSION }
        );
        assert_eq!(gateway.client_count(), 1);
    }

    #[test]
    fn test_join_acks_before_state() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);

        gateway.handle(conn(1), request(1, join("R1", "Ann")));

        let events = drain(&mut ann);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ServerEvent::Ack {
                seq: 1,
                reply: Reply::Joined { symbol: Mark::X, player_name: "Ann".into() }
            }
        );
        assert_eq!(state(&events[1]).participants.len(), 1);
    }

    #[test]
    fn test_second_join_broadcasts_to_both() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        drain(&mut ann);

        gateway.handle(conn(2), request(1, join("R1", "Bob")));

        let to_ann = drain(&mut ann);
        assert_eq!(to_ann.len(), 1, "Ann only sees the new state");
        assert_eq!(state(&to_ann[0]).participants.len(), 2);

        let to_bob = drain(&mut bob);
        assert!(matches!(
            to_bob[0],
            ServerEvent::Ack { reply: Reply::Joined { symbol: Mark::O, .. }, .. }
        ));
        assert_eq!(state(&to_bob[1]), state(&to_ann[0]));
    }

    #[test]
    fn test_refused_join_is_acked_only_to_sender() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        let mut cat = attach(&mut gateway, 3);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(2), request(1, join("R1", "Bob")));
        drain(&mut ann);
        drain(&mut bob);

        gateway.handle(conn(3), request(9, join("R1", "Cat")));

        assert_eq!(
            drain(&mut cat),
            vec![ServerEvent::Ack {
                seq: 9,
                reply: Reply::failed("Room is full! Try another one.")
            }]
        );
        assert!(drain(&mut ann).is_empty());
        assert!(drain(&mut bob).is_empty());
    }

    #[test]
    fn test_blank_join_fields_are_refused() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);

        gateway.handle(conn(1), request(1, join("", "Ann")));
        gateway.handle(conn(1), request(2, join("R1", "   ")));

        let expected = Reply::failed("Room ID and Player Name are required!");
        assert_eq!(
            drain(&mut ann),
            vec![
                ServerEvent::Ack { seq: 1, reply: expected.clone() },
                ServerEvent::Ack { seq: 2, reply: expected },
            ]
        );
        assert_eq!(gateway.rooms().room_count(), 0);
    }

    #[test]
    fn test_move_acks_then_broadcasts() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(2), request(1, join("R1", "Bob")));
        drain(&mut ann);
        drain(&mut bob);

        gateway.handle(conn(1), request(2, mv("R1", 4)));

        let to_ann = drain(&mut ann);
        assert_eq!(to_ann[0], ServerEvent::Ack { seq: 2, reply: Reply::moved() });
        assert_eq!(state(&to_ann[1]).grid.get(4), Some(Mark::X));
        let to_bob = drain(&mut bob);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(state(&to_bob[0]).turn, Mark::O);
    }

    #[test]
    fn test_refused_move_broadcasts_nothing() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(2), request(1, join("R1", "Bob")));
        drain(&mut ann);
        drain(&mut bob);

        gateway.handle(conn(2), request(5, mv("R1", 0)));

        assert_eq!(
            drain(&mut bob),
            vec![ServerEvent::Ack { seq: 5, reply: Reply::failed("Wait for your turn!") }]
        );
        assert!(drain(&mut ann).is_empty());
    }

    #[test]
    fn test_move_without_index_is_acked_as_invalid() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        drain(&mut ann);

        gateway.handle(
            conn(1),
            request(5, ClientEvent::Move { room: "R1".into(), index: None }),
        );

        assert_eq!(
            drain(&mut ann),
            vec![ServerEvent::Ack { seq: 5, reply: Reply::failed("Invalid move!") }]
        );
    }

    #[test]
    fn test_reset_is_broadcast_without_ack() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut cat = attach(&mut gateway, 3);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(1), request(2, mv("R1", 0)));
        drain(&mut ann);

        // Anyone may reset, seated or not.
        gateway.handle(conn(3), request(7, ClientEvent::Reset { room: "R1".into() }));

        let to_ann = drain(&mut ann);
        assert_eq!(to_ann.len(), 1);
        assert!(state(&to_ann[0]).grid.is_empty());
        assert!(drain(&mut cat).is_empty());
    }

    #[test]
    fn test_reset_of_unknown_room_is_silent() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        gateway.handle(conn(1), request(1, ClientEvent::Reset { room: "ghost".into() }));
        assert!(drain(&mut ann).is_empty());
        assert_eq!(gateway.rooms().room_count(), 0);
    }

    #[test]
    fn test_ping_is_answered_with_pong() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        gateway.handle(conn(1), request(0, ClientEvent::Ping { client_time: 123 }));
        assert!(matches!(
            drain(&mut ann)[..],
            [ServerEvent::Pong { client_time: 123, .. }]
        ));
    }

    #[test]
    fn test_disconnect_tells_remaining_player() {
        let mut gateway = Gateway::new();
        let mut ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(2), request(1, join("R1", "Bob")));
        drain(&mut ann);
        drain(&mut bob);

        gateway.disconnect(conn(1));

        let to_bob = drain(&mut bob);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(state(&to_bob[0]).participants.len(), 1);
        assert_eq!(gateway.client_count(), 1);

        gateway.disconnect(conn(1));
        assert!(drain(&mut bob).is_empty(), "second disconnect is a no-op");
    }

    #[test]
    fn test_disconnect_of_last_player_closes_room() {
        let mut gateway = Gateway::new();
        let _ann = attach(&mut gateway, 1);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));

        gateway.disconnect(conn(1));

        assert_eq!(gateway.rooms().room_count(), 0);
        assert_eq!(gateway.client_count(), 0);
    }

    #[test]
    fn test_closed_receiver_does_not_break_broadcast() {
        let mut gateway = Gateway::new();
        let ann = attach(&mut gateway, 1);
        let mut bob = attach(&mut gateway, 2);
        gateway.handle(conn(1), request(1, join("R1", "Ann")));
        gateway.handle(conn(2), request(1, join("R1", "Bob")));
        drop(ann);
        drain(&mut bob);

        gateway.handle(conn(1), request(2, mv("R1", 4)));

        assert_eq!(state(&drain(&mut bob)[0]).grid.get(4), Some(Mark::X));
    }
}
