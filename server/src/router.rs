//! Outbound event fan-out for one room.
//!
//! Rooms decide *who* hears an event; the transport decides *how* it gets
//! there. Each delivery pairs a server event with the connection ids it is
//! meant for, and the network layer resolves those ids to socket addresses
//! when it drains the queue.

use log::error;
use shared::ServerEvent;
use tokio::sync::mpsc;

/// One event addressed to a set of connections.
#[derive(Debug)]
pub struct Delivery {
    pub targets: Vec<u32>,
    pub event: ServerEvent,
}

#[derive(Debug, Clone)]
pub struct RoomRouter {
    room_id: String,
    sink: mpsc::UnboundedSender<Delivery>,
}

impl RoomRouter {
    pub fn new(room_id: String, sink: mpsc::UnboundedSender<Delivery>) -> Self {
        RoomRouter { room_id, sink }
    }

    /// Addresses a single connection.
    pub fn send_to(&self, connection: u32, event: ServerEvent) {
        self.deliver(vec![connection], event);
    }

    /// Addresses every listed member, originator included.
    pub fn broadcast(&self, members: impl IntoIterator<Item = u32>, event: ServerEvent) {
        self.deliver(members.into_iter().collect(), event);
    }

    /// Addresses every listed member except `origin`. Pair with `send_to`
    /// when the originator needs an echo.
    pub fn broadcast_except(
        &self,
        members: impl IntoIterator<Item = u32>,
        origin: u32,
        event: ServerEvent,
    ) {
        self.deliver(
            members.into_iter().filter(|id| *id != origin).collect(),
            event,
        );
    }

    fn deliver(&self, targets: Vec<u32>, event: ServerEvent) {
        if targets.is_empty() {
            return;
        }
        if let Err(e) = self.sink.send(Delivery { targets, event }) {
            error!("Failed to queue delivery for room {}: {}", self.room_id, e);
        }
    }
}
