//! Connection tracking for the UDP transport
//!
//! This module owns the server-side view of every connected client, including:
//! - Connection identity (stable id per remote address)
//! - Address resolution for outbound deliveries
//! - Liveness tracking and timeout-based cleanup
//!
//! Connections are a transport concern: rooms only ever see connection ids,
//! and this table is what turns those ids back into socket addresses.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected client as the transport sees it
///
/// Tracks the remote address responses go to and the last time any datagram
/// arrived from it. Ids are assigned once per address and stay stable for as
/// long as the connection lives.
#[derive(Debug)]
pub struct Connection {
    /// Unique connection identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any datagram from this address
    pub last_seen: Instant,
}

impl Connection {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Marks the connection as active right now
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Returns true if no datagrams have arrived within `timeout`,
    /// indicating a likely disconnect
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Bidirectional table of connections, indexed by id and by address
///
/// Incoming datagrams carry only a source address; outgoing deliveries carry
/// only connection ids. The table answers both lookups in constant time and
/// is the single place where ids are minted.
pub struct ConnectionTable {
    /// Connections indexed by their unique id
    connections: HashMap<u32, Connection>,
    /// Reverse index from remote address to connection id
    by_addr: HashMap<SocketAddr, u32>,
    /// Next available connection id
    next_id: u32,
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTable {
    /// Creates an empty table. Ids start at 1 and increment per connection.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            by_addr: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers an address and returns its connection id
    ///
    /// A fresh address mints a new id and logs the connection; an address
    /// that is already registered keeps its existing id and only has its
    /// activity refreshed. Safe to call on every Join datagram.
    pub fn register(&mut self, addr: SocketAddr) -> u32 {
        if let Some(id) = self.by_addr.get(&addr) {
            let id = *id;
            self.touch(id);
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;

        info!("Connection {} established from {}", id, addr);
        self.connections.insert(id, Connection::new(id, addr));
        self.by_addr.insert(addr, id);
        id
    }

    /// Removes a connection and returns it, or `None` if it was already gone
    pub fn remove(&mut self, id: u32) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        self.by_addr.remove(&connection.addr);
        info!("Connection {} from {} closed", connection.id, connection.addr);
        Some(connection)
    }

    /// Finds the connection id registered for an address
    ///
    /// Used to associate incoming datagrams with existing connections.
    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.by_addr.get(&addr).copied()
    }

    /// Resolves a connection id to the address responses should go to
    pub fn addr_of(&self, id: u32) -> Option<SocketAddr> {
        self.connections.get(&id).map(|connection| connection.addr)
    }

    /// Refreshes the activity timestamp of a connection
    pub fn touch(&mut self, id: u32) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.touch();
        }
    }

    /// Removes every connection that has been silent longer than `timeout`
    ///
    /// Returns the removed ids so the caller can clean up whatever state
    /// still hangs off them, like room membership.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .connections
            .iter()
            .filter(|(_, connection)| connection.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for id in &timed_out {
            self.remove(*id);
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
