//! UDP transport and the main server loop.
//!
//! The transport turns datagrams into room commands and deliveries back into
//! datagrams. It knows addresses and connection ids; everything it hands to
//! the room layer is already translated, so rooms never see a socket.

use crate::connections::ConnectionTable;
use crate::registry::RoomRegistry;
use crate::room::{CollectTrigger, RoomCommand};
use crate::router::Delivery;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};

/// How long a connection may stay silent before it is dropped.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages sent from transport tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    EventReceived {
        event: ClientEvent,
        addr: SocketAddr,
    },
    ConnectionTimeout {
        connection: u32,
    },
}

/// Main server coordinating the UDP transport and the room registry
pub struct Server {
    socket: Arc<UdpSocket>,
    connections: Arc<RwLock<ConnectionTable>>,
    registry: RoomRegistry,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<Delivery>,
    outbound_rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Server {
    pub async fn new(
        addr: &str,
        collectible_target: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            connections: Arc::new(RwLock::new(ConnectionTable::new())),
            registry: RoomRegistry::new(outbound_tx.clone(), collectible_target),
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx,
        })
    }

    /// The address the socket actually bound to. Useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming datagrams
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(event) = deserialize::<ClientEvent>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::EventReceived { event, addr })
                            {
                                error!("Failed to send event to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize datagram from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving datagram: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that drains the delivery queue, resolving connection ids
    /// to addresses at send time
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let connections = Arc::clone(&self.connections);
        let mut outbound_rx = std::mem::replace(&mut self.outbound_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(delivery) = outbound_rx.recv().await {
                let data = match serialize(&delivery.event) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("Failed to serialize event: {}", e);
                        continue;
                    }
                };

                let addrs: Vec<(u32, Option<SocketAddr>)> = {
                    let connections_guard = connections.read().await;
                    delivery
                        .targets
                        .iter()
                        .map(|id| (*id, connections_guard.addr_of(*id)))
                        .collect()
                };

                for (connection, addr) in addrs {
                    match addr {
                        Some(addr) => {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to connection {}: {}", connection, e);
                            }
                        }
                        // The connection went away between queueing and
                        // sending.
                        None => debug!("Skipping delivery to stale connection {}", connection),
                    }
                }
            }
        });
    }

    /// Spawns task that monitors connection timeouts
    fn spawn_timeout_checker(&self) {
        let connections = Arc::clone(&self.connections);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut connections_guard = connections.write().await;
                    connections_guard.check_timeouts(CONNECTION_TIMEOUT)
                };

                for connection in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ConnectionTimeout { connection })
                    {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_event_impl(
        socket: &UdpSocket,
        event: &ServerEvent,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(event)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    /// Queues an event for a single connection through the delivery path.
    fn queue_event(&self, connection: u32, event: ServerEvent) {
        if let Err(e) = self.outbound_tx.send(Delivery {
            targets: vec![connection],
            event,
        }) {
            error!("Failed to queue event for sending: {}", e);
        }
    }

    /// Resolves the sender of a room-scoped event, refreshing its liveness.
    /// Unknown addresses are dropped: everything except Join and Ping
    /// requires an established connection.
    async fn known_connection(&self, addr: SocketAddr) -> Option<u32> {
        let mut connections = self.connections.write().await;
        match connections.find_by_addr(addr) {
            Some(connection) => {
                connections.touch(connection);
                Some(connection)
            }
            None => {
                warn!("Dropping event from unknown address {}", addr);
                None
            }
        }
    }

    /// Translates one decoded event into connection and room updates
    async fn handle_event(&mut self, event: ClientEvent, addr: SocketAddr) {
        match event {
            ClientEvent::Join { room, name, color } => {
                let connection = {
                    let mut connections = self.connections.write().await;
                    connections.register(addr)
                };
                self.queue_event(connection, ServerEvent::Connected { connection });
                self.registry.join(&room, connection, name, color);
            }

            ClientEvent::Move {
                room,
                position,
                velocity,
            } => {
                if let Some(connection) = self.known_connection(addr).await {
                    self.registry.route(
                        &room,
                        RoomCommand::Move {
                            connection,
                            position,
                            velocity,
                        },
                    );
                }
            }

            ClientEvent::Shoot {
                room,
                direction,
                position,
            } => {
                if let Some(connection) = self.known_connection(addr).await {
                    self.registry.route(
                        &room,
                        RoomCommand::Shoot {
                            connection,
                            direction,
                            position,
                        },
                    );
                }
            }

            ClientEvent::Hit {
                room,
                shooter,
                target,
            } => {
                // Hit reports name both parties in the payload; the sender
                // only has to be an established connection.
                if self.known_connection(addr).await.is_some() {
                    self.registry
                        .route(&room, RoomCommand::Hit { shooter, target });
                }
            }

            ClientEvent::CollectByProjectile { room, object } => {
                if let Some(connection) = self.known_connection(addr).await {
                    self.registry.route(
                        &room,
                        RoomCommand::Collect {
                            connection,
                            object,
                            trigger: CollectTrigger::Projectile,
                        },
                    );
                }
            }

            ClientEvent::CollectByProximity { room, resource } => {
                if let Some(connection) = self.known_connection(addr).await {
                    self.registry.route(
                        &room,
                        RoomCommand::Collect {
                            connection,
                            object: resource,
                            trigger: CollectTrigger::Proximity,
                        },
                    );
                }
            }

            ClientEvent::Leave => {
                if let Some(connection) = self.known_connection(addr).await {
                    self.registry.leave(connection);
                }
            }

            ClientEvent::Ping { nonce } => {
                // Pings also serve bare liveness probes, so the reply goes
                // straight back to the source address.
                {
                    let mut connections = self.connections.write().await;
                    if let Some(connection) = connections.find_by_addr(addr) {
                        connections.touch(connection);
                    }
                }
                if let Err(e) =
                    Self::send_event_impl(&self.socket, &ServerEvent::Pong { nonce }, addr).await
                {
                    error!("Failed to answer ping from {}: {}", addr, e);
                }
            }
        }
    }

    /// A silent connection is treated as if it had left its room.
    fn handle_timeout(&mut self, connection: u32) {
        info!("Connection {} timed out", connection);
        if let Some(room) = self.registry.leave(connection) {
            debug!("Removed timed-out connection {} from room {}", connection, room);
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::EventReceived { event, addr } => {
                    self.handle_event(event, addr).await;
                }
                ServerMessage::ConnectionTimeout { connection } => {
                    self.handle_timeout(connection);
                }
            }
        }

        info!("Server shutting down");
        Ok(())
    }
}
