//! # Arena Server Library
//!
//! This library implements the authoritative state engine for a room-based
//! multiplayer arena game. It keeps the canonical account of every room's
//! players, collectibles, and obstacles, applies client-reported actions in
//! arrival order, and tells exactly the right connections about each change.
//!
//! ## Core Responsibilities
//!
//! ### Room-Scoped Authority
//! Every room owns its state outright: who is in it, their scores and life
//! state, which collectibles are up for grabs, and the obstacle layout.
//! Scoring decisions (kill bonuses, score theft, pickup credit) are made
//! here and are final; clients only report what they observed.
//!
//! ### Membership Lifecycle
//! Rooms are created on first join and torn down when the last player
//! leaves. A connection lives in at most one room at a time, and joining a
//! new room implies leaving the old one. Disconnects and timeouts funnel
//! through the same departure path as explicit leaves.
//!
//! ### Scoped Notification
//! Every state change is announced to precisely the connections that
//! should hear it: the whole room for kills, respawns, and collectible
//! changes; everyone but the originator for movement and shots; just the
//! joiner for initial state synchronization.
//!
//! ## Architecture Design
//!
//! ### One Task Per Room
//! Each room runs as an independent async task consuming typed commands
//! from an unbounded queue. Commands for the same room are applied strictly
//! in arrival order with no locking, while separate rooms proceed in
//! parallel. Timed work (respawns, collectible repopulation) is scheduled
//! as a delayed command carrying only ids, and revalidated on arrival so a
//! stale timer is a no-op.
//!
//! ### UDP-Based Communication
//! Clients exchange small bincode-encoded event datagrams with the server.
//! The transport translates source addresses to stable connection ids on
//! the way in and resolves ids back to addresses on the way out, so room
//! logic never touches a socket.
//!
//! ## Module Organization
//!
//! ### Room Engine (`room`, `registry`, `router`)
//! The command loop over one room's state, the registry that creates,
//! finds, and tears down room tasks, and the delivery fan-out that turns
//! room decisions into addressed outbound events.
//!
//! ### Game Rules (`combat`, `collectibles`, `obstacles`, `placement`)
//! Hit validation with score theft, the per-room collectible field with
//! deficit-based repopulation, the deterministic obstacle layout, and
//! rejection-sampled placement of spawned objects.
//!
//! ### Transport (`network`, `connections`)
//! UDP socket management, datagram decoding, connection liveness with
//! timeout cleanup, and the outbound sender that drains the delivery queue.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind the transport and keep 10 collectibles per room
//!     let mut server = Server::new("127.0.0.1:8080", 10).await?;
//!
//!     // Run the main loop, which:
//!     // - decodes datagrams into client events
//!     // - routes room-scoped commands to the owning room task
//!     // - drains room deliveries back onto the socket
//!     // - drops connections that go silent
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod collectibles;
pub mod combat;
pub mod connections;
pub mod network;
pub mod obstacles;
pub mod placement;
pub mod registry;
pub mod room;
pub mod router;
pub mod utils;
