//! Room lifecycle and command routing.
//!
//! Each room runs as its own task that owns its state outright and consumes
//! commands from an unbounded queue, so commands for one room are applied
//! strictly in arrival order while different rooms proceed in parallel. The
//! registry tracks which room every connection is in, creates rooms on first
//! join, and tears them down when the last member leaves.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::{debug, error, info};
use shared::{REPOPULATE_DELAY_MS, RESPAWN_DELAY_MS};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::room::{Followup, RoomCommand, RoomState};
use crate::router::{Delivery, RoomRouter};

struct RoomHandle {
    commands: mpsc::UnboundedSender<RoomCommand>,
    members: HashSet<u32>,
}

pub struct RoomRegistry {
    rooms: HashMap<String, RoomHandle>,
    memberships: HashMap<u32, String>,
    outbound: mpsc::UnboundedSender<Delivery>,
    collectible_target: usize,
}

impl RoomRegistry {
    pub fn new(outbound: mpsc::UnboundedSender<Delivery>, collectible_target: usize) -> Self {
        RoomRegistry {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            outbound,
            collectible_target,
        }
    }

    /// Puts a connection into a room, creating the room on first join. A
    /// connection lives in at most one room, so joining a different room
    /// leaves the current one first. Re-joining the same room just makes the
    /// room resend its state.
    pub fn join(&mut self, room_id: &str, connection: u32, name: Option<String>, color: Option<u32>) {
        match self.memberships.get(&connection) {
            Some(current) if current == room_id => {}
            Some(_) => {
                self.leave(connection);
            }
            None => {}
        }

        let handle = self.rooms.entry(room_id.to_string()).or_insert_with(|| {
            info!("Creating room {}", room_id);
            spawn_room(
                room_id.to_string(),
                self.outbound.clone(),
                self.collectible_target,
            )
        });
        handle.members.insert(connection);
        self.memberships
            .insert(connection, room_id.to_string());

        if handle
            .commands
            .send(RoomCommand::Join {
                connection,
                name,
                color,
            })
            .is_err()
        {
            error!("Room {} task is gone, dropping join", room_id);
        }
    }

    /// Takes a connection out of its room, if any, and removes the room once
    /// nobody is left in it. Returns the room that was left.
    pub fn leave(&mut self, connection: u32) -> Option<String> {
        let room_id = self.memberships.remove(&connection)?;
        if let Some(handle) = self.rooms.get_mut(&room_id) {
            handle.members.remove(&connection);
            let _ = handle
                .commands
                .send(RoomCommand::Leave { connection });
            if handle.members.is_empty() {
                info!("Room {} is empty, removing it", room_id);
                self.rooms.remove(&room_id);
            }
        }
        Some(room_id)
    }

    /// Queues a gameplay command for a room. Commands for rooms that do not
    /// exist are dropped.
    pub fn route(&self, room_id: &str, command: RoomCommand) {
        match self.rooms.get(room_id) {
            Some(handle) => {
                if handle.commands.send(command).is_err() {
                    error!("Room {} task is gone, dropping command", room_id);
                }
            }
            None => debug!("Dropping {:?} for unknown room {}", command, room_id),
        }
    }

    pub fn room_of(&self, connection: u32) -> Option<&str> {
        self.memberships.get(&connection).map(String::as_str)
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// Starts the task that owns one room. The task applies commands in arrival
/// order and stops once its last player leaves; pending timers for a stopped
/// room fail to send and fall away.
fn spawn_room(
    room_id: String,
    outbound: mpsc::UnboundedSender<Delivery>,
    collectible_target: usize,
) -> RoomHandle {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let timer_tx = command_tx.clone();

    tokio::spawn(async move {
        let router = RoomRouter::new(room_id.clone(), outbound);
        let mut state = RoomState::new(room_id.clone(), collectible_target, router);

        while let Some(command) = command_rx.recv().await {
            if let Some(followup) = state.apply(command) {
                schedule_followup(&timer_tx, followup);
            }
            // The first command is always the creator's join, so an empty
            // room here means the last player left.
            if state.is_empty() {
                break;
            }
        }
        debug!("Room {} task stopped", room_id);
    });

    RoomHandle {
        commands: command_tx,
        members: HashSet::new(),
    }
}

fn schedule_followup(timer_tx: &mpsc::UnboundedSender<RoomCommand>, followup: Followup) {
    let timer_tx = timer_tx.clone();
    match followup {
        Followup::RespawnAfterDelay { connection } => {
            tokio::spawn(async move {
                sleep(Duration::from_millis(RESPAWN_DELAY_MS)).await;
                let _ = timer_tx.send(RoomCommand::Respawn { connection });
            });
        }
        Followup::RepopulateAfterDelay => {
            tokio::spawn(async move {
                sleep(Duration::from_millis(REPOPULATE_DELAY_MS)).await;
                let _ = timer_tx.send(RoomCommand::Repopulate);
            });
        }
    }
}
