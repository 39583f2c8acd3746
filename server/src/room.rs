//! Authoritative state and command handling for one room.

use std::collections::HashMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{
    Obstacle, PlayerSnapshot, ServerEvent, Vec2, PLAYER_SPAWN_X, PLAYER_SPAWN_Y, RESPAWN_DELAY_MS,
};

use crate::collectibles::CollectibleField;
use crate::router::RoomRouter;
use crate::{combat, obstacles, placement, utils};

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: u32,
    pub name: String,
    pub color: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub score: u32,
    pub alive: bool,
    pub respawn_at: Option<u64>,
}

impl PlayerState {
    pub fn new(id: u32, name: String, color: u32) -> Self {
        PlayerState {
            id,
            name,
            color,
            position: Vec2 {
                x: PLAYER_SPAWN_X,
                y: PLAYER_SPAWN_Y,
            },
            velocity: Vec2::default(),
            score: 0,
            alive: true,
            respawn_at: None,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color,
            position: self.position,
            velocity: self.velocity,
            score: self.score,
            alive: self.alive,
        }
    }
}

/// What caused a collect report. Both paths resolve identically; the
/// distinction only survives into the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectTrigger {
    Projectile,
    Proximity,
}

#[derive(Debug)]
pub enum RoomCommand {
    Join {
        connection: u32,
        name: Option<String>,
        color: Option<u32>,
    },
    Leave {
        connection: u32,
    },
    Move {
        connection: u32,
        position: Vec2,
        velocity: Option<Vec2>,
    },
    Shoot {
        connection: u32,
        direction: Vec2,
        position: Vec2,
    },
    Hit {
        shooter: u32,
        target: u32,
    },
    Collect {
        connection: u32,
        object: u32,
        trigger: CollectTrigger,
    },
    Respawn {
        connection: u32,
    },
    Repopulate,
}

/// Deferred work the actor layer schedules after a command was applied.
/// Timers re-enter the room as plain commands and are revalidated on
/// arrival, so a stale one is a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    RespawnAfterDelay { connection: u32 },
    RepopulateAfterDelay,
}

pub struct RoomState {
    id: String,
    players: HashMap<u32, PlayerState>,
    field: CollectibleField,
    obstacles: Vec<Obstacle>,
    collectible_target: usize,
    router: RoomRouter,
    rng: StdRng,
}

impl RoomState {
    pub fn new(id: String, collectible_target: usize, router: RoomRouter) -> Self {
        let obstacles = obstacles::generate();
        let mut rng = StdRng::from_entropy();
        let mut field = CollectibleField::new();
        field.ensure_population(&mut rng, &obstacles, collectible_target);

        RoomState {
            id,
            players: HashMap::new(),
            field,
            obstacles,
            collectible_target,
            router,
            rng,
        }
    }

    pub fn apply(&mut self, command: RoomCommand) -> Option<Followup> {
        match command {
            RoomCommand::Join {
                connection,
                name,
                color,
            } => self.handle_join(connection, name, color),
            RoomCommand::Leave { connection } => self.handle_leave(connection),
            RoomCommand::Move {
                connection,
                position,
                velocity,
            } => self.handle_move(connection, position, velocity),
            RoomCommand::Shoot {
                connection,
                direction,
                position,
            } => self.handle_shoot(connection, direction, position),
            RoomCommand::Hit { shooter, target } => self.handle_hit(shooter, target),
            RoomCommand::Collect {
                connection,
                object,
                trigger,
            } => self.handle_collect(connection, object, trigger),
            RoomCommand::Respawn { connection } => self.handle_respawn(connection),
            RoomCommand::Repopulate => self.handle_repopulate(),
        }
    }

    fn handle_join(
        &mut self,
        connection: u32,
        name: Option<String>,
        color: Option<u32>,
    ) -> Option<Followup> {
        if self.players.contains_key(&connection) {
            debug!(
                "Player {} re-joined room {}, resending state",
                connection, self.id
            );
            self.send_room_state(connection);
            return None;
        }

        let name = name.unwrap_or_else(|| utils::default_name(connection));
        let color = color.unwrap_or_else(|| utils::default_color(connection));
        let player = PlayerState::new(connection, name, color);
        info!(
            "Player {} ({}) joined room {} ({} players)",
            connection,
            player.name,
            self.id,
            self.players.len() + 1
        );

        let arrival = player.snapshot();
        self.players.insert(connection, player);
        self.send_room_state(connection);
        self.router.broadcast_except(
            self.member_ids(),
            connection,
            ServerEvent::PlayerJoined { player: arrival },
        );
        None
    }

    fn handle_leave(&mut self, connection: u32) -> Option<Followup> {
        if let Some(player) = self.players.remove(&connection) {
            info!(
                "Player {} ({}) left room {} ({} players remain)",
                connection,
                player.name,
                self.id,
                self.players.len()
            );
            self.router
                .broadcast(self.member_ids(), ServerEvent::PlayerLeft { id: connection });
        }
        None
    }

    fn handle_move(
        &mut self,
        connection: u32,
        position: Vec2,
        velocity: Option<Vec2>,
    ) -> Option<Followup> {
        match self.players.get_mut(&connection) {
            Some(player) => {
                player.position = position;
                if let Some(velocity) = velocity {
                    player.velocity = velocity;
                }
                let velocity = player.velocity;
                self.router.broadcast_except(
                    self.member_ids(),
                    connection,
                    ServerEvent::PlayerMoved {
                        id: connection,
                        position,
                        velocity,
                    },
                );
            }
            None => debug!("Move from player {} not in room {}", connection, self.id),
        }
        None
    }

    fn handle_shoot(&mut self, connection: u32, direction: Vec2, position: Vec2) -> Option<Followup> {
        if !self.players.contains_key(&connection) {
            debug!("Shot from player {} not in room {}", connection, self.id);
            return None;
        }
        self.router.broadcast_except(
            self.member_ids(),
            connection,
            ServerEvent::ProjectileFired {
                shooter: connection,
                direction,
                position,
            },
        );
        None
    }

    fn handle_hit(&mut self, shooter: u32, target: u32) -> Option<Followup> {
        let deadline = utils::get_timestamp() + RESPAWN_DELAY_MS;
        let outcome = combat::resolve_hit(&mut self.players, shooter, target, deadline)?;

        info!(
            "Player {} killed player {} in room {} (stole {}, scores now {}/{})",
            shooter, target, self.id, outcome.stolen, outcome.shooter_score, outcome.target_score
        );
        self.router.broadcast(
            self.member_ids(),
            ServerEvent::PlayerKilled {
                shooter,
                target,
                shooter_score: outcome.shooter_score,
                target_score: outcome.target_score,
                stolen: outcome.stolen,
            },
        );
        Some(Followup::RespawnAfterDelay { connection: target })
    }

    fn handle_collect(
        &mut self,
        connection: u32,
        object: u32,
        trigger: CollectTrigger,
    ) -> Option<Followup> {
        if !self.players.contains_key(&connection) {
            debug!(
                "Collect report for {} from player {} not in room {}",
                object, connection, self.id
            );
            return None;
        }

        match self.field.consume(object) {
            Some(collectible) => {
                let mut score = 0;
                if let Some(player) = self.players.get_mut(&connection) {
                    player.score += collectible.value;
                    score = player.score;
                }
                info!(
                    "Player {} collected {} via {:?} (+{}) in room {}",
                    connection, object, trigger, collectible.value, self.id
                );
                self.router.broadcast(
                    self.member_ids(),
                    ServerEvent::CollectibleRemoved {
                        object,
                        collector: connection,
                        score,
                    },
                );
                Some(Followup::RepopulateAfterDelay)
            }
            None => {
                debug!(
                    "Collectible {} already gone (reported by player {} via {:?})",
                    object, connection, trigger
                );
                None
            }
        }
    }

    fn handle_respawn(&mut self, connection: u32) -> Option<Followup> {
        match self.players.get_mut(&connection) {
            Some(player) if !player.alive => {
                let position = placement::random_position(&mut self.rng);
                player.position = position;
                player.velocity = Vec2::default();
                player.alive = true;
                player.respawn_at = None;

                info!("Player {} respawned in room {}", connection, self.id);
                self.router.broadcast(
                    self.member_ids(),
                    ServerEvent::PlayerRespawned {
                        id: connection,
                        position,
                    },
                );
            }
            Some(_) => debug!("Respawn timer fired for player {} who is alive", connection),
            None => debug!(
                "Respawn timer fired for player {} who left room {}",
                connection, self.id
            ),
        }
        None
    }

    fn handle_repopulate(&mut self) -> Option<Followup> {
        let spawned =
            self.field
                .ensure_population(&mut self.rng, &self.obstacles, self.collectible_target);
        if !spawned.is_empty() {
            debug!(
                "Repopulated {} collectibles in room {} ({} active)",
                spawned.len(),
                self.id,
                self.field.len()
            );
            self.router.broadcast(
                self.member_ids(),
                ServerEvent::Collectibles {
                    collectibles: self.field.snapshot(),
                },
            );
        }
        None
    }

    /// Sends the full room picture to one connection: who is here, where the
    /// obstacles are, and what can be picked up.
    fn send_room_state(&self, connection: u32) {
        self.router.send_to(
            connection,
            ServerEvent::Roster {
                players: self.players.values().map(PlayerState::snapshot).collect(),
            },
        );
        self.router.send_to(
            connection,
            ServerEvent::ObstacleLayout {
                obstacles: self.obstacles.clone(),
            },
        );
        self.router.send_to(
            connection,
            ServerEvent::Collectibles {
                collectibles: self.field.snapshot(),
            },
        );
    }

    fn member_ids(&self) -> Vec<u32> {
        self.players.keys().copied().collect()
    }

    pub fn player(&self, connection: u32) -> Option<&PlayerState> {
        self.players.get(&connection)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn collectible_count(&self) -> usize {
        self.field.len()
    }
}
