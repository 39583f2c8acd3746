use serde::{Deserialize, Serialize};

pub const MAP_WIDTH: f32 = 1600.0;
pub const MAP_HEIGHT: f32 = 1200.0;
pub const MAP_MARGIN: f32 = 80.0;
pub const PLAYER_SPAWN_X: f32 = 800.0;
pub const PLAYER_SPAWN_Y: f32 = 200.0;
pub const KILL_BONUS: u32 = 20;
pub const RESPAWN_DELAY_MS: u64 = 3000;
pub const REPOPULATE_DELAY_MS: u64 = 2000;
pub const COLLECTIBLE_TARGET: usize = 10;
pub const COLLECTIBLE_CLEARANCE: f32 = 120.0;
pub const OBSTACLE_SPACING: f32 = 80.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn distance(&self, other: &Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Value tiers for collectibles. The tier fixes the point reward.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Bronze,
    Silver,
    Gold,
}

pub const COLLECTIBLE_KINDS: [CollectibleKind; 3] = [
    CollectibleKind::Bronze,
    CollectibleKind::Silver,
    CollectibleKind::Gold,
];

impl CollectibleKind {
    pub fn value(&self) -> u32 {
        match self {
            CollectibleKind::Bronze => 2,
            CollectibleKind::Silver => 5,
            CollectibleKind::Gold => 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Collectible {
    pub id: u32,
    pub position: Vec2,
    pub kind: CollectibleKind,
    pub value: u32,
}

impl Collectible {
    pub fn new(id: u32, position: Vec2, kind: CollectibleKind) -> Self {
        Self {
            id,
            position,
            kind,
            value: kind.value(),
        }
    }
}

/// Static impassable terrain. `group` only lets the visual layer connect
/// related pieces: 0-3 are the quadrant L-formations, 4 the center cluster.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub position: Vec2,
    pub group: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub name: String,
    pub color: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub score: u32,
    pub alive: bool,
}

/// Inbound events, one bincode datagram each. Every room-scoped event
/// carries the room identifier the client believes it is acting in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ClientEvent {
    Join {
        room: String,
        name: Option<String>,
        color: Option<u32>,
    },
    Move {
        room: String,
        position: Vec2,
        velocity: Option<Vec2>,
    },
    Shoot {
        room: String,
        direction: Vec2,
        position: Vec2,
    },
    Hit {
        room: String,
        shooter: u32,
        target: u32,
    },
    CollectByProjectile {
        room: String,
        object: u32,
    },
    CollectByProximity {
        room: String,
        resource: u32,
    },
    Leave,
    Ping {
        nonce: u64,
    },
}

/// Outbound notifications. `Connected` and `Pong` come from the transport
/// layer; everything else is room-scoped and produced by the engine.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ServerEvent {
    Connected {
        connection: u32,
    },
    Roster {
        players: Vec<PlayerSnapshot>,
    },
    ObstacleLayout {
        obstacles: Vec<Obstacle>,
    },
    Collectibles {
        collectibles: Vec<Collectible>,
    },
    PlayerJoined {
        player: PlayerSnapshot,
    },
    PlayerMoved {
        id: u32,
        position: Vec2,
        velocity: Vec2,
    },
    ProjectileFired {
        shooter: u32,
        direction: Vec2,
        position: Vec2,
    },
    PlayerKilled {
        shooter: u32,
        target: u32,
        shooter_score: u32,
        target_score: u32,
        stolen: u32,
    },
    PlayerRespawned {
        id: u32,
        position: Vec2,
    },
    CollectibleRemoved {
        object: u32,
        collector: u32,
        score: u32,
    },
    PlayerLeft {
        id: u32,
    },
    Pong {
        nonce: u64,
    },
}
