//! Deterministic obstacle layout shared by every room.
//!
//! The field is four congruent L-shaped formations, one per map quadrant,
//! each rotated a quarter turn further than the last, plus a plus-shaped
//! cluster at the center. Generation takes no randomness, so every room
//! (and every client rendering one) sees the same 25 positions.

use shared::{Obstacle, Vec2, MAP_HEIGHT, MAP_WIDTH, OBSTACLE_SPACING};

/// Offsets of one L formation in grid units, before scaling and rotation.
/// Three cells along one arm, two more along the perpendicular arm.
const L_TEMPLATE: [(f32, f32); 5] = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)];

/// Offsets of the center cluster in grid units.
const CENTER_TEMPLATE: [(f32, f32); 5] =
    [(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)];

/// Group tag for the center cluster; quadrant formations use 0 through 3.
pub const CENTER_GROUP: u8 = 4;

/// Builds the full obstacle field. Ids are assigned in generation order and
/// line up across calls.
pub fn generate() -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(L_TEMPLATE.len() * 4 + CENTER_TEMPLATE.len());
    let mut next_id = 0;

    for (group, base) in quadrant_bases().iter().enumerate() {
        for (dx, dy) in L_TEMPLATE {
            let unrotated = Vec2 {
                x: base.x + dx * OBSTACLE_SPACING,
                y: base.y + dy * OBSTACLE_SPACING,
            };
            obstacles.push(Obstacle {
                id: next_id,
                position: rotate_about(unrotated, *base, group as u32),
                group: group as u8,
            });
            next_id += 1;
        }
    }

    let center = Vec2 {
        x: MAP_WIDTH / 2.0,
        y: MAP_HEIGHT / 2.0,
    };
    for (dx, dy) in CENTER_TEMPLATE {
        obstacles.push(Obstacle {
            id: next_id,
            position: Vec2 {
                x: center.x + dx * OBSTACLE_SPACING,
                y: center.y + dy * OBSTACLE_SPACING,
            },
            group: CENTER_GROUP,
        });
        next_id += 1;
    }

    obstacles
}

/// Anchor points of the four quadrant formations, in group order.
fn quadrant_bases() -> [Vec2; 4] {
    let qx = MAP_WIDTH / 4.0;
    let qy = MAP_HEIGHT / 4.0;
    [
        Vec2 { x: qx, y: qy },
        Vec2 { x: 3.0 * qx, y: qy },
        Vec2 { x: 3.0 * qx, y: 3.0 * qy },
        Vec2 { x: qx, y: 3.0 * qy },
    ]
}

/// Rotates `point` about `base` by `quarter_turns` * 90 degrees
/// counterclockwise.
fn rotate_about(point: Vec2, base: Vec2, quarter_turns: u32) -> Vec2 {
    let dx = point.x - base.x;
    let dy = point.y - base.y;
    match quarter_turns % 4 {
        0 => point,
        1 => Vec2 {
            x: base.x - dy,
            y: base.y + dx,
        },
        2 => Vec2 {
            x: base.x - dx,
            y: base.y - dy,
        },
        _ => Vec2 {
            x: base.x + dy,
            y: base.y - dx,
        },
    }
}
