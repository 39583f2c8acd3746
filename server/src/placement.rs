//! Random placement of objects within the map interior.

use rand::Rng;
use shared::{Obstacle, Vec2, MAP_HEIGHT, MAP_MARGIN, MAP_WIDTH};

/// Attempts per clearance level before the constraint is relaxed.
const MAX_ATTEMPTS: u32 = 64;
/// Clearance at or below which any sample is accepted outright.
const MIN_CLEARANCE: f32 = 1.0;

/// Uniform sample within the map interior (margin kept from every edge).
pub fn random_position(rng: &mut impl Rng) -> Vec2 {
    Vec2 {
        x: rng.gen_range(MAP_MARGIN..MAP_WIDTH - MAP_MARGIN),
        y: rng.gen_range(MAP_MARGIN..MAP_HEIGHT - MAP_MARGIN),
    }
}

/// Rejection-samples a position farther than `clearance` from every obstacle.
/// The attempt budget is bounded: after `MAX_ATTEMPTS` misses the clearance
/// is halved and sampling restarts, and below `MIN_CLEARANCE` the next sample
/// is accepted unconditionally, so the loop terminates for any layout.
pub fn clear_position(rng: &mut impl Rng, obstacles: &[Obstacle], clearance: f32) -> Vec2 {
    let mut clearance = clearance;
    loop {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = random_position(rng);
            if is_clear(&candidate, obstacles, clearance) {
                return candidate;
            }
        }
        if clearance <= MIN_CLEARANCE {
            return random_position(rng);
        }
        clearance /= 2.0;
    }
}

fn is_clear(position: &Vec2, obstacles: &[Obstacle], clearance: f32) -> bool {
    obstacles
        .iter()
        .all(|obstacle| obstacle.position.distance(position) > clearance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn obstacle_at(id: u32, x: f32, y: f32) -> Obstacle {
        Obstacle {
            id,
            position: Vec2 { x, y },
            group: 0,
        }
    }

    #[test]
    fn test_random_position_stays_within_interior() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = random_position(&mut rng);
            assert!(p.x >= MAP_MARGIN && p.x <= MAP_WIDTH - MAP_MARGIN);
            assert!(p.y >= MAP_MARGIN && p.y <= MAP_HEIGHT - MAP_MARGIN);
        }
    }

    #[test]
    fn test_clear_position_respects_clearance() {
        let mut rng = StdRng::seed_from_u64(2);
        let obstacles = vec![
            obstacle_at(0, 400.0, 300.0),
            obstacle_at(1, 800.0, 600.0),
            obstacle_at(2, 1200.0, 900.0),
        ];

        for _ in 0..200 {
            let p = clear_position(&mut rng, &obstacles, 120.0);
            for obstacle in &obstacles {
                assert!(obstacle.position.distance(&p) > 120.0);
            }
        }
    }

    #[test]
    fn test_clear_position_without_obstacles() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = clear_position(&mut rng, &[], 120.0);
        assert!(p.x >= MAP_MARGIN && p.x <= MAP_WIDTH - MAP_MARGIN);
        assert!(p.y >= MAP_MARGIN && p.y <= MAP_HEIGHT - MAP_MARGIN);
    }

    #[test]
    fn test_clear_position_terminates_when_clearance_is_impossible() {
        let mut rng = StdRng::seed_from_u64(4);
        // A clearance wider than the map makes every sample invalid until
        // the constraint relaxes.
        let obstacles = vec![obstacle_at(0, MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0)];

        let p = clear_position(&mut rng, &obstacles, MAP_WIDTH * 2.0);
        assert!(p.x >= MAP_MARGIN && p.x <= MAP_WIDTH - MAP_MARGIN);
        assert!(p.y >= MAP_MARGIN && p.y <= MAP_HEIGHT - MAP_MARGIN);
    }

    #[test]
    fn test_clear_position_terminates_with_dense_layout() {
        let mut rng = StdRng::seed_from_u64(5);
        // Obstacles on a grid tight enough that the full clearance can
        // never be satisfied anywhere in the interior.
        let mut obstacles = Vec::new();
        let mut id = 0;
        let mut x = 0.0;
        while x <= MAP_WIDTH {
            let mut y = 0.0;
            while y <= MAP_HEIGHT {
                obstacles.push(obstacle_at(id, x, y));
                id += 1;
                y += 100.0;
            }
            x += 100.0;
        }

        let p = clear_position(&mut rng, &obstacles, 300.0);
        assert!(p.x >= MAP_MARGIN && p.x <= MAP_WIDTH - MAP_MARGIN);
        assert!(p.y >= MAP_MARGIN && p.y <= MAP_HEIGHT - MAP_MARGIN);
    }
}
