//! Performance benchmarks for critical game systems

use bincode::{deserialize, serialize};
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::collectibles::CollectibleField;
use server::room::PlayerState;
use shared::{PlayerSnapshot, ServerEvent, Vec2, COLLECTIBLE_CLEARANCE};
use std::collections::HashMap;
use std::time::Instant;

/// Benchmarks the deterministic obstacle layout generation
#[test]
fn benchmark_obstacle_generation() {
    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let obstacles = server::obstacles::generate();
        assert_eq!(obstacles.len(), 25);
    }

    let duration = start.elapsed();
    println!(
        "Obstacle generation: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks rejection-sampled collectible placement against a full layout
#[test]
fn benchmark_collectible_placement() {
    let obstacles = server::obstacles::generate();
    let mut rng = StdRng::seed_from_u64(42);

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let position =
            server::placement::clear_position(&mut rng, &obstacles, COLLECTIBLE_CLEARANCE);
        assert!(position.x.is_finite() && position.y.is_finite());
    }

    let duration = start.elapsed();
    println!(
        "Collectible placement: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds even with rejection retries
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks consume throughput on a large collectible field
#[test]
fn benchmark_consume_throughput() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut field = CollectibleField::new();
    let population = 10_000;
    field.ensure_population(&mut rng, &[], population);

    let start = Instant::now();

    let mut consumed = 0;
    for id in 1..=population as u32 {
        if field.consume(id).is_some() {
            consumed += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Collectible consume: {} removals in {:?} ({:.2} ns/iter)",
        consumed,
        duration,
        duration.as_nanos() as f64 / consumed as f64
    );

    assert_eq!(consumed, population);
    assert!(field.is_empty());
    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks hit resolution including the guard checks
#[test]
fn benchmark_hit_resolution() {
    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut players = HashMap::new();
        players.insert(1, PlayerState::new(1, "shooter".to_string(), 0));
        let mut target = PlayerState::new(2, "target".to_string(), 0);
        target.score = 100;
        players.insert(2, target);

        let outcome = server::combat::resolve_hit(&mut players, 1, 2, 5000).unwrap();
        assert_eq!(outcome.shooter_score, 70);

        // The follow-up report is rejected by the dead-target guard
        assert!(server::combat::resolve_hit(&mut players, 1, 2, 5000).is_none());
    }

    let duration = start.elapsed();
    println!(
        "Hit resolution: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks network event serialization performance
#[test]
fn benchmark_event_serialization() {
    let players: Vec<PlayerSnapshot> = (0..50)
        .map(|i| PlayerSnapshot {
            id: i,
            name: format!("Player{}", i),
            color: 0x4f8fba,
            position: Vec2 {
                x: (i as f32) * 10.0,
                y: 100.0,
            },
            velocity: Vec2 { x: 1.0, y: -1.0 },
            score: i * 3,
            alive: i % 2 == 0,
        })
        .collect();

    let event = ServerEvent::Roster { players };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&event).unwrap();
        let _deserialized: ServerEvent = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Event serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the initial-sync payloads a joiner receives
#[test]
fn benchmark_initial_sync_payloads() {
    let obstacles = server::obstacles::generate();
    let mut rng = StdRng::seed_from_u64(3);
    let mut field = CollectibleField::new();
    field.ensure_population(&mut rng, &obstacles, 10);

    let layout = ServerEvent::ObstacleLayout { obstacles };
    let collectibles = ServerEvent::Collectibles {
        collectibles: field.snapshot(),
    };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let layout_bytes = serialize(&layout).unwrap();
        let collectible_bytes = serialize(&collectibles).unwrap();
        assert!(layout_bytes.len() < 2048);
        assert!(collectible_bytes.len() < 2048);
    }

    let duration = start.elapsed();
    println!(
        "Initial sync payloads: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Stress tests room command application under a movement flood
#[test]
fn stress_test_room_command_flood() {
    use server::room::{RoomCommand, RoomState};
    use server::router::RoomRouter;
    use tokio::sync::mpsc;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let router = RoomRouter::new("bench".to_string(), tx);
    let mut room = RoomState::new("bench".to_string(), 10, router);
    room.apply(RoomCommand::Join {
        connection: 1,
        name: None,
        color: None,
    });
    room.apply(RoomCommand::Join {
        connection: 2,
        name: None,
        color: None,
    });
    while rx.try_recv().is_ok() {}

    let iterations = 10_000;
    let start = Instant::now();

    for i in 0..iterations {
        room.apply(RoomCommand::Move {
            connection: 1,
            position: Vec2 {
                x: (i % 1000) as f32,
                y: 100.0,
            },
            velocity: None,
        });
    }

    let duration = start.elapsed();
    println!(
        "Room command flood: {} moves in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Every move produced exactly one delivery for the other player
    let mut deliveries = 0;
    while rx.try_recv().is_ok() {
        deliveries += 1;
    }
    assert_eq!(deliveries, iterations);

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
