use bincode::{deserialize, serialize};
use shared::{ClientEvent, ServerEvent, Vec2};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Headless smoke client: joins a room, pokes every kind of event at the
/// server, and prints what comes back.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let server_addr: SocketAddr = args
        .next()
        .unwrap_or_else(|| "127.0.0.1:8080".to_string())
        .parse()?;
    let room = args.next().unwrap_or_else(|| "smoke".to_string());

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let mut buf = [0u8; 2048];

    // Liveness first
    let ping = serialize(&ClientEvent::Ping { nonce: 1 })?;
    socket.send_to(&ping, server_addr).await?;
    let (len, _) = socket.recv_from(&mut buf).await?;
    match deserialize::<ServerEvent>(&buf[0..len])? {
        ServerEvent::Pong { nonce } => println!("Server is alive (pong nonce {})", nonce),
        other => println!("Expected Pong but got: {:?}", other),
    }

    // Join and read the connection id plus the initial room state
    let join = serialize(&ClientEvent::Join {
        room: room.clone(),
        name: Some("probe".to_string()),
        color: None,
    })?;
    println!("Joining room {:?} on {}", room, server_addr);
    socket.send_to(&join, server_addr).await?;

    let mut connection = 0;
    let mut first_collectible = None;
    for _ in 0..4 {
        let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf)).await??;
        match deserialize::<ServerEvent>(&buf[0..len])? {
            ServerEvent::Connected { connection: id } => {
                connection = id;
                println!("Connected with id {}", id);
            }
            ServerEvent::Roster { players } => {
                println!("Roster: {} players", players.len());
                for p in &players {
                    println!("  {} {:?} score={} alive={}", p.id, p.name, p.score, p.alive);
                }
            }
            ServerEvent::ObstacleLayout { obstacles } => {
                println!("Obstacle layout: {} obstacles", obstacles.len());
            }
            ServerEvent::Collectibles { collectibles } => {
                println!("Collectibles: {} on the map", collectibles.len());
                first_collectible = collectibles.first().map(|c| c.id);
            }
            other => println!("Unexpected event during sync: {:?}", other),
        }
    }

    // Exercise the room-scoped events
    let movement = serialize(&ClientEvent::Move {
        room: room.clone(),
        position: Vec2 { x: 640.0, y: 360.0 },
        velocity: Some(Vec2 { x: 1.0, y: 0.0 }),
    })?;
    socket.send_to(&movement, server_addr).await?;
    println!("Sent a move");

    let shot = serialize(&ClientEvent::Shoot {
        room: room.clone(),
        direction: Vec2 { x: 0.0, y: 1.0 },
        position: Vec2 { x: 640.0, y: 360.0 },
    })?;
    socket.send_to(&shot, server_addr).await?;
    println!("Sent a shot");

    if let Some(object) = first_collectible {
        let pickup = serialize(&ClientEvent::CollectByProximity {
            room: room.clone(),
            resource: object,
        })?;
        socket.send_to(&pickup, server_addr).await?;
        println!("Reported pickup of collectible {}", object);
    }

    // Watch the room react for a few seconds; the pickup confirmation should
    // arrive immediately and the repopulated field shortly after.
    loop {
        match timeout(Duration::from_secs(4), socket.recv_from(&mut buf)).await {
            Ok(result) => {
                let (len, _) = result?;
                match deserialize::<ServerEvent>(&buf[0..len]) {
                    Ok(ServerEvent::CollectibleRemoved {
                        object,
                        collector,
                        score,
                    }) => {
                        println!(
                            "Collectible {} credited to {} (score now {})",
                            object, collector, score
                        );
                    }
                    Ok(ServerEvent::Collectibles { collectibles }) => {
                        println!("Field repopulated: {} collectibles", collectibles.len());
                        break;
                    }
                    Ok(other) => println!("Event: {:?}", other),
                    Err(e) => println!("Failed to deserialize event: {}", e),
                }
            }
            Err(_) => {
                println!("No more events");
                break;
            }
        }
    }

    let leave = serialize(&ClientEvent::Leave)?;
    socket.send_to(&leave, server_addr).await?;
    println!("Left the room, connection {} done", connection);

    Ok(())
}
