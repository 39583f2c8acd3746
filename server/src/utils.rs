use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Get current timestamp in milliseconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

// Default 0xRRGGBB player colors, cycled by connection ID
pub fn default_color(connection_id: u32) -> u32 {
    const PALETTE: [u32; 8] = [
        0x4f8fba, 0xda863e, 0x75a743, 0xa53030, 0x7a367b, 0x25bed9, 0xde9e41, 0xc65197,
    ];
    PALETTE[(connection_id as usize).saturating_sub(1) % PALETTE.len()]
}

// Default display name for players that join without one
pub fn default_name(connection_id: u32) -> String {
    format!("Player{}", connection_id)
}
