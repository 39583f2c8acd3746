//! Active collectibles for one room.
//!
//! The field owns every collectible currently on the map. Spawning tops the
//! field back up to its population target, and consumption removes an entry
//! exactly once no matter how many pickup reports race for it.

use std::collections::HashMap;

use log::debug;
use rand::Rng;
use shared::{Collectible, Obstacle, COLLECTIBLE_CLEARANCE, COLLECTIBLE_KINDS};

use crate::placement;

#[derive(Debug)]
pub struct CollectibleField {
    items: HashMap<u32, Collectible>,
    next_id: u32,
}

impl Default for CollectibleField {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectibleField {
    pub fn new() -> Self {
        CollectibleField {
            items: HashMap::new(),
            next_id: 1,
        }
    }

    /// Spawns collectibles until the field holds `target` of them, keeping
    /// clear of the given obstacles. Returns only the newly spawned entries;
    /// ids are never reused within a room.
    pub fn ensure_population(
        &mut self,
        rng: &mut impl Rng,
        obstacles: &[Obstacle],
        target: usize,
    ) -> Vec<Collectible> {
        let mut spawned = Vec::new();
        while self.items.len() < target {
            let kind = COLLECTIBLE_KINDS[rng.gen_range(0..COLLECTIBLE_KINDS.len())];
            let position = placement::clear_position(rng, obstacles, COLLECTIBLE_CLEARANCE);
            let id = self.next_id;
            self.next_id += 1;

            let collectible = Collectible::new(id, position, kind);
            debug!(
                "Spawned collectible {} ({:?}, {} points) at ({:.1}, {:.1})",
                id, kind, collectible.value, position.x, position.y
            );
            self.items.insert(id, collectible.clone());
            spawned.push(collectible);
        }
        spawned
    }

    /// Removes and returns the collectible, or `None` if it was already
    /// taken. The first caller wins; everyone after sees `None`.
    pub fn consume(&mut self, id: u32) -> Option<Collectible> {
        self.items.remove(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.contains_key(&id)
    }

    pub fn snapshot(&self) -> Vec<Collectible> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
