//! Stable fingerprint of a generated graph, for determinism checks.

use std::collections::BTreeMap;
use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::graph::RoomGraph;
use crate::types::{Direction, RoomId};

impl RoomGraph {
    /// Hashes rooms in placement order together with how their exits are
    /// linked. Two runs with the same seed and inputs produce the same value.
    pub fn fingerprint(&self) -> u64 {
        let order: BTreeMap<RoomId, u32> =
            self.rooms().enumerate().map(|(index, room)| (room.id, index as u32)).collect();

        let mut hasher = Xxh3::new();
        hasher.write_u64(self.len() as u64);
        for room in self.rooms() {
            hasher.write_u8(room.room_type.code());
            hasher.write_u32(room.depth);
            hasher.write_u32(room.position.x.to_bits());
            hasher.write_u32(room.position.y.to_bits());
            hasher.write_u8(u8::from(room.is_start) | (u8::from(room.is_terminal) << 1));
            hasher.write_u8(room.entered_from.map_or(0, direction_code));
            hasher.write_u64(room.combat.as_ref().map_or(0, |content| content.enemy_count() as u64));
            for exit in &room.exits {
                let Some(point) = self.exit(*exit) else {
                    continue;
                };
                hasher.write_u8(direction_code(point.direction));
                let linked = point
                    .connected_to
                    .and_then(|other| self.exit(other))
                    .and_then(|other| order.get(&other.room).copied())
                    .unwrap_or(u32::MAX);
                hasher.write_u32(linked);
            }
        }
        hasher.finish()
    }
}

fn direction_code(direction: Direction) -> u8 {
    match direction {
        Direction::North => 1,
        Direction::East => 2,
        Direction::South => 3,
        Direction::West => 4,
    }
}
