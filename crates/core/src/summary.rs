//! Serializable report of a run, consumed by the simulation tools.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::generator::{DungeonGenerator, GeneratorPhase};
use crate::state::MandatorySlot;
use crate::types::{RoomType, Vec2};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room_type: RoomType,
    pub depth: u32,
    pub layout: String,
    pub position: Vec2,
    pub waves: usize,
    pub enemies: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub target_room_count: u32,
    pub complete: bool,
    pub rooms: Vec<RoomSummary>,
    pub room_type_counts: BTreeMap<RoomType, u32>,
    pub mandatory: Option<MandatorySlot>,
    pub probable_mandatory_generated: bool,
    pub stuck_exits: usize,
    pub open_exits: usize,
    pub fingerprint: u64,
}

impl DungeonGenerator {
    pub fn summary(&self) -> RunSummary {
        let graph = self.graph();
        let state = self.state();
        let rooms: Vec<RoomSummary> = graph
            .rooms()
            .map(|room| RoomSummary {
                room_type: room.room_type,
                depth: room.depth,
                layout: self
                    .catalog()
                    .layout(room.layout)
                    .map(|layout| layout.name.clone())
                    .unwrap_or_default(),
                position: room.position,
                waves: room.combat.as_ref().map_or(0, |content| content.wave_count()),
                enemies: room.combat.as_ref().map_or(0, |content| content.enemy_count()),
            })
            .collect();
        let mut room_type_counts = BTreeMap::new();
        for room in &rooms {
            *room_type_counts.entry(room.room_type).or_insert(0) += 1;
        }

        RunSummary {
            seed: self.seed(),
            target_room_count: state.target_room_count,
            complete: self.phase() == GeneratorPhase::Complete,
            rooms,
            room_type_counts,
            mandatory: state.mandatory,
            probable_mandatory_generated: state.probable_mandatory_generated,
            stuck_exits: state.stuck_exits.len(),
            open_exits: graph.open_exits().count(),
            fingerprint: graph.fingerprint(),
        }
    }
}
