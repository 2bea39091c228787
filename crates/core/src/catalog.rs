//! Room layout catalog: authored layouts grouped by room type, with the
//! per-layout selection weight and repetition count used for anti-repetition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::types::{Direction, LayoutId, RoomType, Vec2};

/// Directional socket on a layout, relative to the layout origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitSocket {
    pub direction: Direction,
    pub offset: Vec2,
}

/// Axis-aligned area, relative to the layout origin, where enemies may appear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnVolume {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Authoring form of a layout, as written in content files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutDef {
    pub name: String,
    pub room_type: RoomType,
    pub exits: Vec<ExitSocket>,
    #[serde(default)]
    pub spawn_volumes: Vec<SpawnVolume>,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomLayout {
    pub id: LayoutId,
    pub name: String,
    pub room_type: RoomType,
    pub exits: Vec<ExitSocket>,
    pub spawn_volumes: Vec<SpawnVolume>,
    pub repetition_count: u32,
    pub selection_weight: f32,
}

impl RoomLayout {
    pub fn exits_facing(&self, direction: Direction) -> impl Iterator<Item = (usize, &ExitSocket)> {
        self.exits.iter().enumerate().filter(move |(_, socket)| socket.direction == direction)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoomCatalog {
    layouts: SlotMap<LayoutId, RoomLayout>,
    pools: BTreeMap<RoomType, Vec<LayoutId>>,
    terminal_pool: Vec<LayoutId>,
    start_layout: Option<LayoutId>,
}

impl RoomCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a regular layout to the pool of its room type.
    pub fn insert(&mut self, def: LayoutDef) -> LayoutId {
        let room_type = def.room_type;
        let id = self.insert_layout(def);
        self.pools.entry(room_type).or_default().push(id);
        id
    }

    pub fn insert_terminal(&mut self, def: LayoutDef) -> LayoutId {
        let id = self.insert_layout(def);
        self.terminal_pool.push(id);
        id
    }

    pub fn set_start(&mut self, def: LayoutDef) -> LayoutId {
        let id = self.insert_layout(def);
        self.start_layout = Some(id);
        id
    }

    fn insert_layout(&mut self, def: LayoutDef) -> LayoutId {
        let id = self.layouts.insert(RoomLayout {
            id: LayoutId::default(),
            name: def.name,
            room_type: def.room_type,
            exits: def.exits,
            spawn_volumes: def.spawn_volumes,
            repetition_count: 0,
            selection_weight: def.weight.min(1.0),
        });
        self.layouts[id].id = id;
        id
    }

    pub fn layout(&self, id: LayoutId) -> Option<&RoomLayout> {
        self.layouts.get(id)
    }

    pub fn layouts(&self) -> impl Iterator<Item = &RoomLayout> {
        self.layouts.values()
    }

    pub fn pool(&self, room_type: RoomType) -> &[LayoutId] {
        self.pools.get(&room_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_layouts(&self, room_type: RoomType) -> bool {
        !self.pool(room_type).is_empty()
    }

    pub fn terminal_pool(&self) -> &[LayoutId] {
        &self.terminal_pool
    }

    pub fn start_layout(&self) -> Option<LayoutId> {
        self.start_layout
    }

    pub fn pool_exhausted(&self, room_type: RoomType) -> bool {
        self.pool(room_type)
            .iter()
            .filter_map(|id| self.layouts.get(*id))
            .all(|layout| layout.selection_weight <= 0.0)
    }

    /// Resets every weight of a pool to a baseline scaled down by how often
    /// the layout has already been used.
    pub fn renormalize_pool(&mut self, room_type: RoomType, decay_factor: f32) {
        let Some(pool) = self.pools.get(&room_type) else {
            return;
        };
        for id in pool {
            if let Some(layout) = self.layouts.get_mut(*id) {
                layout.selection_weight =
                    1.0 / (1.0 + layout.repetition_count as f32 * decay_factor * 0.5);
            }
        }
        tracing::debug!(?room_type, "renormalized exhausted layout pool");
    }

    /// Anti-repetition update after `used` was placed: the used layout loses
    /// weight, its peers in the same pool regain a little.
    pub fn record_use(&mut self, used: LayoutId, repetition_penalty: f32, decay_factor: f32) {
        let Some(layout) = self.layouts.get_mut(used) else {
            return;
        };
        layout.repetition_count += 1;
        layout.selection_weight = 1.0 / (1.0 + layout.repetition_count as f32 * repetition_penalty);
        let room_type = layout.room_type;
        tracing::trace!(
            layout = %layout.name,
            repetitions = layout.repetition_count,
            weight = layout.selection_weight,
            "layout weight decayed"
        );

        let Some(pool) = self.pools.get(&room_type) else {
            return;
        };
        for id in pool.iter().filter(|id| **id != used) {
            if let Some(peer) = self.layouts.get_mut(*id) {
                peer.selection_weight =
                    (peer.selection_weight * (1.0 + decay_factor * 0.1)).min(1.0);
            }
        }
    }
}
