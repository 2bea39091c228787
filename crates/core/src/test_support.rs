//! Builders shared by the unit tests.

use crate::catalog::{ExitSocket, LayoutDef};
use crate::combat::{
    CombatBucket, ContentMode, EnemyCombination, EnemyGroup, WaveTemplate, WeightedEnemy,
};
use crate::progression::ProgressionRule;
use crate::types::{Direction, RoomType};

pub(crate) const HALF_SIZE: f32 = 10.0;

/// Square 20x20 layout with one socket at the middle of each listed side.
pub(crate) fn layout_def(name: &str, room_type: RoomType, directions: &[Direction]) -> LayoutDef {
    LayoutDef {
        name: name.to_string(),
        room_type,
        exits: directions
            .iter()
            .map(|direction| ExitSocket { direction: *direction, offset: direction.unit() * HALF_SIZE })
            .collect(),
        spawn_volumes: Vec::new(),
        weight: 1.0,
    }
}

pub(crate) fn rule(room_type: RoomType, min_depth: u32, max_depth: u32) -> ProgressionRule {
    ProgressionRule {
        room_type,
        min_depth,
        max_depth,
        mandatory: false,
        probable_mandatory: false,
        generate_once: false,
        probability: 0.0,
        combat: None,
    }
}

pub(crate) fn procedural_bucket(start_depth: u32, end_depth: u32) -> CombatBucket {
    CombatBucket {
        start_depth,
        end_depth,
        mode: ContentMode::ProceduralFromPool,
        enemy_pool: vec![WeightedEnemy { enemy: "grunt".to_string(), spawn_weight: 1.0 }],
        min_waves: 1,
        max_waves: 3,
        min_per_wave: 1,
        max_per_wave: 4,
        combinations: Vec::new(),
        wave_delay_secs: 1.0,
    }
}

pub(crate) fn combination(name: &str, waves: &[&[(&str, u32)]]) -> EnemyCombination {
    EnemyCombination {
        name: name.to_string(),
        waves: waves
            .iter()
            .map(|groups| WaveTemplate {
                groups: groups
                    .iter()
                    .map(|(enemy, count)| EnemyGroup { enemy: enemy.to_string(), count: *count })
                    .collect(),
            })
            .collect(),
    }
}
