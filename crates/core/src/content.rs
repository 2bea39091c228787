//! Authored content for a run: layouts, progression rules, the probability
//! and adjacency tables, and combat buckets. Ships with a built-in set and
//! can be loaded from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{ExitSocket, LayoutDef, RoomCatalog, SpawnVolume};
use crate::combat::{
    CombatBucket, CombatContent, CombatContentGenerator, ContentMode, EnemyCombination,
    EnemyGroup, EnemyWave, WaveTemplate, WeightedEnemy,
};
use crate::error::ConfigError;
use crate::progression::{
    AdjacencyTable, ProgressionRule, ProgressionRuleSet, RoomTypeProbability, SuccessorRule,
};
use crate::types::{Direction, LayoutId, RoomType, Vec2};

/// Half the side of every built-in layout; sockets sit on the walls.
const ROOM_HALF_SIZE: f32 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonContent {
    pub start_layout: LayoutDef,
    #[serde(default)]
    pub layouts: Vec<LayoutDef>,
    #[serde(default)]
    pub terminal_layouts: Vec<LayoutDef>,
    #[serde(default)]
    pub rules: Vec<ProgressionRule>,
    #[serde(default)]
    pub probabilities: Vec<RoomTypeProbability>,
    #[serde(default)]
    pub adjacency: AdjacencyTable,
    #[serde(default)]
    pub combat_buckets: Vec<CombatBucket>,
}

/// Runtime form of the content, split into the parts the generator owns.
pub(crate) struct ContentParts {
    pub catalog: RoomCatalog,
    pub start_layout: LayoutId,
    pub rules: ProgressionRuleSet,
    pub combat: CombatContentGenerator,
}

impl Default for DungeonContent {
    fn default() -> Self {
        Self::build_default()
    }
}

impl DungeonContent {
    /// The built-in dungeon: square rooms, a boss guaranteed mid-run, one
    /// optional rest stop, and combat that turns authored as depth grows.
    pub fn build_default() -> Self {
        use Direction::{East, North, South, West};

        let arena_volumes = [
            (Vec2::new(-5.0, 4.0), Vec2::new(3.0, 2.0)),
            (Vec2::new(5.0, -4.0), Vec2::new(3.0, 2.0)),
        ];
        let layouts = vec![
            square("arena_cross", RoomType::Combat, &[North, East, South, West], &arena_volumes),
            square("long_hall_ns", RoomType::Combat, &[North, South], &arena_volumes[..1]),
            square("long_hall_ew", RoomType::Combat, &[East, West], &arena_volumes[1..]),
            square("pillared_court", RoomType::Combat, &[North, East, South], &arena_volumes),
            square("sunken_pit", RoomType::Combat, &[South, West, North], &arena_volumes),
            square("merchant_alcove", RoomType::Shop, &[North, East, South, West], &[]),
            square("gilded_vault", RoomType::Treasure, &[North, East, South, West], &[]),
            square("campfire", RoomType::Rest, &[North, East, South, West], &[]),
            square("forgotten_shrine", RoomType::Event, &[North, East, South, West], &[]),
            square("wishing_well", RoomType::Event, &[North, South, East], &[]),
            square(
                "throne_room",
                RoomType::Boss,
                &[North, East, South, West],
                &[(Vec2::new(0.0, 5.0), Vec2::new(2.0, 2.0))],
            ),
        ];

        let mut boss = rule(RoomType::Boss, 6, 9);
        boss.mandatory = true;
        boss.combat = Some(CombatContent {
            waves: vec![
                EnemyWave { enemies: vec!["abyssal_warden".to_string()] },
                EnemyWave { enemies: vec!["skeleton".to_string(); 4] },
            ],
            wave_delay_secs: 2.5,
        });
        let mut rest = rule(RoomType::Rest, 4, 9);
        rest.probable_mandatory = true;
        rest.generate_once = true;
        rest.probability = 20.0;

        let rules = vec![
            rule(RoomType::Combat, 1, 99),
            rule(RoomType::Treasure, 1, 99),
            rule(RoomType::Shop, 2, 99),
            rule(RoomType::Event, 3, 99),
            rest,
            boss,
        ];

        let probabilities = vec![
            probability(RoomType::Combat, 60.0, false),
            probability(RoomType::Shop, 12.0, false),
            probability(RoomType::Treasure, 10.0, true),
            probability(RoomType::Rest, 6.0, false),
            probability(RoomType::Event, 12.0, true),
        ];

        let adjacency = AdjacencyTable::new(vec![
            successors(RoomType::Start, &[RoomType::Combat, RoomType::Event, RoomType::Boss]),
            successors(
                RoomType::Shop,
                &[RoomType::Combat, RoomType::Treasure, RoomType::Event, RoomType::Rest, RoomType::Boss],
            ),
            successors(
                RoomType::Treasure,
                &[RoomType::Combat, RoomType::Shop, RoomType::Event, RoomType::Rest, RoomType::Boss],
            ),
            successors(
                RoomType::Rest,
                &[RoomType::Combat, RoomType::Shop, RoomType::Treasure, RoomType::Event, RoomType::Boss],
            ),
            successors(RoomType::Boss, &[RoomType::Combat, RoomType::Rest, RoomType::Treasure]),
        ]);

        let combat_buckets = vec![
            CombatBucket {
                start_depth: 0,
                end_depth: 5,
                mode: ContentMode::ProceduralFromPool,
                enemy_pool: vec![enemy("skeleton", 5.0), enemy("slime", 3.0), enemy("archer", 2.0)],
                min_waves: 1,
                max_waves: 2,
                min_per_wave: 2,
                max_per_wave: 4,
                combinations: Vec::new(),
                wave_delay_secs: 1.5,
            },
            CombatBucket {
                start_depth: 6,
                end_depth: 12,
                mode: ContentMode::CombinationAndProcedural,
                enemy_pool: vec![
                    enemy("skeleton", 4.0),
                    enemy("archer", 3.0),
                    enemy("knight", 2.0),
                    enemy("shaman", 1.0),
                ],
                min_waves: 2,
                max_waves: 3,
                min_per_wave: 3,
                max_per_wave: 6,
                combinations: vec![
                    combination("phalanx", &[&[("knight", 2), ("archer", 2)], &[("shaman", 1), ("knight", 1)]]),
                    combination("ambush", &[&[("archer", 4)]]),
                ],
                wave_delay_secs: 1.5,
            },
            CombatBucket {
                start_depth: 13,
                end_depth: 99,
                mode: ContentMode::PredefinedCombination,
                enemy_pool: vec![enemy("knight", 1.0)],
                min_waves: 3,
                max_waves: 4,
                min_per_wave: 4,
                max_per_wave: 7,
                combinations: vec![
                    combination(
                        "siege",
                        &[&[("knight", 3)], &[("archer", 3), ("shaman", 1)], &[("knight", 2), ("golem", 1)]],
                    ),
                    combination("swarm", &[&[("slime", 6)], &[("slime", 8)], &[("slime", 4), ("shaman", 2)]]),
                ],
                wave_delay_secs: 1.0,
            },
        ];

        Self {
            start_layout: square("entry_hall", RoomType::Start, &[North, East, South, West], &[]),
            layouts,
            terminal_layouts: vec![square(
                "descent_stairs",
                RoomType::Terminal,
                &[North, East, South, West],
                &[],
            )],
            rules,
            probabilities,
            adjacency,
            combat_buckets,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let content: Self = toml::from_str(text)?;
        content.validate()?;
        Ok(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_layout.exits.is_empty() {
            return Err(ConfigError::MissingStartLayout);
        }
        if self.terminal_layouts.is_empty() {
            return Err(ConfigError::MissingTerminalLayout);
        }
        for def in self.layouts.iter().chain(&self.terminal_layouts) {
            if def.exits.is_empty() {
                return Err(ConfigError::LayoutWithoutExits { name: def.name.clone() });
            }
            if def.weight < 0.0 {
                return Err(ConfigError::Negative { field: "layout.weight", value: def.weight });
            }
        }
        if let Some(def) = self.layouts.iter().find(|def| !def.room_type.is_regular()) {
            return Err(ConfigError::NotSelectable { room_type: def.room_type });
        }

        for rule in &self.rules {
            if !rule.room_type.is_regular() {
                return Err(ConfigError::NotSelectable { room_type: rule.room_type });
            }
            if rule.min_depth > rule.max_depth {
                return Err(ConfigError::InvalidDepthRange {
                    room_type: rule.room_type,
                    min: rule.min_depth,
                    max: rule.max_depth,
                });
            }
            if !self.layouts.iter().any(|def| def.room_type == rule.room_type) {
                return Err(ConfigError::RuleWithoutLayouts { room_type: rule.room_type });
            }
            if rule.probability < 0.0 {
                return Err(ConfigError::Negative { field: "rule.probability", value: rule.probability });
            }
        }
        let mandatory = self.rules.iter().filter(|rule| rule.mandatory).count();
        if mandatory > 1 {
            tracing::warn!(mandatory, "more than one mandatory rule; only the first is honored");
        }

        if let Some(entry) = self.probabilities.iter().find(|entry| entry.probability < 0.0) {
            return Err(ConfigError::Negative { field: "probability", value: entry.probability });
        }

        for bucket in &self.combat_buckets {
            bucket.validate()?;
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> ContentParts {
        let mut catalog = RoomCatalog::new();
        let start_layout = catalog.set_start(self.start_layout);
        for def in self.layouts {
            catalog.insert(def);
        }
        for def in self.terminal_layouts {
            catalog.insert_terminal(def);
        }
        ContentParts {
            catalog,
            start_layout,
            rules: ProgressionRuleSet::new(self.rules, self.probabilities, self.adjacency),
            combat: CombatContentGenerator::new(self.combat_buckets),
        }
    }
}

fn square(
    name: &str,
    room_type: RoomType,
    directions: &[Direction],
    volumes: &[(Vec2, Vec2)],
) -> LayoutDef {
    LayoutDef {
        name: name.to_string(),
        room_type,
        exits: directions
            .iter()
            .map(|direction| ExitSocket {
                direction: *direction,
                offset: direction.unit() * ROOM_HALF_SIZE,
            })
            .collect(),
        spawn_volumes: volumes
            .iter()
            .map(|(center, half_extents)| SpawnVolume { center: *center, half_extents: *half_extents })
            .collect(),
        weight: 1.0,
    }
}

fn rule(room_type: RoomType, min_depth: u32, max_depth: u32) -> ProgressionRule {
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

fn probability(room_type: RoomType, probability: f32, luck_affected: bool) -> RoomTypeProbability {
    RoomTypeProbability { room_type, probability, luck_affected }
}

fn successors(from: RoomType, allowed: &[RoomType]) -> SuccessorRule {
    SuccessorRule { from, allowed: allowed.to_vec() }
}

fn enemy(name: &str, spawn_weight: f32) -> WeightedEnemy {
    WeightedEnemy { enemy: name.to_string(), spawn_weight }
}

fn combination(name: &str, waves: &[&[(&str, u32)]]) -> EnemyCombination {
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
