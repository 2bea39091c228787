//! Encounter content for combat rooms: wave schedules built procedurally from
//! depth-indexed enemy pools, from authored combinations, or a mix of both.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rng::GenRng;
use crate::weighted::cumulative_pick;

/// Rooms into a bucket after which per-wave counts stop growing.
const PROGRESS_SATURATION_DEPTH: f32 = 10.0;
const DEFAULT_WAVE_DELAY_SECS: f32 = 1.5;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    pub enemies: Vec<String>,
}

impl EnemyWave {
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatContent {
    pub waves: Vec<EnemyWave>,
    #[serde(default = "default_wave_delay")]
    pub wave_delay_secs: f32,
}

fn default_wave_delay() -> f32 {
    DEFAULT_WAVE_DELAY_SECS
}

impl Default for CombatContent {
    fn default() -> Self {
        Self { waves: Vec::new(), wave_delay_secs: DEFAULT_WAVE_DELAY_SECS }
    }
}

impl CombatContent {
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.waves.iter().map(EnemyWave::len).sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentMode {
    #[default]
    ProceduralFromPool,
    PredefinedCombination,
    CombinationAndProcedural,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedEnemy {
    pub enemy: String,
    pub spawn_weight: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyGroup {
    pub enemy: String,
    pub count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveTemplate {
    pub groups: Vec<EnemyGroup>,
}

impl WaveTemplate {
    fn to_wave(&self) -> EnemyWave {
        let enemies = self
            .groups
            .iter()
            .flat_map(|group| (0..group.count).map(|_| group.enemy.clone()))
            .collect();
        EnemyWave { enemies }
    }
}

/// An authored encounter: explicit enemy groups for each wave, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyCombination {
    pub name: String,
    pub waves: Vec<WaveTemplate>,
}

/// Encounter configuration for a depth window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatBucket {
    pub start_depth: u32,
    pub end_depth: u32,
    #[serde(default)]
    pub mode: ContentMode,
    #[serde(default)]
    pub enemy_pool: Vec<WeightedEnemy>,
    pub min_waves: u32,
    pub max_waves: u32,
    pub min_per_wave: u32,
    pub max_per_wave: u32,
    #[serde(default)]
    pub combinations: Vec<EnemyCombination>,
    #[serde(default = "default_wave_delay")]
    pub wave_delay_secs: f32,
}

impl CombatBucket {
    pub fn contains(&self, depth: u32) -> bool {
        (self.start_depth..=self.end_depth).contains(&depth)
    }

    /// Rejects buckets that could schedule fewer waves than `min_waves` or
    /// waves without enemies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidBucket {
            start: self.start_depth,
            end: self.end_depth,
            reason,
        };
        if self.start_depth > self.end_depth {
            return Err(invalid("has an inverted depth range"));
        }
        if self.min_waves == 0 || self.min_waves > self.max_waves {
            return Err(invalid("needs 1 <= min_waves <= max_waves"));
        }
        if self.max_per_wave == 0 || self.min_per_wave > self.max_per_wave {
            return Err(invalid("needs min_per_wave <= max_per_wave and max_per_wave >= 1"));
        }
        if self.draws_from_pool() && self.enemy_pool.is_empty() {
            return Err(invalid("draws procedural waves from an empty enemy pool"));
        }
        for combination in &self.combinations {
            if combination.waves.is_empty() {
                return Err(invalid("has a combination without waves"));
            }
            if combination.waves.iter().any(|wave| wave.groups.is_empty()) {
                return Err(invalid("has a combination wave without enemy groups"));
            }
            if combination.waves.iter().flat_map(|wave| &wave.groups).any(|group| group.count == 0) {
                return Err(invalid("has an enemy group with a count of zero"));
            }
        }
        Ok(())
    }

    /// Predefined buckets only fall back to the pool when they have no
    /// combinations.
    fn draws_from_pool(&self) -> bool {
        self.mode != ContentMode::PredefinedCombination || self.combinations.is_empty()
    }

    /// Enemies per wave, growing from `min_per_wave` to `max_per_wave` over
    /// the first rooms of the bucket. Never below one.
    pub fn enemies_per_wave(&self, depth: u32) -> u32 {
        let progress = (depth.saturating_sub(self.start_depth) as f32 / PROGRESS_SATURATION_DEPTH)
            .clamp(0.0, 1.0);
        let low = self.min_per_wave as f32;
        let high = self.max_per_wave as f32;
        let count = (low + (high - low) * progress).round() as u32;
        let floor = self.min_per_wave.min(self.max_per_wave).max(1);
        let ceiling = self.min_per_wave.max(self.max_per_wave).max(1);
        count.clamp(floor, ceiling)
    }

    fn procedural_wave(&self, depth: u32, rng: &mut GenRng) -> EnemyWave {
        if self.enemy_pool.is_empty() {
            tracing::warn!(
                depth,
                start_depth = self.start_depth,
                "combat bucket has an empty enemy pool; wave left empty"
            );
            return EnemyWave::default();
        }
        let weights: Vec<f32> = self.enemy_pool.iter().map(|entry| entry.spawn_weight).collect();
        if !weights.iter().any(|weight| *weight > 0.0) {
            tracing::warn!(
                depth,
                start_depth = self.start_depth,
                "enemy spawn weights sum to zero; drawing enemies uniformly"
            );
        }
        let count = self.enemies_per_wave(depth);
        let mut enemies = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let index = match cumulative_pick(&weights, rng) {
                Some(index) => index,
                None => rng.index(self.enemy_pool.len()),
            };
            enemies.push(self.enemy_pool[index].enemy.clone());
        }
        EnemyWave { enemies }
    }

    fn wave_count(&self, rng: &mut GenRng) -> u32 {
        rng.range_inclusive(self.min_waves.max(1), self.max_waves.max(self.min_waves.max(1)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatContentGenerator {
    buckets: Vec<CombatBucket>,
}

impl CombatContentGenerator {
    pub fn new(buckets: Vec<CombatBucket>) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &[CombatBucket] {
        &self.buckets
    }

    pub fn bucket_for(&self, depth: u32) -> Option<&CombatBucket> {
        self.buckets.iter().find(|bucket| bucket.contains(depth))
    }

    /// Builds the wave schedule for a combat room at `depth`. Authored rule
    /// content wins over the buckets. An empty schedule means no bucket
    /// covers the depth.
    pub fn generate(
        &self,
        depth: u32,
        rule_content: Option<&CombatContent>,
        rng: &mut GenRng,
    ) -> CombatContent {
        if let Some(content) = rule_content.filter(|content| !content.is_empty()) {
            return content.clone();
        }

        let Some(bucket) = self.bucket_for(depth) else {
            tracing::warn!(depth, "no combat bucket covers this depth; room has no waves");
            return CombatContent::default();
        };

        let waves = match bucket.mode {
            ContentMode::ProceduralFromPool => procedural_waves(bucket, depth, rng),
            ContentMode::PredefinedCombination => match rng.choose(&bucket.combinations) {
                Some(combination) => combination.waves.iter().map(WaveTemplate::to_wave).collect(),
                None => {
                    tracing::warn!(depth, "predefined mode without combinations; using enemy pool");
                    procedural_waves(bucket, depth, rng)
                }
            },
            ContentMode::CombinationAndProcedural => mixed_waves(bucket, depth, rng),
        };

        let scheduled = waves.len();
        let waves: Vec<EnemyWave> = waves.into_iter().filter(|wave| !wave.is_empty()).collect();
        if waves.len() < scheduled {
            tracing::warn!(
                depth,
                start_depth = bucket.start_depth,
                dropped = scheduled - waves.len(),
                "combat bucket produced empty waves; they were dropped"
            );
        }
        tracing::debug!(
            depth,
            mode = ?bucket.mode,
            waves = waves.len(),
            "generated combat content"
        );
        CombatContent { waves, wave_delay_secs: bucket.wave_delay_secs }
    }
}

fn procedural_waves(bucket: &CombatBucket, depth: u32, rng: &mut GenRng) -> Vec<EnemyWave> {
    let wave_count = bucket.wave_count(rng);
    (0..wave_count).map(|_| bucket.procedural_wave(depth, rng)).collect()
}

fn mixed_waves(bucket: &CombatBucket, depth: u32, rng: &mut GenRng) -> Vec<EnemyWave> {
    if bucket.combinations.is_empty() {
        tracing::warn!(depth, "mixed mode without combinations; using enemy pool");
        return procedural_waves(bucket, depth, rng);
    }
    let wave_count = bucket.wave_count(rng);
    let mut waves = Vec::with_capacity(wave_count as usize);
    for _ in 0..wave_count {
        let predefined = if rng.coin_flip() {
            rng.choose(&bucket.combinations)
                .and_then(|combination| rng.choose(&combination.waves))
                .map(WaveTemplate::to_wave)
        } else {
            None
        };
        waves.push(predefined.unwrap_or_else(|| bucket.procedural_wave(depth, rng)));
    }
    waves
}
