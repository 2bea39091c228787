pub mod catalog;
pub mod combat;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod graph;
mod hash;
pub mod progression;
pub mod rng;
pub mod selector;
pub mod sim;
pub mod state;
pub mod summary;
pub mod transition;
pub mod types;
mod weighted;
pub mod world;

#[cfg(test)]
mod test_support;

pub use catalog::{ExitSocket, LayoutDef, RoomCatalog, RoomLayout, SpawnVolume};
pub use combat::{CombatBucket, CombatContent, CombatContentGenerator, ContentMode, EnemyWave};
pub use config::{GenerationConfig, TransitionTimings};
pub use content::DungeonContent;
pub use error::{ConfigError, GenerationError, PlacementError};
pub use generator::{DungeonGenerator, ExpansionOutcome, GeneratorPhase, IgnoreReason};
pub use graph::{ConnectionPoint, PlacedRoom, RoomGraph};
pub use progression::{AdjacencyTable, ProgressionRule, ProgressionRuleSet, RoomTypeProbability};
pub use sim::{HeadlessHost, WalkReport, auto_walk};
pub use state::GenerationState;
pub use summary::RunSummary;
pub use transition::{RoomTransition, TransitionPhase, TransitionStatus};
pub use types::*;
pub use world::{HeadlessWorld, NoopObserver, RoomWorld, RunObserver, TransitionCue, TransitionHost};
