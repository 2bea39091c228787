//! Headless driver that plays a run without a game engine: it picks armed
//! exits at random, crosses them, and runs each room's sequence to the end
//! with every enemy defeated on the spot.

use std::collections::BTreeSet;

use crate::generator::{DungeonGenerator, ExpansionOutcome, GeneratorPhase};
use crate::rng::GenRng;
use crate::transition::TransitionStatus;
use crate::types::{EnemyHandle, ExitId, RoomId, Vec2};
use crate::world::{RoomWorld, RunObserver, TransitionCue, TransitionHost};

/// Seconds simulated per transition tick.
const TICK_SECS: f32 = 0.25;
const MAX_TICKS_PER_ROOM: u32 = 10_000;

/// `TransitionHost` that tracks the player and enemies without simulating
/// them. Enemies stay alive until `defeat_all`.
#[derive(Clone, Debug, Default)]
pub struct HeadlessHost {
    pub player: Option<(RoomId, Vec2)>,
    pub locked: BTreeSet<RoomId>,
    pub entrances_open: BTreeSet<RoomId>,
    pub enemies_spawned: u64,
    pub fades: u32,
    alive: BTreeSet<u64>,
}

impl HeadlessHost {
    pub fn defeat_all(&mut self) {
        self.alive.clear();
    }
}

impl TransitionHost for HeadlessHost {
    fn lock_doors(&mut self, room: RoomId) {
        self.locked.insert(room);
    }

    fn unlock_entrance(&mut self, room: RoomId) {
        self.entrances_open.insert(room);
    }

    fn unlock_doors(&mut self, room: RoomId) {
        self.locked.remove(&room);
    }

    fn play_transition(&mut self, _cue: TransitionCue) {
        self.fades += 1;
    }

    fn move_player(&mut self, room: RoomId, position: Vec2) {
        self.player = Some((room, position));
    }

    fn spawn_enemy(&mut self, _prefab: &str, _position: Vec2) -> EnemyHandle {
        self.enemies_spawned += 1;
        self.alive.insert(self.enemies_spawned);
        EnemyHandle(self.enemies_spawned)
    }

    fn is_alive(&self, enemy: EnemyHandle) -> bool {
        self.alive.contains(&enemy.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub crossings: u32,
    pub rooms_placed: u32,
    pub rooms_completed: u32,
    pub failed_exits: Vec<ExitId>,
    pub reached_terminal: bool,
}

/// Walks the run until the terminal room is placed, no armed exit is left,
/// or `max_crossings` is reached. The start room must already exist.
pub fn auto_walk(
    generator: &mut DungeonGenerator,
    world: &mut impl RoomWorld,
    host: &mut HeadlessHost,
    observer: &mut impl RunObserver,
    walk_seed: u64,
    max_crossings: u32,
) -> WalkReport {
    let mut rng = GenRng::from_seed(walk_seed);
    let mut report = WalkReport::default();

    while report.crossings < max_crossings && generator.phase() == GeneratorPhase::Expanding {
        let candidates: Vec<ExitId> = generator
            .graph()
            .open_exits()
            .filter(|point| point.armed && !report.failed_exits.contains(&point.id))
            .map(|point| point.id)
            .collect();
        let Some(&exit) = rng.choose(&candidates) else {
            break;
        };
        report.crossings += 1;

        let room = match generator.on_player_crossed_exit(exit, world, observer) {
            Ok(ExpansionOutcome::Placed { room, .. }) => room,
            Ok(ExpansionOutcome::Terminal { room, .. }) => {
                report.reached_terminal = true;
                room
            }
            Ok(ExpansionOutcome::Ignored(reason)) => {
                tracing::debug!(?exit, ?reason, "crossing ignored");
                continue;
            }
            Err(_) => {
                report.failed_exits.push(exit);
                continue;
            }
        };
        report.rooms_placed += 1;

        if play_room(generator, room, host, observer) {
            report.rooms_completed += 1;
        }
        if let Err(error) = generator.complete_room(room) {
            tracing::warn!(?room, %error, "could not arm exits");
        }
    }
    report
}

fn play_room(
    generator: &DungeonGenerator,
    room: RoomId,
    host: &mut HeadlessHost,
    observer: &mut impl RunObserver,
) -> bool {
    let mut transition = match generator.begin_transition(room) {
        Ok(transition) => transition,
        Err(error) => {
            tracing::warn!(?room, %error, "room sequence could not start");
            return false;
        }
    };
    for _ in 0..MAX_TICKS_PER_ROOM {
        host.defeat_all();
        if let TransitionStatus::Completed { .. } = transition.advance(TICK_SECS, host, observer) {
            return true;
        }
    }
    tracing::warn!(?room, "room sequence did not finish");
    false
}
