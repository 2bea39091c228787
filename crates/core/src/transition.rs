//! Per-room sequence after the player enters: lock doors, fade, teleport,
//! unlock the entrance or run the combat waves, then report completion.
//! This module exists to pace a room independently of graph growth.
//! It does not own room selection, placement or exit arming.

use crate::catalog::SpawnVolume;
use crate::combat::CombatContent;
use crate::config::TransitionTimings;
use crate::rng::GenRng;
use crate::types::{EnemyHandle, RoomId, RoomType, Vec2};
use crate::world::{RunObserver, TransitionCue, TransitionHost};

/// Everything a transition needs, captured when it is created.
#[derive(Clone, Debug)]
pub struct TransitionSetup {
    pub room: RoomId,
    pub room_type: RoomType,
    pub origin: Vec2,
    pub arrival: Vec2,
    /// Spawn areas already translated to world space.
    pub spawn_volumes: Vec<SpawnVolume>,
    pub combat: Option<CombatContent>,
    pub timings: TransitionTimings,
    pub rng: GenRng,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionPhase {
    Pending,
    FadingOut { remaining: f32 },
    FadingIn { remaining: f32 },
    EntranceLocked { remaining: f32 },
    SpawningWave { wave: usize },
    AwaitingClear { wave: usize },
    WaveDelay { next_wave: usize, remaining: f32 },
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionStatus {
    Running(TransitionPhase),
    Completed { room: RoomId, elapsed_secs: f32 },
}

#[derive(Clone, Debug)]
pub struct RoomTransition {
    setup: TransitionSetup,
    phase: TransitionPhase,
    clock: f32,
    entered_at: Option<f32>,
    elapsed_secs: f32,
    alive: Vec<EnemyHandle>,
    spawned: usize,
    force_cleared: bool,
}

impl RoomTransition {
    pub fn new(setup: TransitionSetup) -> Self {
        Self {
            setup,
            phase: TransitionPhase::Pending,
            clock: 0.0,
            entered_at: None,
            elapsed_secs: 0.0,
            alive: Vec::new(),
            spawned: 0,
            force_cleared: false,
        }
    }

    pub fn room(&self) -> RoomId {
        self.setup.room
    }

    pub fn room_type(&self) -> RoomType {
        self.setup.room_type
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == TransitionPhase::Complete
    }

    pub fn is_combat(&self) -> bool {
        self.wave_count() > 0
    }

    pub fn alive_enemies(&self) -> usize {
        self.alive.len()
    }

    /// Treats the current wave as defeated on the next `advance`.
    pub fn force_clear(&mut self) {
        self.force_cleared = true;
        self.alive.clear();
    }

    /// Moves the sequence forward by `dt` seconds. Time left over when a
    /// timed phase ends carries into the next phase within the same call.
    pub fn advance(
        &mut self,
        dt: f32,
        host: &mut impl TransitionHost,
        observer: &mut impl RunObserver,
    ) -> TransitionStatus {
        let dt = dt.max(0.0);
        let start = self.clock;
        self.clock += dt;
        let mut budget = dt;
        let room = self.setup.room;

        loop {
            match self.phase {
                TransitionPhase::Pending => {
                    host.lock_doors(room);
                    host.play_transition(TransitionCue::FadeOut);
                    self.phase =
                        TransitionPhase::FadingOut { remaining: self.setup.timings.fade_out_secs };
                }
                TransitionPhase::FadingOut { remaining } => {
                    if let Some(remaining) = consume(&mut budget, remaining) {
                        self.phase = TransitionPhase::FadingOut { remaining };
                        break;
                    }
                    host.move_player(room, self.setup.arrival);
                    host.play_transition(TransitionCue::FadeIn);
                    self.phase =
                        TransitionPhase::FadingIn { remaining: self.setup.timings.fade_in_secs };
                }
                TransitionPhase::FadingIn { remaining } => {
                    if let Some(remaining) = consume(&mut budget, remaining) {
                        self.phase = TransitionPhase::FadingIn { remaining };
                        break;
                    }
                    self.entered_at = Some(start + (dt - budget));
                    observer.room_entered(self.setup.room_type);
                    self.phase = TransitionPhase::EntranceLocked {
                        remaining: self.setup.timings.entrance_unlock_delay_secs,
                    };
                }
                TransitionPhase::EntranceLocked { remaining } => {
                    if let Some(remaining) = consume(&mut budget, remaining) {
                        self.phase = TransitionPhase::EntranceLocked { remaining };
                        break;
                    }
                    host.unlock_entrance(room);
                    self.phase = if self.is_combat() {
                        TransitionPhase::SpawningWave { wave: 0 }
                    } else {
                        self.finish(start + (dt - budget), host, observer)
                    };
                }
                TransitionPhase::SpawningWave { wave } => {
                    self.spawn_wave(wave, host);
                    self.phase = TransitionPhase::AwaitingClear { wave };
                }
                TransitionPhase::AwaitingClear { wave } => {
                    self.alive.retain(|enemy| host.is_alive(*enemy));
                    if !self.force_cleared && !self.alive.is_empty() {
                        break;
                    }
                    self.force_cleared = false;
                    let next_wave = wave + 1;
                    self.phase = if next_wave < self.wave_count() {
                        tracing::debug!(?room, cleared = wave, "wave cleared");
                        TransitionPhase::WaveDelay { next_wave, remaining: self.wave_delay() }
                    } else {
                        self.finish(start + (dt - budget), host, observer)
                    };
                }
                TransitionPhase::WaveDelay { next_wave, remaining } => {
                    if let Some(remaining) = consume(&mut budget, remaining) {
                        self.phase = TransitionPhase::WaveDelay { next_wave, remaining };
                        break;
                    }
                    self.phase = TransitionPhase::SpawningWave { wave: next_wave };
                }
                TransitionPhase::Complete => {
                    return TransitionStatus::Completed { room, elapsed_secs: self.elapsed_secs };
                }
            }
        }
        TransitionStatus::Running(self.phase)
    }

    fn finish(
        &mut self,
        now: f32,
        host: &mut impl TransitionHost,
        observer: &mut impl RunObserver,
    ) -> TransitionPhase {
        host.unlock_doors(self.setup.room);
        self.elapsed_secs = now - self.entered_at.unwrap_or(now);
        observer.room_completed(self.setup.room_type, self.elapsed_secs);
        tracing::debug!(
            room = ?self.setup.room,
            room_type = ?self.setup.room_type,
            elapsed_secs = self.elapsed_secs,
            "room sequence complete"
        );
        TransitionPhase::Complete
    }

    fn spawn_wave(&mut self, wave: usize, host: &mut impl TransitionHost) {
        let enemies = self
            .setup
            .combat
            .as_ref()
            .and_then(|content| content.waves.get(wave))
            .map(|wave| wave.enemies.clone())
            .unwrap_or_default();
        for enemy in &enemies {
            let position = self.next_spawn_point();
            self.alive.push(host.spawn_enemy(enemy, position));
        }
        tracing::debug!(room = ?self.setup.room, wave, enemies = enemies.len(), "wave spawned");
    }

    /// Round-robin over the spawn volumes with a uniform offset inside each;
    /// rooms without volumes spawn at their origin.
    fn next_spawn_point(&mut self) -> Vec2 {
        let volumes = &self.setup.spawn_volumes;
        if volumes.is_empty() {
            return self.setup.origin;
        }
        let volume = volumes[self.spawned % volumes.len()];
        self.spawned += 1;
        let rng = &mut self.setup.rng;
        let jitter_x = (rng.unit_f32() * 2.0 - 1.0) * volume.half_extents.x;
        let jitter_y = (rng.unit_f32() * 2.0 - 1.0) * volume.half_extents.y;
        volume.center + Vec2::new(jitter_x, jitter_y)
    }

    fn wave_count(&self) -> usize {
        self.setup.combat.as_ref().map_or(0, CombatContent::wave_count)
    }

    fn wave_delay(&self) -> f32 {
        self.setup.combat.as_ref().map_or(0.0, |content| content.wave_delay_secs.max(0.0))
    }
}

/// Spends up to `remaining` seconds of `budget`. Returns what is left of the
/// phase when the budget runs out first.
fn consume(budget: &mut f32, remaining: f32) -> Option<f32> {
    if remaining > *budget {
        let left = remaining - *budget;
        *budget = 0.0;
        Some(left)
    } else {
        *budget -= remaining.max(0.0);
        None
    }
}
