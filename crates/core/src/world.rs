//! Seams to the collaborators the engine does not own: world placement,
//! the in-room presentation/combat host, and telemetry.

use crate::catalog::RoomLayout;
use crate::error::GenerationError;
use crate::types::{Direction, EnemyHandle, ExitId, RoomHandle, RoomId, RoomType, Vec2};

/// World-placement primitive.
pub trait RoomWorld {
    fn instantiate_room(&mut self, room: RoomId, layout: &RoomLayout, position: Vec2) -> RoomHandle;
    fn destroy_room(&mut self, handle: RoomHandle);
    /// Attaches the volume that reports the player reaching `exit`.
    fn attach_exit_trigger(&mut self, exit: ExitId, position: Vec2, direction: Direction);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionCue {
    FadeOut,
    FadeIn,
}

/// Presentation and combat side of a room transition.
pub trait TransitionHost {
    fn lock_doors(&mut self, room: RoomId);
    /// Opens only the door the player came through; the rest stay locked
    /// until `unlock_doors`.
    fn unlock_entrance(&mut self, room: RoomId);
    fn unlock_doors(&mut self, room: RoomId);
    fn play_transition(&mut self, cue: TransitionCue);
    fn move_player(&mut self, room: RoomId, position: Vec2);
    fn spawn_enemy(&mut self, prefab: &str, position: Vec2) -> EnemyHandle;
    fn is_alive(&self, enemy: EnemyHandle) -> bool;
}

/// Outbound events for UI and telemetry.
pub trait RunObserver {
    fn room_entered(&mut self, _room_type: RoomType) {}
    fn room_completed(&mut self, _room_type: RoomType, _elapsed_secs: f32) {}
    fn expansion_failed(&mut self, _error: &GenerationError) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// A room the headless world was asked to instantiate.
#[derive(Clone, Debug, PartialEq)]
pub struct InstantiatedRoom {
    pub handle: RoomHandle,
    pub room: RoomId,
    pub layout_name: String,
    pub position: Vec2,
}

/// In-memory `RoomWorld` that records every request; used by the tools and
/// by tests.
#[derive(Clone, Debug, Default)]
pub struct HeadlessWorld {
    pub instances: Vec<InstantiatedRoom>,
    pub destroyed: Vec<RoomHandle>,
    pub triggers: Vec<(ExitId, Vec2, Direction)>,
    next_handle: u64,
}

impl HeadlessWorld {
    pub fn live_instances(&self) -> usize {
        self.instances.iter().filter(|instance| !self.destroyed.contains(&instance.handle)).count()
    }
}

impl RoomWorld for HeadlessWorld {
    fn instantiate_room(&mut self, room: RoomId, layout: &RoomLayout, position: Vec2) -> RoomHandle {
        self.next_handle += 1;
        let handle = RoomHandle(self.next_handle);
        self.instances.push(InstantiatedRoom {
            handle,
            room,
            layout_name: layout.name.clone(),
            position,
        });
        handle
    }

    fn destroy_room(&mut self, handle: RoomHandle) {
        self.destroyed.push(handle);
    }

    fn attach_exit_trigger(&mut self, exit: ExitId, position: Vec2, direction: Direction) {
        self.triggers.push((exit, position, direction));
    }
}
