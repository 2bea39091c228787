//! Mutable bookkeeping for one run: target size, the pending mandatory slot,
//! consumed one-shot rules and exits that could not be expanded.
//! This module exists so selection can read run progress without borrowing
//! the generator. It does not own the graph or the random stream.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{ExitId, RoomType, RuleIndex};

/// The depth chosen for the mandatory rule and whether it has been honored.
/// The slot stays due from `depth` up to `max_depth`, so a draw that fails
/// placement at the chosen depth is retried on the following expansions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MandatorySlot {
    pub rule: RuleIndex,
    pub room_type: RoomType,
    pub depth: u32,
    pub max_depth: u32,
    pub placed: bool,
}

impl MandatorySlot {
    pub fn is_due(&self, depth: u32) -> bool {
        !self.placed && (self.depth..=self.max_depth).contains(&depth)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationState {
    /// Regular rooms, the start room included, to place before the terminal.
    pub target_room_count: u32,
    pub regular_rooms: u32,
    pub mandatory: Option<MandatorySlot>,
    pub probable_mandatory_generated: bool,
    pub consumed_once: BTreeSet<RuleIndex>,
    pub stuck_exits: Vec<ExitId>,
    pub terminal_placed: bool,
}

impl GenerationState {
    pub fn new(target_room_count: u32) -> Self {
        Self { target_room_count, ..Self::default() }
    }

    /// Depth of the next room to be placed; the start room sits at zero.
    pub fn next_depth(&self) -> u32 {
        self.regular_rooms
    }

    pub fn target_reached(&self) -> bool {
        self.regular_rooms >= self.target_room_count
    }

    pub fn is_consumed(&self, rule: RuleIndex) -> bool {
        self.consumed_once.contains(&rule)
    }

    pub fn mandatory_due(&self, depth: u32) -> Option<&MandatorySlot> {
        self.mandatory.as_ref().filter(|slot| slot.is_due(depth))
    }

    /// The mandatory type is kept out of every other selection path.
    pub fn mandatory_type(&self) -> Option<RoomType> {
        self.mandatory.map(|slot| slot.room_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandatory_slot_is_due_until_placed_or_window_closes() {
        let mut slot = MandatorySlot {
            rule: RuleIndex(2),
            room_type: RoomType::Boss,
            depth: 5,
            max_depth: 7,
            placed: false,
        };
        assert!(!slot.is_due(4));
        assert!(slot.is_due(5));
        assert!(slot.is_due(7));
        assert!(!slot.is_due(8));
        slot.placed = true;
        assert!(!slot.is_due(6));
    }

    #[test]
    fn start_room_counts_toward_the_target() {
        let mut state = GenerationState::new(3);
        assert_eq!(state.next_depth(), 0);
        state.regular_rooms = 3;
        assert!(state.target_reached());
    }
}
