use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct LayoutId;
    pub struct RoomId;
    pub struct ExitId;
}

/// Index of a rule inside its `ProgressionRuleSet`, stable for the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleIndex(pub usize);

/// Opaque handle returned by the world collaborator for an instantiated room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomHandle(pub u64);

/// Opaque handle returned by the transition host for a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit step in world space; north is +y.
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::North => Vec2 { x: 0.0, y: 1.0 },
            Direction::East => Vec2 { x: 1.0, y: 0.0 },
            Direction::South => Vec2 { x: 0.0, y: -1.0 },
            Direction::West => Vec2 { x: -1.0, y: 0.0 },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 { x: self.x * rhs, y: self.y * rhs }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Start,
    Combat,
    Shop,
    Treasure,
    Rest,
    Event,
    Boss,
    Terminal,
}

impl RoomType {
    /// Types the selector may hand out for regular expansion.
    pub const REGULAR: [RoomType; 6] = [
        RoomType::Combat,
        RoomType::Shop,
        RoomType::Treasure,
        RoomType::Rest,
        RoomType::Event,
        RoomType::Boss,
    ];

    pub fn is_regular(self) -> bool {
        !matches!(self, RoomType::Start | RoomType::Terminal)
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            RoomType::Start => 0,
            RoomType::Combat => 1,
            RoomType::Shop => 2,
            RoomType::Treasure => 3,
            RoomType::Rest => 4,
            RoomType::Event => 5,
            RoomType::Boss => 6,
            RoomType::Terminal => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_pairs_north_south_and_east_west() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn unit_vectors_of_opposites_cancel_out() {
        for direction in Direction::ALL {
            let sum = direction.unit() + direction.opposite().unit();
            assert_eq!(sum, Vec2::ZERO);
        }
    }
}
