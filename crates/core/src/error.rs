//! Error taxonomy for configuration, placement and expansion failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::de;

use crate::types::{Direction, ExitId, LayoutId, RoomId, RoomType};

/// Authoring or configuration problems found before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] de::Error),

    #[error("room count range is inverted or empty: [{min}, {max}]")]
    InvalidRoomRange { min: u32, max: u32 },

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("rule for {room_type:?} has an inverted depth range [{min}, {max}]")]
    InvalidDepthRange { room_type: RoomType, min: u32, max: u32 },

    #[error("rule for {room_type:?} references a room type with no layouts")]
    RuleWithoutLayouts { room_type: RoomType },

    #[error("{room_type:?} is not a selectable room type")]
    NotSelectable { room_type: RoomType },

    #[error("combat bucket [{start}, {end}] {reason}")]
    InvalidBucket { start: u32, end: u32, reason: &'static str },

    #[error("no start layout configured")]
    MissingStartLayout,

    #[error("no terminal layouts configured")]
    MissingTerminalLayout,

    #[error("layout '{name}' has no exits")]
    LayoutWithoutExits { name: String },
}

/// Why a candidate room could not be placed at an exit. Recoverable: the
/// caller retries with a new draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("exit {0:?} does not exist")]
    UnknownExit(ExitId),

    #[error("exit {0:?} is already connected")]
    ExitAlreadyConnected(ExitId),

    #[error("layout {layout:?} has no unconnected {required:?} exit")]
    NoMatchingExit { layout: LayoutId, required: Direction },

    #[error("candidate is {distance:.2} from room {room:?}, minimum is {minimum:.2}")]
    TooClose { room: RoomId, distance: f32, minimum: f32 },
}

/// Failures surfaced by the orchestrator to its caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("the initial room has not been generated yet")]
    NotStarted,

    #[error("the initial room was already generated")]
    AlreadyStarted,

    #[error("exit {0:?} does not exist")]
    UnknownExit(ExitId),

    #[error("room {0:?} does not exist")]
    UnknownRoom(RoomId),

    #[error("layout {0:?} is not in the catalog")]
    UnknownLayout(LayoutId),

    #[error("no room could be placed at exit {exit:?} after {attempts} attempts")]
    AttemptsExhausted { exit: ExitId, attempts: u32 },
}
