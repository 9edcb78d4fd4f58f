use thiserror::Error;

use crate::event::EventKind;
use crate::hooks::HookPoint;
use crate::instance::{InstanceError, InstanceId};

/// Everything that can abort a room transition or a frame.
///
/// None of these are recovered from inside the core: the operation in progress
/// stops at the first failure and the error is handed back to the host as-is.
/// A close request from the renderer is not an error; see `FrameOutcome::Close`.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("room {0} does not exist")]
    MissingRoom(usize),

    #[error("object {0} does not exist")]
    MissingObject(usize),

    #[error("sprite {0} does not exist")]
    MissingSprite(i32),

    #[error("sprite {0} has no frames")]
    EmptySprite(i32),

    #[error("room order is empty, there is no room to start in")]
    EmptyRoomOrder,

    #[error("failed to create instance: {0}")]
    InstanceCreation(#[from] InstanceError),

    #[error("{event} failed for {}: {source}", describe_target(.target))]
    Script {
        event: EventKind,
        target: Option<InstanceId>,
        source: ScriptError,
    },

    #[error("frame hook {point:?} failed: {message}")]
    Hook { point: HookPoint, message: String },
}

/// Failure reported by an `ActionRunner`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

impl From<GameError> for ScriptError {
    fn from(err: GameError) -> Self {
        Self(err.to_string())
    }
}

fn describe_target(target: &Option<InstanceId>) -> String {
    match target {
        Some(id) => format!("instance {id}"),
        None => "room".to_string(),
    }
}
