//! Frame state machine and instance lifecycle for a GameMaker 8 style runtime.
//!
//! `Game` owns the instance table and globals and drives the two operations the
//! rest of the runtime is built around: `load_room` (leave the current room and
//! enter another) and `frame` (advance the world by one tick). Asset storage,
//! action execution and rendering are collaborators supplied by the host.

pub mod assets;
pub mod error;
pub mod event;
pub mod game;
pub mod hooks;
pub mod instance;
pub mod motion;
pub mod render;
pub mod runner;
pub mod time;
pub mod world;

#[cfg(test)]
mod testing;

pub use assets::{load_game_from_path, Action, Assets, Colour, Object, Room, Sprite, SpriteFrame};
pub use error::{GameError, ScriptError};
pub use event::EventKind;
pub use game::{FrameOutcome, Game};
pub use hooks::{FrameHooks, HookPoint, NoHooks};
pub use instance::{Instance, InstanceError, InstanceId, InstanceList};
pub use render::{DrawParams, Renderer};
pub use runner::{ActionRunner, ScriptContext};
pub use world::{Globals, SessionRequests, World};
