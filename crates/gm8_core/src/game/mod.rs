//! The game session: room transitions and the per-frame state machine.
//!
//! Both entry points are synchronous and fail-fast. The first failing step
//! aborts the whole operation with no rollback, and the error is returned to
//! the host to decide what happens to the session.
//!
//! Frame order:
//!
//!   Draw -> (present, close check) -> BeginStep -> Step -> Movement -> EndStep -> Cleanup
//!
//! with `FrameHooks` slots in between for the event families that are not
//! dispatched here.

mod dispatch;
mod frame;
mod room;

use crate::assets::Assets;
use crate::error::GameError;
use crate::hooks::{FrameHooks, NoHooks};
use crate::instance::InstanceList;
use crate::render::Renderer;
use crate::runner::ActionRunner;
use crate::world::{Globals, SessionRequests, World};

/// Result of a frame that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The session should end: the renderer asked to close, or a script
    /// called for the game to end.
    Close,
}

pub struct Game<R: ActionRunner, D: Renderer> {
    assets: Assets,
    world: World,
    runner: R,
    renderer: D,
    hooks: Box<dyn FrameHooks>,
    frame_count: u64,
}

impl<R: ActionRunner, D: Renderer> Game<R, D> {
    pub fn new(assets: Assets, runner: R, renderer: D) -> Self {
        let mut world = World::new();
        if let Some(last) = assets.last_instance_id() {
            world.instances.reserve_ids_through(last);
        }
        Self {
            assets,
            world,
            runner,
            renderer,
            hooks: Box::new(NoHooks),
            frame_count: 0,
        }
    }

    pub fn with_hooks(mut self, hooks: impl FrameHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn instances(&self) -> &InstanceList {
        &self.world.instances
    }

    pub fn instances_mut(&mut self) -> &mut InstanceList {
        &mut self.world.instances
    }

    pub fn globals(&self) -> &Globals {
        self.world.globals()
    }

    pub fn pending_requests(&self) -> &SessionRequests {
        &self.world.requests
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    pub fn renderer(&self) -> &D {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut D {
        &mut self.renderer
    }

    /// Frames completed since the session started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Enter `room`, or the first room in the room order.
    pub fn start(&mut self, room: Option<usize>) -> Result<(), GameError> {
        let room = match room {
            Some(room) => room,
            None => self.assets.first_room().ok_or(GameError::EmptyRoomOrder)?,
        };
        self.load_room(room)
    }

    /// One frame, then whatever the frame's scripts asked for: a pending end
    /// closes the session, a pending room change is loaded.
    pub fn tick(&mut self) -> Result<FrameOutcome, GameError> {
        if self.frame()? == FrameOutcome::Close {
            return Ok(FrameOutcome::Close);
        }

        let requests = std::mem::take(&mut self.world.requests);
        if requests.end {
            log::info!("Game end requested after frame {}", self.frame_count);
            return Ok(FrameOutcome::Close);
        }
        if let Some(room) = requests.room {
            self.load_room(room)?;
        }
        Ok(FrameOutcome::Continue)
    }
}
