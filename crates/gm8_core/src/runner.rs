use crate::assets::{Action, Assets};
use crate::error::{GameError, ScriptError};
use crate::instance::{InstanceId, InstanceList};
use crate::world::{Globals, World};

/// What a running script is allowed to touch.
///
/// Scripts may read and mutate instances, create and soft-delete them, and
/// leave session requests. Globals are read-only here; only room transitions
/// change them.
pub struct ScriptContext<'a> {
    assets: &'a Assets,
    world: &'a mut World,
}

impl<'a> ScriptContext<'a> {
    pub fn new(assets: &'a Assets, world: &'a mut World) -> Self {
        Self { assets, world }
    }

    pub fn assets(&self) -> &'a Assets {
        self.assets
    }

    pub fn globals(&self) -> &Globals {
        self.world.globals()
    }

    pub fn instances(&self) -> &InstanceList {
        &self.world.instances
    }

    pub fn instances_mut(&mut self) -> &mut InstanceList {
        &mut self.world.instances
    }

    /// Create an instance of `object_index` under the next free id. The new
    /// instance is immediately visible to the phase currently iterating.
    /// Running its create event is up to the caller.
    pub fn create_instance(
        &mut self,
        x: f64,
        y: f64,
        object_index: usize,
    ) -> Result<InstanceId, GameError> {
        let object = self
            .assets
            .object(object_index)
            .ok_or(GameError::MissingObject(object_index))?;
        let id = self
            .world
            .instances
            .create_instance(x, y, object_index, object)?;
        log::trace!("Created instance {id} of object {object_index} at ({x}, {y})");
        Ok(id)
    }

    /// Soft-delete an instance; it is purged at the end of the frame.
    pub fn destroy_instance(&mut self, id: InstanceId) -> bool {
        self.world.instances.destroy(id)
    }

    /// Ask for a room change once the current frame has finished.
    pub fn request_room(&mut self, room: usize) {
        self.world.requests.room = Some(room);
    }

    /// Ask for the session to end once the current frame has finished.
    pub fn request_end(&mut self) {
        self.world.requests.end = true;
    }
}

/// Executes scripted actions on behalf of an instance.
pub trait ActionRunner {
    /// Run an event's action list with `target` as the acting instance.
    fn run(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        actions: &[Action],
        target: InstanceId,
        other: Option<InstanceId>,
    ) -> Result<(), ScriptError>;

    /// Run a piece of creation code. `target` is `None` for room creation code.
    fn run_script(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        code: &str,
        target: Option<InstanceId>,
        other: Option<InstanceId>,
    ) -> Result<(), ScriptError>;
}
