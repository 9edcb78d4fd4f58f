//! Event dispatch shared by room transitions and frames.
//!
//! These take the game's parts separately instead of `&mut Game` so callers
//! can keep borrowing room and object definitions out of the asset store while
//! scripts run against the world.

use crate::assets::Assets;
use crate::error::GameError;
use crate::event::EventKind;
use crate::instance::InstanceId;
use crate::runner::{ActionRunner, ScriptContext};
use crate::world::World;

/// Run `event` for every live instance in table order.
///
/// The table length is re-read on every step, so instances created by a
/// script are visited later in the same pass. Soft-deleted instances are
/// skipped.
pub(crate) fn run_phase<R: ActionRunner>(
    runner: &mut R,
    assets: &Assets,
    world: &mut World,
    event: EventKind,
) -> Result<(), GameError> {
    let mut index = 0;
    while index < world.instances.count() {
        let instance = &world.instances[index];
        index += 1;
        if !instance.exists {
            continue;
        }
        let (target, object_index) = (instance.id, instance.object_index);
        run_event(runner, assets, world, target, object_index, event)?;
    }
    Ok(())
}

/// Run one object event for one instance. Events the object does not define
/// are a successful no-op.
pub(crate) fn run_event<R: ActionRunner>(
    runner: &mut R,
    assets: &Assets,
    world: &mut World,
    target: InstanceId,
    object_index: usize,
    event: EventKind,
) -> Result<(), GameError> {
    let object = assets
        .object(object_index)
        .ok_or(GameError::MissingObject(object_index))?;
    let Some(actions) = object.actions(event) else {
        return Ok(());
    };

    let mut ctx = ScriptContext::new(assets, world);
    runner
        .run(&mut ctx, actions, target, None)
        .map_err(|source| GameError::Script {
            event,
            target: Some(target),
            source,
        })
}

/// Run room or instance creation code.
pub(crate) fn run_creation_code<R: ActionRunner>(
    runner: &mut R,
    assets: &Assets,
    world: &mut World,
    event: EventKind,
    code: &str,
    target: Option<InstanceId>,
) -> Result<(), GameError> {
    let mut ctx = ScriptContext::new(assets, world);
    runner
        .run_script(&mut ctx, code, target, None)
        .map_err(|source| GameError::Script {
            event,
            target,
            source,
        })
}
