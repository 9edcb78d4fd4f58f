//! Lua action runner.
//!
//! Each action is a Lua chunk run as a coroutine. Before it starts, Rust
//! publishes the acting instance as the `self` table plus the room globals.
//! The engine functions (`instance_create`, `instance_destroy`,
//! `instance_exists`, `room_goto`, `game_end`) are thin Lua wrappers that
//! yield the call back to Rust, which applies it to the instance table right
//! away and resumes the chunk with the result. So `instance_create` returns
//! only after the new instance exists and its create event has run.
//!
//! `self` is written back to the instance at every engine call and when the
//! chunk finishes, then refilled from the instance. Motion fields go through
//! the `Instance` setters so `speed`/`direction` and `hspeed`/`vspeed` stay
//! in agreement.
//!
//! Compiled chunks are cached by source text for the lifetime of the runner.

use std::collections::HashMap;

use gm8_core::{Action, ActionRunner, Instance, InstanceId, ScriptContext, ScriptError};
use mlua::prelude::*;

const ENGINE_API: &str = r#"
local yield = coroutine.yield
function instance_create(x, y, object) return yield("instance_create", x, y, object) end
function instance_destroy(id) return yield("instance_destroy", id) end
function instance_exists(id) return yield("instance_exists", id) end
function room_goto(room) return yield("room_goto", room) end
function game_end() return yield("game_end") end
"#;

/// Real-valued instance fields copied straight between `self` and the
/// instance. The motion fields are handled separately.
const PLAIN_FIELDS: [&str; 12] = [
    "x",
    "y",
    "xprevious",
    "yprevious",
    "friction",
    "gravity",
    "gravity_direction",
    "image_index",
    "image_xscale",
    "image_yscale",
    "image_angle",
    "image_alpha",
];

fn plain_field<'i>(instance: &'i mut Instance, name: &str) -> Option<&'i mut f64> {
    Some(match name {
        "x" => &mut instance.x,
        "y" => &mut instance.y,
        "xprevious" => &mut instance.xprevious,
        "yprevious" => &mut instance.yprevious,
        "friction" => &mut instance.friction,
        "gravity" => &mut instance.gravity,
        "gravity_direction" => &mut instance.gravity_direction,
        "image_index" => &mut instance.image_index,
        "image_xscale" => &mut instance.image_xscale,
        "image_yscale" => &mut instance.image_yscale,
        "image_angle" => &mut instance.image_angle,
        "image_alpha" => &mut instance.image_alpha,
        _ => return None,
    })
}

/// An engine call yielded by a chunk: the function name and up to three
/// numeric arguments.
type EngineCall = (String, Option<f64>, Option<f64>, Option<f64>);

pub struct LuaRunner {
    lua: Lua,
    chunks: HashMap<String, LuaFunction>,
}

impl LuaRunner {
    pub fn new() -> Result<Self, String> {
        let lua = Lua::new();
        lua.load(ENGINE_API)
            .set_name("=engine")
            .exec()
            .map_err(|e| format!("Failed to set up Lua engine API: {e}"))?;
        Ok(Self {
            lua,
            chunks: HashMap::new(),
        })
    }

    /// Number of distinct chunks compiled so far.
    pub fn cached_chunks(&self) -> usize {
        self.chunks.len()
    }

    fn execute(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        code: &str,
        target: Option<InstanceId>,
        other: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        let chunk = self.compile(code).map_err(lua_error)?;
        let thread = self.lua.create_thread(chunk).map_err(lua_error)?;
        let this = self.publish(ctx, target, other).map_err(lua_error)?;

        let mut reply = LuaValue::Nil;
        loop {
            let yielded: LuaMultiValue = thread.resume(reply).map_err(lua_error)?;
            write_back(ctx, target, this.as_ref()).map_err(lua_error)?;
            if thread.status() != LuaThreadStatus::Resumable {
                return Ok(());
            }

            let call: EngineCall = self.lua.unpack_multi(yielded).map_err(lua_error)?;
            reply = self.call_engine(ctx, call, target)?;
            self.refresh(ctx, target, other, this.as_ref())
                .map_err(lua_error)?;
        }
    }

    fn compile(&mut self, code: &str) -> LuaResult<LuaFunction> {
        if let Some(chunk) = self.chunks.get(code) {
            return Ok(chunk.clone());
        }
        let chunk = self.lua.load(code).set_name("=action").into_function()?;
        self.chunks.insert(code.to_string(), chunk.clone());
        Ok(chunk)
    }

    /// Build the `self` table for `target` and expose it with the globals.
    fn publish(
        &self,
        ctx: &ScriptContext<'_>,
        target: Option<InstanceId>,
        other: Option<InstanceId>,
    ) -> LuaResult<Option<LuaTable>> {
        let this = match target.and_then(|id| ctx.instances().get_instance_by_number(id)) {
            Some(instance) => {
                let table = self.lua.create_table()?;
                fill_instance_table(&table, instance)?;
                Some(table)
            }
            None => None,
        };
        self.expose(ctx, this.as_ref(), other)?;
        Ok(this)
    }

    /// Bring `self` up to date after an engine call, which may have run other
    /// chunks that replaced the globals.
    fn refresh(
        &self,
        ctx: &ScriptContext<'_>,
        target: Option<InstanceId>,
        other: Option<InstanceId>,
        this: Option<&LuaTable>,
    ) -> LuaResult<()> {
        if let (Some(table), Some(instance)) = (
            this,
            target.and_then(|id| ctx.instances().get_instance_by_number(id)),
        ) {
            fill_instance_table(table, instance)?;
        }
        self.expose(ctx, this, other)
    }

    fn expose(
        &self,
        ctx: &ScriptContext<'_>,
        this: Option<&LuaTable>,
        other: Option<InstanceId>,
    ) -> LuaResult<()> {
        let globals = self.lua.globals();
        let room = ctx.globals();
        globals.set("room", room.room)?;
        globals.set("room_speed", room.room_speed)?;
        globals.set("room_width", room.room_width)?;
        globals.set("room_height", room.room_height)?;
        globals.set("other", other)?;
        globals.set("self", this.cloned())
    }

    fn call_engine(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        (name, a, b, c): EngineCall,
        target: Option<InstanceId>,
    ) -> Result<LuaValue, ScriptError> {
        match name.as_str() {
            "instance_create" => {
                let object_index = index_arg(c, "object")?;
                let (x, y) = (a.unwrap_or_default(), b.unwrap_or_default());
                let id = ctx.create_instance(x, y, object_index)?;
                let object = ctx
                    .assets()
                    .object(object_index)
                    .ok_or_else(|| ScriptError(format!("object {object_index} does not exist")))?;
                self.run(ctx, &object.ev_create, id, target)?;
                Ok(LuaValue::Integer(i64::from(id)))
            }
            "instance_destroy" => {
                let id = match a {
                    Some(value) => id_arg(value)?,
                    None => target.ok_or_else(|| {
                        ScriptError("instance_destroy() needs an acting instance".to_string())
                    })?,
                };
                ctx.destroy_instance(id);
                Ok(LuaValue::Nil)
            }
            "instance_exists" => {
                let id = id_arg(a.ok_or_else(|| {
                    ScriptError("instance_exists() needs an instance id".to_string())
                })?)?;
                Ok(LuaValue::Boolean(
                    ctx.instances().get_instance_by_number(id).is_some(),
                ))
            }
            "room_goto" => {
                ctx.request_room(index_arg(a, "room")?);
                Ok(LuaValue::Nil)
            }
            "game_end" => {
                ctx.request_end();
                Ok(LuaValue::Nil)
            }
            other => Err(ScriptError(format!("unknown engine call '{other}'"))),
        }
    }
}

impl ActionRunner for LuaRunner {
    fn run(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        actions: &[Action],
        target: InstanceId,
        other: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        for action in actions {
            self.execute(ctx, &action.code, Some(target), other)?;
        }
        Ok(())
    }

    fn run_script(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        code: &str,
        target: Option<InstanceId>,
        other: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        if code.trim().is_empty() {
            return Ok(());
        }
        self.execute(ctx, code, target, other)
    }
}

fn lua_error(err: LuaError) -> ScriptError {
    log::error!("Lua action error: {err}");
    ScriptError(err.to_string())
}

fn fill_instance_table(table: &LuaTable, instance: &Instance) -> LuaResult<()> {
    table.set("id", instance.id)?;
    table.set("object_index", instance.object_index)?;
    table.set("x", instance.x)?;
    table.set("y", instance.y)?;
    table.set("xprevious", instance.xprevious)?;
    table.set("yprevious", instance.yprevious)?;
    table.set("friction", instance.friction)?;
    table.set("gravity", instance.gravity)?;
    table.set("gravity_direction", instance.gravity_direction)?;
    table.set("image_index", instance.image_index)?;
    table.set("image_xscale", instance.image_xscale)?;
    table.set("image_yscale", instance.image_yscale)?;
    table.set("image_angle", instance.image_angle)?;
    table.set("image_alpha", instance.image_alpha)?;
    table.set("speed", instance.speed)?;
    table.set("direction", instance.direction)?;
    table.set("hspeed", instance.hspeed)?;
    table.set("vspeed", instance.vspeed)?;
    table.set("sprite_index", instance.sprite_index)?;
    table.set("image_blend", instance.image_blend)?;
    table.set("visible", instance.visible)?;
    table.set("persistent", instance.persistent)
}

/// Copy `self` back onto the acting instance, if it is still alive.
///
/// The instance still holds the values `self` was filled with, so a motion
/// field that differs from it was assigned by the script and goes through the
/// matching setter.
fn write_back(
    ctx: &mut ScriptContext<'_>,
    target: Option<InstanceId>,
    this: Option<&LuaTable>,
) -> LuaResult<()> {
    let (Some(id), Some(this)) = (target, this) else {
        return Ok(());
    };
    let Some(instance) = ctx.instances_mut().get_instance_by_number_mut(id) else {
        return Ok(());
    };

    for name in PLAIN_FIELDS {
        if let Some(field) = plain_field(instance, name) {
            *field = this.get(name)?;
        }
    }

    let (speed, direction) = (instance.speed, instance.direction);
    let (hspeed, vspeed) = (instance.hspeed, instance.vspeed);
    let value: f64 = this.get("speed")?;
    if value != speed {
        instance.set_speed(value);
    }
    let value: f64 = this.get("direction")?;
    if value != direction {
        instance.set_direction(value);
    }
    let value: f64 = this.get("hspeed")?;
    if value != hspeed {
        instance.set_hspeed(value);
    }
    let value: f64 = this.get("vspeed")?;
    if value != vspeed {
        instance.set_vspeed(value);
    }

    instance.object_index = integral(
        this.get("object_index")?,
        "object_index",
        0,
        i64::from(u32::MAX),
    )
    .map_err(LuaError::RuntimeError)? as usize;
    instance.sprite_index = integral(
        this.get("sprite_index")?,
        "sprite_index",
        i64::from(i32::MIN),
        i64::from(i32::MAX),
    )
    .map_err(LuaError::RuntimeError)? as i32;
    instance.image_blend = integral(this.get("image_blend")?, "image_blend", 0, 0xFF_FF_FF)
        .map_err(LuaError::RuntimeError)? as u32;
    instance.visible = this.get("visible")?;
    instance.persistent = this.get("persistent")?;
    Ok(())
}

/// `value` as a whole number in `min..=max`.
fn integral(value: f64, name: &str, min: i64, max: i64) -> Result<i64, String> {
    if !value.is_finite() || value.fract() != 0.0 || value < min as f64 || value > max as f64 {
        return Err(format!(
            "{name} must be a whole number between {min} and {max}, got {value}"
        ));
    }
    Ok(value as i64)
}

fn index_arg(value: Option<f64>, name: &str) -> Result<usize, ScriptError> {
    let value = value.ok_or_else(|| ScriptError(format!("{name} is required")))?;
    integral(value, name, 0, i64::from(u32::MAX))
        .map(|index| index as usize)
        .map_err(ScriptError)
}

fn id_arg(value: f64) -> Result<InstanceId, ScriptError> {
    integral(value, "instance id", 0, i64::from(InstanceId::MAX))
        .map(|id| id as InstanceId)
        .map_err(ScriptError)
}
