//! Test doubles for the game's collaborators.
//!
//! `ScriptedRunner` understands a tiny command language so tests can describe
//! script behaviour inline. Each action's code is a `;`-separated list of:
//!
//!   log:<tag>        record a call with `tag`
//!   log_x:<tag>      record `<tag>@<x of target>`
//!   fail             return a script error
//!   destroy:<id>     soft-delete instance `id`
//!   destroy_self     soft-delete the target
//!   create:<object>  create an instance at (0, 0) and run its create event
//!   hspeed:<value>   set the target's hspeed
//!   goto:<room>      request a room change
//!   end              request the end of the game

use crate::assets::{Action, Assets, Colour, Object, Room, RoomInstance, Sprite, SpriteFrame};
use crate::error::ScriptError;
use crate::game::Game;
use crate::instance::InstanceId;
use crate::render::{DrawParams, Renderer};
use crate::runner::{ActionRunner, ScriptContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub tag: String,
    pub target: Option<InstanceId>,
}

impl Call {
    pub fn log(tag: &str, target: Option<InstanceId>) -> Self {
        Self {
            tag: tag.to_string(),
            target,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedRunner {
    pub calls: Vec<Call>,
}

impl ScriptedRunner {
    fn execute(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        code: &str,
        target: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        for command in code.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let (name, arg) = command.split_once(':').unwrap_or((command, ""));
            match name {
                "log" => self.calls.push(Call::log(arg, target)),
                "log_x" => {
                    let x = target
                        .and_then(|id| ctx.instances().get_instance_by_number(id))
                        .map(|inst| inst.x)
                        .unwrap_or_default();
                    self.calls.push(Call::log(&format!("{arg}@{x}"), target));
                }
                "fail" => return Err(ScriptError(format!("scripted failure at {target:?}"))),
                "destroy" => {
                    ctx.destroy_instance(parse(arg)?);
                }
                "destroy_self" => {
                    if let Some(id) = target {
                        ctx.destroy_instance(id);
                    }
                }
                "create" => {
                    let object_index: usize = parse(arg)?;
                    let id = ctx.create_instance(0.0, 0.0, object_index)?;
                    let object = ctx
                        .assets()
                        .object(object_index)
                        .ok_or_else(|| ScriptError(format!("no object {object_index}")))?;
                    self.run(ctx, &object.ev_create, id, target)?;
                }
                "hspeed" => {
                    let value: f64 = parse(arg)?;
                    if let Some(inst) =
                        target.and_then(|id| ctx.instances_mut().get_instance_by_number_mut(id))
                    {
                        inst.set_hspeed(value);
                    }
                }
                "goto" => ctx.request_room(parse(arg)?),
                "end" => ctx.request_end(),
                other => return Err(ScriptError(format!("unknown test command '{other}'"))),
            }
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(arg: &str) -> Result<T, ScriptError> {
    arg.parse()
        .map_err(|_| ScriptError(format!("bad argument '{arg}'")))
}

impl ActionRunner for ScriptedRunner {
    fn run(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        actions: &[Action],
        target: InstanceId,
        _other: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        for action in actions {
            self.execute(ctx, &action.code, Some(target))?;
        }
        Ok(())
    }

    fn run_script(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        code: &str,
        target: Option<InstanceId>,
        _other: Option<InstanceId>,
    ) -> Result<(), ScriptError> {
        self.execute(ctx, code, target)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Resize(u32, u32),
    Title(String),
    Background(Colour),
    Draw { image: String, params: DrawParams },
    Present,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
    pub close_after_presents: Option<usize>,
    presents: usize,
}

impl Renderer for RecordingRenderer {
    fn resize_window(&mut self, width: u32, height: u32) {
        self.calls.push(RenderCall::Resize(width, height));
    }

    fn set_window_title(&mut self, title: &str) {
        self.calls.push(RenderCall::Title(title.to_string()));
    }

    fn set_background_colour(&mut self, colour: Colour) {
        self.calls.push(RenderCall::Background(colour));
    }

    fn draw_image(&mut self, frame: &SpriteFrame, params: &DrawParams) {
        self.calls.push(RenderCall::Draw {
            image: frame.image.clone(),
            params: *params,
        });
    }

    fn render_frame(&mut self) {
        self.presents += 1;
        self.calls.push(RenderCall::Present);
    }

    fn should_close(&self) -> bool {
        self.close_after_presents
            .is_some_and(|limit| self.presents >= limit)
    }
}

pub fn actions(codes: &[&str]) -> Vec<Action> {
    codes.iter().map(|code| Action::new(*code)).collect()
}

pub fn object_with_step(codes: &[&str]) -> Object {
    Object {
        ev_step: actions(codes),
        ..Object::default()
    }
}

pub fn placed(id: InstanceId, object_index: usize) -> RoomInstance {
    placed_at(id, object_index, 0.0, 0.0)
}

pub fn placed_at(id: InstanceId, object_index: usize, x: f64, y: f64) -> RoomInstance {
    RoomInstance {
        id,
        x,
        y,
        object_index,
        creation_code: String::new(),
    }
}

pub fn room_with(instances: Vec<RoomInstance>) -> Room {
    Room {
        name: "test_room".to_string(),
        caption: "Test".to_string(),
        width: 640,
        height: 480,
        speed: 30,
        background_colour: 0,
        creation_code: String::new(),
        instances,
    }
}

pub fn game_with(
    rooms: Vec<Room>,
    objects: Vec<Object>,
    sprites: Vec<Sprite>,
) -> Game<ScriptedRunner, RecordingRenderer> {
    let assets = Assets {
        version: crate::assets::GAME_FILE_VERSION.to_string(),
        room_order: (0..rooms.len()).collect(),
        rooms: rooms.into_iter().map(Some).collect(),
        objects: objects.into_iter().map(Some).collect(),
        sprites: sprites.into_iter().map(Some).collect(),
    };
    Game::new(
        assets,
        ScriptedRunner::default(),
        RecordingRenderer::default(),
    )
}
