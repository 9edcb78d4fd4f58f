//! Read-only game definitions: rooms, objects and sprites.
//!
//! Assets are addressed by index, the same way the game file lists them.
//! Deleted assets leave a `null` hole in their list, so every lookup returns
//! an `Option` and callers decide whether a missing asset is fatal.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::event::EventKind;
use crate::instance::InstanceId;

/// Colour in the runtime's packed BGR layout.
pub type Colour = u32;

pub const GAME_FILE_VERSION: &str = "0.1";

/// A single scripted action. The host's `ActionRunner` decides what the code means.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Action {
    pub code: String,
}

impl Action {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IndexedEvent {
    pub index: u32,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Object {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_sprite_index")]
    pub sprite_index: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub ev_create: Vec<Action>,
    /// `None` means the object has no draw event and gets the default sprite
    /// draw. An empty list is still a defined (do-nothing) draw event.
    #[serde(default)]
    pub ev_draw: Option<Vec<Action>>,
    #[serde(default)]
    pub ev_step_begin: Vec<Action>,
    #[serde(default)]
    pub ev_step: Vec<Action>,
    #[serde(default)]
    pub ev_step_end: Vec<Action>,
    #[serde(default)]
    pub ev_other: Vec<IndexedEvent>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            name: String::new(),
            sprite_index: default_sprite_index(),
            visible: default_visible(),
            persistent: false,
            ev_create: Vec::new(),
            ev_draw: None,
            ev_step_begin: Vec::new(),
            ev_step: Vec::new(),
            ev_step_end: Vec::new(),
            ev_other: Vec::new(),
        }
    }
}

impl Object {
    /// Actions bound to an indexed "other" event. Only the first entry with a
    /// matching index counts.
    pub fn other_event(&self, index: u32) -> Option<&[Action]> {
        self.ev_other
            .iter()
            .find(|event| event.index == index)
            .map(|event| event.actions.as_slice())
    }

    /// Actions bound to `event`, or `None` when the object does not define it.
    /// Creation code is stored on rooms, not objects, so it is never found here.
    pub fn actions(&self, event: EventKind) -> Option<&[Action]> {
        match event {
            EventKind::Create => Some(self.ev_create.as_slice()),
            EventKind::Draw => self.ev_draw.as_deref(),
            EventKind::StepBegin => Some(self.ev_step_begin.as_slice()),
            EventKind::Step => Some(self.ev_step.as_slice()),
            EventKind::StepEnd => Some(self.ev_step_end.as_slice()),
            EventKind::Other(index) => self.other_event(index),
            EventKind::InstanceCreationCode | EventKind::RoomCreationCode => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpriteFrame {
    pub image: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Sprite {
    #[serde(default)]
    pub name: String,
    pub frames: Vec<SpriteFrame>,
}

/// An instance placed in a room by the editor.
#[derive(Debug, Deserialize, Clone)]
pub struct RoomInstance {
    pub id: InstanceId,
    pub x: f64,
    pub y: f64,
    pub object_index: usize,
    #[serde(default)]
    pub creation_code: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Room {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub caption: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_room_speed")]
    pub speed: u32,
    #[serde(default)]
    pub background_colour: Colour,
    #[serde(default)]
    pub creation_code: String,
    #[serde(default)]
    pub instances: Vec<RoomInstance>,
}

/// The asset store. Immutable once the game is running.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Assets {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub room_order: Vec<usize>,
    #[serde(default)]
    pub rooms: Vec<Option<Room>>,
    #[serde(default)]
    pub objects: Vec<Option<Object>>,
    #[serde(default)]
    pub sprites: Vec<Option<Sprite>>,
}

impl Assets {
    pub fn room(&self, id: usize) -> Option<&Room> {
        self.rooms.get(id)?.as_ref()
    }

    pub fn object(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)?.as_ref()
    }

    pub fn sprite(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)?.as_ref()
    }

    /// The room the game starts in.
    pub fn first_room(&self) -> Option<usize> {
        self.room_order.first().copied()
    }

    /// Largest id of any editor-placed instance, across every room.
    pub fn last_instance_id(&self) -> Option<InstanceId> {
        self.rooms
            .iter()
            .flatten()
            .flat_map(|room| &room.instances)
            .map(|placed| placed.id)
            .max()
    }
}

pub fn load_game_from_path(path: &Path) -> Result<Assets, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read game file {}: {e}", path.display()))?;
    let assets: Assets = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse game JSON {}: {e}", path.display()))?;
    validate_game(&assets)?;
    log::info!(
        "Loaded game {}: {} rooms, {} objects, {} sprites",
        path.display(),
        assets.rooms.len(),
        assets.objects.len(),
        assets.sprites.len()
    );
    Ok(assets)
}

fn validate_game(assets: &Assets) -> Result<(), String> {
    if assets.version != GAME_FILE_VERSION {
        return Err(format!(
            "Game validation failed: unsupported version '{}'",
            assets.version
        ));
    }
    if assets.room_order.is_empty() {
        return Err("Game validation failed: room_order is empty".to_string());
    }
    for &room_id in &assets.room_order {
        if assets.room(room_id).is_none() {
            return Err(format!(
                "Game validation failed: room_order references missing room {room_id}"
            ));
        }
    }

    // Instance ids are global across rooms; persistence relies on that.
    let mut instance_ids = HashSet::new();
    for (room_id, room) in assets.rooms.iter().enumerate() {
        let Some(room) = room else {
            continue;
        };
        for placed in &room.instances {
            if !instance_ids.insert(placed.id) {
                return Err(format!(
                    "Game validation failed: duplicate instance id {} in room {room_id}",
                    placed.id
                ));
            }
            if assets.object(placed.object_index).is_none() {
                return Err(format!(
                    "Game validation failed: instance {} in room {room_id} uses missing object {}",
                    placed.id, placed.object_index
                ));
            }
        }
    }

    for (index, object) in assets.objects.iter().enumerate() {
        let Some(object) = object else {
            continue;
        };
        if object.sprite_index >= 0 && assets.sprite(object.sprite_index as usize).is_none() {
            return Err(format!(
                "Game validation failed: object {index} uses missing sprite {}",
                object.sprite_index
            ));
        }
    }

    for (index, sprite) in assets.sprites.iter().enumerate() {
        if let Some(sprite) = sprite {
            if sprite.frames.is_empty() {
                return Err(format!(
                    "Game validation failed: sprite {index} ('{}') has no frames",
                    sprite.name
                ));
            }
        }
    }

    Ok(())
}

const fn default_sprite_index() -> i32 {
    -1
}

const fn default_visible() -> bool {
    true
}

const fn default_room_speed() -> u32 {
    30
}
