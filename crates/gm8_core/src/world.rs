use crate::assets::Room;
use crate::instance::InstanceList;

/// Process-wide simulation state readable by scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    /// `None` until the first room has been entered.
    pub room: Option<usize>,
    pub room_speed: u32,
    pub room_width: u32,
    pub room_height: u32,
}

/// Requests scripts leave for the host to act on between frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequests {
    pub room: Option<usize>,
    pub end: bool,
}

/// Mutable simulation state: the instance table, the globals and any pending
/// session requests.
#[derive(Debug, Default)]
pub struct World {
    pub instances: InstanceList,
    pub(crate) globals: Globals,
    last_room_speed: Option<u32>,
    pub requests: SessionRequests,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Record `room` as the current room.
    ///
    /// Speed, width and height are only refreshed when the room's speed differs
    /// from the last speed applied. Entering a room with the same speed keeps
    /// the previous room's dimensions in the globals.
    pub(crate) fn enter_room(&mut self, room_id: usize, room: &Room) {
        self.globals.room = Some(room_id);
        if self.last_room_speed != Some(room.speed) {
            self.globals.room_speed = room.speed;
            self.last_room_speed = Some(room.speed);
            self.globals.room_width = room.width;
            self.globals.room_height = room.height;
        }
    }
}
