use std::fmt;

/// `ev_other` index of the room start event.
pub const OTHER_ROOM_START: u32 = 4;
/// `ev_other` index of the room end event.
pub const OTHER_ROOM_END: u32 = 5;

/// The trigger points at which scripted actions run.
///
/// `InstanceCreationCode` and `RoomCreationCode` are not object events; they
/// label the creation code stored on a room and on its instance placements so
/// failures can be reported uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Create,
    Draw,
    StepBegin,
    Step,
    StepEnd,
    Other(u32),
    InstanceCreationCode,
    RoomCreationCode,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create event"),
            Self::Draw => f.write_str("draw event"),
            Self::StepBegin => f.write_str("begin step event"),
            Self::Step => f.write_str("step event"),
            Self::StepEnd => f.write_str("end step event"),
            Self::Other(OTHER_ROOM_START) => f.write_str("room start event"),
            Self::Other(OTHER_ROOM_END) => f.write_str("room end event"),
            Self::Other(index) => write!(f, "other event {index}"),
            Self::InstanceCreationCode => f.write_str("instance creation code"),
            Self::RoomCreationCode => f.write_str("room creation code"),
        }
    }
}
