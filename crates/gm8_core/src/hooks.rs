//! Extension points for the event families the frame does not dispatch yet.
//!
//! Timelines, alarms, keyboard and mouse events, boundary and view events, and
//! collisions all have a fixed slot in the frame. `Game` calls the installed
//! `FrameHooks` at each slot so those families can be added without touching
//! the phase order.

use crate::instance::InstanceList;
use crate::world::Globals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeginStepTriggers,
    Timelines,
    Alarms,
    Keyboard,
    Mouse,
    KeyPress,
    KeyRelease,
    StepTriggers,
    Boundary,
    Views,
    Collisions,
    EndStepTriggers,
}

impl HookPoint {
    /// Slots between presentation and the begin step event.
    pub const BEFORE_BEGIN_STEP: &'static [HookPoint] = &[HookPoint::BeginStepTriggers];

    /// Slots between the begin step event and the step event.
    pub const BEFORE_STEP: &'static [HookPoint] = &[
        HookPoint::Timelines,
        HookPoint::Alarms,
        HookPoint::Keyboard,
        HookPoint::Mouse,
        HookPoint::KeyPress,
        HookPoint::KeyRelease,
        HookPoint::StepTriggers,
    ];

    /// Slots between movement and the end step event.
    pub const BEFORE_END_STEP: &'static [HookPoint] = &[
        HookPoint::Boundary,
        HookPoint::Views,
        HookPoint::Collisions,
        HookPoint::EndStepTriggers,
    ];
}

pub trait FrameHooks {
    fn run(
        &mut self,
        point: HookPoint,
        instances: &mut InstanceList,
        globals: &Globals,
    ) -> Result<(), String>;
}

/// Leaves every slot empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl FrameHooks for NoHooks {
    fn run(&mut self, _: HookPoint, _: &mut InstanceList, _: &Globals) -> Result<(), String> {
        Ok(())
    }
}
