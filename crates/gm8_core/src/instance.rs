//! The instance table.
//!
//! Instances live in a `Vec` in creation order. That order is observable: it
//! is the draw order and the order every event phase visits instances in.
//!
//! Deletion is two-tier:
//! - **Soft delete** (`exists = false`) can happen at any time, including from
//!   a script running in the middle of a phase. The entry stays in place so
//!   index-based iteration is never shifted under the phase that is walking it.
//! - **Purge** (`clear_deleted`, `clear_non_persistent`) only happens at the
//!   barriers the game defines: end of frame and start of a room transition.

use std::collections::HashMap;
use std::ops::Index;

use thiserror::Error;

use crate::assets::{Colour, Object};

pub type InstanceId = u32;

/// First id handed out by `create_instance`. Editor-placed instances carry
/// their own ids; `Game` reserves everything up to the largest of them.
pub const FIRST_INSTANCE_ID: InstanceId = 100_001;

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    pub object_index: usize,

    pub x: f64,
    pub y: f64,
    pub xprevious: f64,
    pub yprevious: f64,
    pub speed: f64,
    pub direction: f64,
    pub hspeed: f64,
    pub vspeed: f64,
    pub friction: f64,
    pub gravity: f64,
    pub gravity_direction: f64,

    pub sprite_index: i32,
    pub image_index: f64,
    pub image_xscale: f64,
    pub image_yscale: f64,
    pub image_angle: f64,
    pub image_blend: Colour,
    pub image_alpha: f64,
    pub visible: bool,

    pub exists: bool,
    pub persistent: bool,
}

impl Instance {
    pub fn new(id: InstanceId, x: f64, y: f64, object_index: usize, object: &Object) -> Self {
        Self {
            id,
            object_index,
            x,
            y,
            xprevious: x,
            yprevious: y,
            speed: 0.0,
            direction: 0.0,
            hspeed: 0.0,
            vspeed: 0.0,
            friction: 0.0,
            gravity: 0.0,
            gravity_direction: 270.0,
            sprite_index: object.sprite_index,
            image_index: 0.0,
            image_xscale: 1.0,
            image_yscale: 1.0,
            image_angle: 0.0,
            image_blend: 0xFF_FF_FF,
            image_alpha: 1.0,
            visible: object.visible,
            exists: true,
            persistent: object.persistent,
        }
    }

    // The motion setters keep the polar pair (speed, direction) and the
    // Cartesian pair (hspeed, vspeed) describing the same velocity.

    pub fn set_hspeed(&mut self, hspeed: f64) {
        self.hspeed = hspeed;
        self.update_polar();
    }

    pub fn set_vspeed(&mut self, vspeed: f64) {
        self.vspeed = vspeed;
        self.update_polar();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.update_cartesian();
    }

    /// Directions are stored in `[0, 360)`.
    pub fn set_direction(&mut self, direction: f64) {
        self.direction = direction.rem_euclid(360.0);
        self.update_cartesian();
    }

    fn update_polar(&mut self) {
        self.speed = self.hspeed.hypot(self.vspeed);
        // A zero vector has no direction; keep the last one.
        if self.hspeed != 0.0 || self.vspeed != 0.0 {
            self.direction = (-self.vspeed)
                .atan2(self.hspeed)
                .to_degrees()
                .rem_euclid(360.0);
        }
    }

    fn update_cartesian(&mut self) {
        let radians = self.direction.to_radians();
        self.hspeed = radians.cos() * self.speed;
        self.vspeed = -radians.sin() * self.speed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("instance id {0} is already in use")]
    DuplicateId(InstanceId),
    #[error("no instance ids left to allocate")]
    IdsExhausted,
}

#[derive(Debug)]
pub struct InstanceList {
    instances: Vec<Instance>,
    /// id -> position of the most recent entry with that id. Soft-deleted
    /// entries may still be referenced; lookups filter them out.
    by_id: HashMap<InstanceId, usize>,
    next_id: InstanceId,
}

impl InstanceList {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            by_id: HashMap::new(),
            next_id: FIRST_INSTANCE_ID,
        }
    }

    /// Number of entries, including soft-deleted ones not yet purged.
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Instance> {
        self.instances.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Instance> {
        self.instances.iter_mut()
    }

    /// Look up a live instance by id.
    pub fn get_instance_by_number(&self, id: InstanceId) -> Option<&Instance> {
        let &index = self.by_id.get(&id)?;
        self.instances.get(index).filter(|instance| instance.exists)
    }

    pub fn get_instance_by_number_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        let &index = self.by_id.get(&id)?;
        self.instances
            .get_mut(index)
            .filter(|instance| instance.exists)
    }

    /// Append a new instance with `object`'s defaults.
    pub fn add_instance(
        &mut self,
        id: InstanceId,
        x: f64,
        y: f64,
        object_index: usize,
        object: &Object,
    ) -> Result<&mut Instance, InstanceError> {
        if self.get_instance_by_number(id).is_some() {
            return Err(InstanceError::DuplicateId(id));
        }
        if id >= self.next_id {
            self.next_id = id.checked_add(1).ok_or(InstanceError::IdsExhausted)?;
        }

        let index = self.instances.len();
        self.instances
            .push(Instance::new(id, x, y, object_index, object));
        self.by_id.insert(id, index);
        Ok(&mut self.instances[index])
    }

    /// Make sure `create_instance` never hands out `id` or anything below it.
    /// Called with the largest editor-placed id so script-created instances
    /// cannot take the id of a placement that has not been added yet.
    pub fn reserve_ids_through(&mut self, id: InstanceId) {
        if id >= self.next_id {
            self.next_id = id.saturating_add(1);
        }
    }

    /// The id the next `create_instance` call will hand out.
    pub fn next_id(&self) -> InstanceId {
        self.next_id
    }

    /// Append a new instance under the next free id.
    pub fn create_instance(
        &mut self,
        x: f64,
        y: f64,
        object_index: usize,
        object: &Object,
    ) -> Result<InstanceId, InstanceError> {
        let id = self.next_id;
        self.add_instance(id, x, y, object_index, object)?;
        Ok(id)
    }

    /// Soft-delete a live instance. Returns whether one was found.
    pub fn destroy(&mut self, id: InstanceId) -> bool {
        match self.get_instance_by_number_mut(id) {
            Some(instance) => {
                instance.exists = false;
                true
            }
            None => false,
        }
    }

    /// Remove every instance that is not persistent. Runs at the start of a
    /// room transition, before the incoming room's instances are created.
    pub fn clear_non_persistent(&mut self) {
        let before = self.instances.len();
        self.instances.retain(|instance| instance.persistent);
        log::debug!(
            "Cleared {} non-persistent instances, {} persist",
            before - self.instances.len(),
            self.instances.len()
        );
        self.reindex();
    }

    /// Purge soft-deleted instances. Runs once at the end of every frame.
    pub fn clear_deleted(&mut self) {
        let before = self.instances.len();
        self.instances.retain(|instance| instance.exists);
        if self.instances.len() != before {
            log::trace!("Purged {} deleted instances", before - self.instances.len());
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (index, instance) in self.instances.iter().enumerate() {
            self.by_id.insert(instance.id, index);
        }
    }
}

impl Default for InstanceList {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for InstanceList {
    type Output = Instance;

    fn index(&self, index: usize) -> &Instance {
        &self.instances[index]
    }
}
