//! Per-frame movement integration.
//!
//! Angles are in degrees with y pointing down, so a direction of 90 moves up
//! the screen and produces a negative `vspeed`.

use crate::instance::Instance;

/// Advance one instance by one frame of friction, gravity and velocity.
pub fn integrate(instance: &mut Instance) {
    instance.xprevious = instance.x;
    instance.yprevious = instance.y;

    if instance.friction != 0.0 {
        apply_friction(instance);
    }
    if instance.gravity != 0.0 {
        apply_gravity(instance);
    }

    instance.x += instance.hspeed;
    instance.y += instance.vspeed;
}

/// Pull `speed` toward zero by `friction`. Never crosses zero; a negative
/// speed stays negative until it reaches zero.
fn apply_friction(instance: &mut Instance) {
    let negative = instance.speed < 0.0;
    let magnitude = instance.speed.abs() - instance.friction;
    instance.speed = if magnitude < 0.0 {
        0.0
    } else if negative {
        -magnitude
    } else {
        magnitude
    };

    let radians = instance.direction.to_radians();
    instance.hspeed = radians.cos() * instance.speed;
    instance.vspeed = -radians.sin() * instance.speed;
}

/// Accelerate along `gravity_direction`, then derive `speed` and `direction`
/// back from the Cartesian components.
///
/// `direction` uses the single-argument arctangent of `-vspeed / hspeed`,
/// which folds every velocity into (-90, 90) degrees and is undefined for a
/// zero vector. That matches the reference runtime's trajectories, so it is
/// kept.
fn apply_gravity(instance: &mut Instance) {
    let radians = instance.gravity_direction.to_radians();
    instance.hspeed += radians.cos() * instance.gravity;
    instance.vspeed += -radians.sin() * instance.gravity;

    instance.direction = (-instance.vspeed / instance.hspeed).atan().to_degrees();
    instance.speed = instance.hspeed.hypot(instance.vspeed);
}
