//! Capability interface between the driving model and a physics engine.
//!
//! The driving model never writes pose or velocity directly; it reads them and
//! requests changes through forces and incremental rotations. `physics.rs`
//! implements this for rapier, tests implement it with a small integrator.

use nalgebra::{Point3, UnitQuaternion, Vector3};

pub trait ChassisBody {
    /// World position of the chassis origin.
    fn position(&self) -> Point3<f32>;

    fn rotation(&self) -> UnitQuaternion<f32>;

    fn linvel(&self) -> Vector3<f32>;

    /// Force in Newtons, world space, applied at the centre of mass for this tick.
    fn apply_force(&mut self, force: Vector3<f32>);

    /// Mass-independent acceleration, world space, for this tick.
    fn apply_acceleration(&mut self, accel: Vector3<f32>);

    /// Compose `delta` onto the current orientation in the chassis frame.
    fn rotate_local(&mut self, delta: UnitQuaternion<f32>);

    /// Cast straight down (world -Y) from `origin`, ignoring vehicle chassis.
    /// Returns the hit distance when something lies within `max_dist`.
    fn raycast_down(&self, origin: Point3<f32>, max_dist: f32) -> Option<f32>;
}

// Chassis basis: +Z forward, +Y up, -X right.
#[inline]
pub fn forward(rot: &UnitQuaternion<f32>) -> Vector3<f32> {
    rot * Vector3::z()
}

#[inline]
pub fn right(rot: &UnitQuaternion<f32>) -> Vector3<f32> {
    rot * -Vector3::x()
}

#[inline]
pub fn up(rot: &UnitQuaternion<f32>) -> Vector3<f32> {
    rot * Vector3::y()
}
