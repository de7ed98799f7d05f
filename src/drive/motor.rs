use nalgebra::{UnitQuaternion, Vector3};

use crate::body::forward;

/// Forward drive force for this tick, or `None` once the speed cap is reached.
///
/// The cap gates the force rather than clamping velocity: overspeed from a fall
/// or a collision is left to decay through drag.
pub fn motor_force(
    rot: &UnitQuaternion<f32>,
    linvel: &Vector3<f32>,
    throttle: f32,
    motor_force: f32,
    max_speed: f32,
) -> Option<Vector3<f32>> {
    if linvel.norm() >= max_speed {
        return None;
    }
    Some(forward(rot) * (throttle * motor_force))
}
