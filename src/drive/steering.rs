// ==============================================================================
// steering.rs — SPEED-SENSITIVE YAW STEERING
// ------------------------------------------------------------------------------
// Steering rotates the chassis directly (no wheel forces):
//
//   rate  = lerp(steer_speed_low, steer_speed_high, clamp01(speed / max_speed))
//   yaw   = steer * max_steer_angle * direction * rate * dt      [deg, + = right]
//
// direction is -1 while rolling backwards (v·fwd < -reverse_threshold) with
// throttle <= 0, so the nose swings the way the stick points in reverse.
// Nothing happens below min_steer_speed to avoid spinning on the spot.
// ==============================================================================

use nalgebra::{UnitQuaternion, Vector3};

use crate::body::forward;
use crate::vehicle::VehicleConfig;

#[inline]
pub fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Responsiveness multiplier for the current speed.
pub fn steer_rate(speed: f32, config: &VehicleConfig) -> f32 {
    lerp_clamped(
        config.steer_speed_low,
        config.steer_speed_high,
        speed / config.max_speed,
    )
}

pub fn is_reversing(forward_speed: f32, throttle: f32, threshold: f32) -> bool {
    forward_speed < -threshold && throttle <= 0.0
}

/// Yaw change in degrees for this tick; positive turns right.
/// `None` below the minimum steering speed.
pub fn yaw_delta_deg(
    rot: &UnitQuaternion<f32>,
    linvel: &Vector3<f32>,
    steer: f32,
    throttle: f32,
    config: &VehicleConfig,
    dt: f32,
) -> Option<f32> {
    let speed = linvel.norm();
    if speed < config.min_steer_speed {
        return None;
    }

    let forward_speed = linvel.dot(&forward(rot));
    let direction = if is_reversing(forward_speed, throttle, config.reverse_threshold) {
        -1.0
    } else {
        1.0
    };

    let steer_amount = steer * config.max_steer_angle * direction;
    Some(steer_amount * steer_rate(speed, config) * dt)
}

/// Incremental chassis-frame rotation for a yaw in degrees (+ = right).
pub fn yaw_rotation(yaw_deg: f32) -> UnitQuaternion<f32> {
    // +Y rotation turns +Z toward +X, which is left
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -yaw_deg.to_radians())
}
