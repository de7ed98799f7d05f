// ==============================================================================
// body_pose.rs — VISUAL BODY LEAN + VERTICAL SUSPENSION
// ------------------------------------------------------------------------------
// The rendered body is a separate transform riding on the physical chassis:
//
//   world position = chassis position + (0, offset_y, 0)
//   world rotation = chassis rotation * lean
//
// Lean target (degrees, + roll lowers the right side, + pitch lowers the nose):
//   Input:         roll = -steer * tilt_angle
//                  pitch = -throttle * pitch_angle
//   Acceleration:  a = (v - v_prev) / dt
//                  roll  = clamp(-(a·right)   * tilt_gain,  ±max_tilt_angle)
//                  pitch = clamp(-(a·forward) * pitch_gain, ±max_pitch_angle)
//
// The lean is slerped toward its target by clamp01(body_smooth * dt) each tick,
// an exponential-decay blend with no angular velocity state.
//
// Vertical offset is one damped spring for the whole body:
//   spring  = (rest - offset) * k
//   damp    = clamp01(1 - c * dt)
//   vv      = (vv + (spring - v_y) * dt) * damp
//   offset  = clamp(offset + vv * dt, rest - max, rest + max)
// Corners are not modelled separately, so pitch/roll do not change the travel.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::body::{forward, right};
use crate::state::{DriveAxes, VehicleState};
use crate::vehicle::{LeanConfig, LeanMode, SuspensionConfig};

/// Roll and pitch in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lean {
    pub roll: f32,
    pub pitch: f32,
}

impl Lean {
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        // pitch about +X lowers +Z, roll about +Z lowers -X (right)
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll.to_radians());
        pitch * roll
    }
}

pub fn input_lean(cfg: &LeanConfig, input: DriveAxes) -> Lean {
    Lean {
        roll: -input.steer * cfg.tilt_angle,
        pitch: -input.throttle * cfg.pitch_angle,
    }
}

pub fn acceleration_lean(
    cfg: &LeanConfig,
    rot: &UnitQuaternion<f32>,
    velocity: &Vector3<f32>,
    previous_velocity: &Vector3<f32>,
    dt: f32,
) -> Lean {
    if dt <= 0.0 {
        return Lean::default();
    }
    let accel = (velocity - previous_velocity) / dt;
    let lateral = accel.dot(&right(rot));
    let longitudinal = accel.dot(&forward(rot));

    Lean {
        roll: (-lateral * cfg.tilt_gain).clamp(-cfg.max_tilt_angle, cfg.max_tilt_angle),
        pitch: (-longitudinal * cfg.pitch_gain).clamp(-cfg.max_pitch_angle, cfg.max_pitch_angle),
    }
}

/// Advance the body spring one tick. `chassis_vy` is the chassis' vertical
/// velocity, which pushes the body the opposite way.
pub fn step_suspension(cfg: &SuspensionConfig, state: &mut VehicleState, chassis_vy: f32, dt: f32) {
    let spring_force = (cfg.rest_offset - state.body_offset_y) * cfg.spring;
    let damping = (1.0 - cfg.damping * dt).clamp(0.0, 1.0);

    state.body_vertical_velocity =
        (state.body_vertical_velocity + (spring_force - chassis_vy) * dt) * damping;

    state.body_offset_y = (state.body_offset_y + state.body_vertical_velocity * dt).clamp(
        cfg.rest_offset - cfg.max_offset,
        cfg.rest_offset + cfg.max_offset,
    );
}

#[derive(Debug, Clone)]
pub struct VisualBody {
    local_rotation: UnitQuaternion<f32>,
    target: Lean,
}

impl Default for VisualBody {
    fn default() -> Self {
        Self {
            local_rotation: UnitQuaternion::identity(),
            target: Lean::default(),
        }
    }
}

impl VisualBody {
    pub fn local_rotation(&self) -> UnitQuaternion<f32> {
        self.local_rotation
    }

    pub fn target(&self) -> Lean {
        self.target
    }

    /// Pick the lean target for this tick and blend toward it. Also records
    /// this tick's velocity for the next acceleration estimate.
    pub fn update(
        &mut self,
        cfg: &LeanConfig,
        state: &mut VehicleState,
        rot: &UnitQuaternion<f32>,
        velocity: &Vector3<f32>,
        dt: f32,
    ) {
        self.target = match cfg.mode {
            LeanMode::Input => input_lean(cfg, state.input),
            LeanMode::Acceleration => {
                acceleration_lean(cfg, rot, velocity, &state.previous_velocity, dt)
            }
        };
        state.previous_velocity = *velocity;

        let t = (cfg.body_smooth * dt).clamp(0.0, 1.0);
        let target = self.target.rotation();
        self.local_rotation = self
            .local_rotation
            .try_slerp(&target, t, 1.0e-6)
            .unwrap_or(target);
    }

    pub fn world_pose(
        &self,
        state: &VehicleState,
        chassis_pos: Point3<f32>,
        chassis_rot: UnitQuaternion<f32>,
    ) -> (Point3<f32>, UnitQuaternion<f32>) {
        (
            chassis_pos + Vector3::new(0.0, state.body_offset_y, 0.0),
            chassis_rot * self.local_rotation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleConfig;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn input_lean_leans_away_from_turn_and_squats() {
        let cfg = VehicleConfig::hatchback().lean;
        let lean = input_lean(&cfg, DriveAxes::new(1.0, 1.0));
        assert_relative_eq!(lean.roll, -5.0);
        assert_relative_eq!(lean.pitch, -3.0);
    }

    #[test]
    fn positive_roll_drops_right_side_and_positive_pitch_drops_nose() {
        let q = Lean { roll: 10.0, pitch: 0.0 }.rotation();
        assert!((q * -Vector3::x()).y < 0.0);
        let q = Lean { roll: 0.0, pitch: 10.0 }.rotation();
        assert!((q * Vector3::z()).y < 0.0);
    }

    #[test]
    fn acceleration_lean_is_clamped() {
        let cfg = VehicleConfig::pickup().lean;
        let rot = UnitQuaternion::identity();
        // huge forward + rightward kick in one tick
        let v = Vector3::new(-50.0, 0.0, 50.0);
        let lean = acceleration_lean(&cfg, &rot, &v, &Vector3::zeros(), DT);
        assert_relative_eq!(lean.roll, -cfg.max_tilt_angle);
        assert_relative_eq!(lean.pitch, -cfg.max_pitch_angle);
    }

    #[test]
    fn acceleration_lean_scales_with_gain() {
        let cfg = VehicleConfig::pickup().lean;
        let rot = UnitQuaternion::identity();
        // 1 m/s² braking
        let lean = acceleration_lean(&cfg, &rot, &Vector3::new(0.0, 0.0, 9.0), &Vector3::new(0.0, 0.0, 10.0), 1.0);
        assert_relative_eq!(lean.pitch, cfg.pitch_gain, epsilon = 1e-5);
        assert_relative_eq!(lean.roll, 0.0);
    }

    #[test]
    fn visual_body_blends_toward_target() {
        let cfg = VehicleConfig::hatchback().lean;
        let mut state = VehicleState::new(0.3);
        state.input = DriveAxes::new(0.0, 1.0);
        let mut body = VisualBody::default();
        let rot = UnitQuaternion::identity();

        body.update(&cfg, &mut state, &rot, &Vector3::zeros(), DT);
        let first = body.local_rotation().angle();
        // one tick moves a tenth of the way (6 * 1/60)
        assert_relative_eq!(first, 5.0_f32.to_radians() * 0.1, epsilon = 1e-4);

        for _ in 0..300 {
            body.update(&cfg, &mut state, &rot, &Vector3::zeros(), DT);
        }
        assert_relative_eq!(body.local_rotation().angle(), 5.0_f32.to_radians(), epsilon = 1e-4);
    }

    #[test]
    fn suspension_settles_to_rest() {
        let cfg = VehicleConfig::hatchback().suspension;
        let mut state = VehicleState::new(cfg.rest_offset);
        state.body_offset_y = cfg.rest_offset + cfg.max_offset;

        for _ in 0..600 {
            step_suspension(&cfg, &mut state, 0.0, DT);
        }
        assert_relative_eq!(state.body_offset_y, cfg.rest_offset, epsilon = 1e-4);

        for _ in 0..600 {
            step_suspension(&cfg, &mut state, 0.0, DT);
            assert!((state.body_offset_y - cfg.rest_offset).abs() < 1e-4);
        }
    }

    #[test]
    fn falling_chassis_pushes_body_up_within_travel() {
        let cfg = VehicleConfig::hatchback().suspension;
        let mut state = VehicleState::new(cfg.rest_offset);
        for _ in 0..120 {
            step_suspension(&cfg, &mut state, -30.0, DT);
            assert!(state.body_offset_y <= cfg.rest_offset + cfg.max_offset);
            assert!(state.body_offset_y >= cfg.rest_offset - cfg.max_offset);
        }
        assert!(state.body_offset_y > cfg.rest_offset);
    }

    #[test]
    fn world_pose_rides_on_chassis() {
        let state = VehicleState::new(0.3);
        let body = VisualBody::default();
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
        let (pos, q) = body.world_pose(&state, Point3::new(1.0, 2.0, 3.0), rot);
        assert_relative_eq!(pos, Point3::new(1.0, 2.3, 3.0));
        assert_relative_eq!(q, rot);
    }
}
