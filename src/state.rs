use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::Serialize;

/// Throttle/steer pair latched once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveAxes {
    pub throttle: f32, // -1.0 (full reverse) .. 1.0 (full forward)
    pub steer: f32,    // -1.0 (full left) .. 1.0 (full right)
}

impl DriveAxes {
    pub fn new(throttle: f32, steer: f32) -> Self {
        Self {
            throttle: throttle.clamp(-1.0, 1.0),
            steer: steer.clamp(-1.0, 1.0),
        }
    }
}

/// Per-vehicle state carried from tick to tick.
#[derive(Debug, Clone)]
pub struct VehicleState {
    pub tick: u64,
    pub input: DriveAxes,
    pub grounded_wheels: usize,
    pub has_traction: bool,
    pub body_offset_y: f32,
    pub body_vertical_velocity: f32,
    pub previous_velocity: Vector3<f32>,
}

impl VehicleState {
    pub fn new(rest_offset: f32) -> Self {
        Self {
            tick: 0,
            input: DriveAxes::default(),
            grounded_wheels: 0,
            has_traction: false,
            body_offset_y: rest_offset,
            body_vertical_velocity: 0.0,
            previous_velocity: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion i, j, k, w
}

impl Pose {
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            rotation: [rotation.i, rotation.j, rotation.k, rotation.w],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelPose {
    pub spin_deg: f32,  // accumulated roll about the axle
    pub steer_deg: f32, // absolute yaw, steerable wheels only
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub occupied: bool,
    pub speed: f32,
    pub grounded_wheels: usize,
    pub has_traction: bool,
    pub chassis: Pose,
    pub body: Pose,
    pub wheels: Vec<WheelPose>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_clamped() {
        let axes = DriveAxes::new(3.0, -7.5);
        assert_eq!(axes, DriveAxes { throttle: 1.0, steer: -1.0 });
    }

    #[test]
    fn fresh_state_sits_at_rest_offset() {
        let state = VehicleState::new(0.3);
        assert_eq!(state.body_offset_y, 0.3);
        assert_eq!(state.body_vertical_velocity, 0.0);
        assert!(!state.has_traction);
    }

    #[test]
    fn snapshot_serializes_like_the_wire_shape() {
        let snap = Snapshot {
            tick: 7,
            vehicles: vec![VehicleSnapshot {
                id: "car".into(),
                occupied: true,
                speed: 1.5,
                grounded_wheels: 4,
                has_traction: true,
                chassis: Pose::new(Point3::new(1.0, 2.0, 3.0), UnitQuaternion::identity()),
                body: Pose::new(Point3::new(1.0, 2.3, 3.0), UnitQuaternion::identity()),
                wheels: vec![WheelPose { spin_deg: 10.0, steer_deg: 0.0 }],
            }],
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["tick"], 7);
        assert_eq!(json["vehicles"][0]["chassis"]["rotation"][3], 1.0);
        assert_eq!(json["vehicles"][0]["grounded_wheels"], 4);
    }
}
