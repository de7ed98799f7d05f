//! Wheel mesh presentation: spin from rolling speed, yaw from steering.
//! Nothing here feeds back into the chassis.

use crate::state::WheelPose;
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone)]
pub struct WheelVisuals {
    poses: Vec<WheelPose>,
}

impl WheelVisuals {
    pub fn new(config: &VehicleConfig) -> Self {
        Self {
            poses: vec![WheelPose { spin_deg: 0.0, steer_deg: 0.0 }; config.wheels.len()],
        }
    }

    pub fn poses(&self) -> &[WheelPose] {
        &self.poses
    }

    /// Integrate spin by `speed / radius` and set steerable wheel yaw to
    /// `steer * max_steer_angle`.
    pub fn update(&mut self, config: &VehicleConfig, speed: f32, steer: f32, dt: f32) {
        let spin_step = (speed / config.wheel_radius).to_degrees() * dt;
        let steer_deg = steer * config.max_steer_angle;

        for (pose, wheel) in self.poses.iter_mut().zip(&config.wheels) {
            if wheel.rolling {
                pose.spin_deg = (pose.spin_deg + spin_step).rem_euclid(360.0);
            }
            if wheel.steerable {
                pose.steer_deg = steer_deg;
            }
        }
    }
}
