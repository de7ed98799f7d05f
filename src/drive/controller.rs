// ==============================================================================
// controller.rs — PER-VEHICLE FIXED TICK
// ------------------------------------------------------------------------------
// Phase order (one call to fixed_update):
//   0) apply pending enable/disable, latch input
//   1) ground sensor           -> grounded wheel count
//   2) traction gate           -> has_traction (>= 2 wheels)
//   3) motor                   [input enabled && traction]
//   4) steering                [input enabled && traction]
//   5) lateral grip            [traction]
//   6) wheel visuals           [input enabled]
//   7) body lean + suspension  [always]
//
// The chassis is only touched through ChassisBody. Velocity used by every phase
// is the value read at the start of the tick; forces land in the solver step
// that follows.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::body::ChassisBody;
use crate::drive::body_pose::{step_suspension, VisualBody};
use crate::drive::ground::{has_traction, sense_ground, GroundReport};
use crate::drive::grip::lateral_correction;
use crate::drive::motor::motor_force;
use crate::drive::steering::{yaw_delta_deg, yaw_rotation};
use crate::drive::wheels::WheelVisuals;
use crate::input::InputSource;
use crate::state::{DriveAxes, VehicleState, WheelPose};
use crate::vehicle::{ConfigError, VehicleConfig};

/// What one tick did, for diagnostics and tests.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub ground: GroundReport,
    pub has_traction: bool,
    pub input_enabled: bool,
    pub motor_force: Option<Vector3<f32>>,
    pub yaw_delta_deg: Option<f32>,
    pub grip_accel: Option<Vector3<f32>>,
}

#[derive(Debug, Clone)]
pub struct DrivingController {
    config: VehicleConfig,
    state: VehicleState,
    wheels: WheelVisuals,
    body: VisualBody,
    input_enabled: bool,
    pending_enabled: Option<bool>,
}

impl DrivingController {
    pub fn new(config: VehicleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: VehicleState::new(config.suspension.rest_offset),
            wheels: WheelVisuals::new(&config),
            body: VisualBody::default(),
            input_enabled: false,
            pending_enabled: None,
            config,
        })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn wheel_poses(&self) -> &[WheelPose] {
        self.wheels.poses()
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Takes effect at the start of the next tick; a tick in progress is
    /// never affected. Suspension and lean state are kept either way.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.pending_enabled = Some(enabled);
    }

    /// Forget the last velocity sample after the chassis was teleported, so
    /// acceleration lean does not read the jump as a spike.
    pub fn reset_motion(&mut self) {
        self.state.previous_velocity = Vector3::zeros();
    }

    /// World pose of the rendered body for a given chassis pose.
    pub fn visual_body_pose(
        &self,
        chassis_pos: Point3<f32>,
        chassis_rot: UnitQuaternion<f32>,
    ) -> (Point3<f32>, UnitQuaternion<f32>) {
        self.body.world_pose(&self.state, chassis_pos, chassis_rot)
    }

    pub fn fixed_update<B, I>(&mut self, chassis: &mut B, input: &I, dt: f32) -> TickReport
    where
        B: ChassisBody + ?Sized,
        I: InputSource + ?Sized,
    {
        if let Some(enabled) = self.pending_enabled.take() {
            self.input_enabled = enabled;
        }

        // A disabled input device reads neutral.
        self.state.input = if self.input_enabled {
            DriveAxes::new(input.throttle(), input.steering())
        } else {
            DriveAxes::default()
        };
        let axes = self.state.input;

        let rot = chassis.rotation();
        let linvel = chassis.linvel();
        let speed = linvel.norm();

        // 1-2) ground + traction
        let ground = sense_ground(chassis, &self.config);
        self.state.grounded_wheels = ground.grounded;
        self.state.has_traction = has_traction(ground.grounded);

        let mut report = TickReport {
            has_traction: self.state.has_traction,
            input_enabled: self.input_enabled,
            ground,
            ..TickReport::default()
        };

        if self.state.has_traction {
            if self.input_enabled {
                // 3) motor
                if let Some(force) = motor_force(
                    &rot,
                    &linvel,
                    axes.throttle,
                    self.config.motor_force,
                    self.config.max_speed,
                ) {
                    chassis.apply_force(force);
                    report.motor_force = Some(force);
                }

                // 4) steering
                if let Some(yaw) =
                    yaw_delta_deg(&rot, &linvel, axes.steer, axes.throttle, &self.config, dt)
                {
                    chassis.rotate_local(yaw_rotation(yaw));
                    report.yaw_delta_deg = Some(yaw);
                }
            }

            // 5) grip is a passive tire property
            let accel = lateral_correction(&rot, &linvel, self.config.sideways_grip);
            chassis.apply_acceleration(accel);
            report.grip_accel = Some(accel);
        }

        // 6) wheel visuals
        if self.input_enabled {
            self.wheels.update(&self.config, speed, axes.steer, dt);
        }

        // 7) body lean + suspension
        self.body
            .update(&self.config.lean, &mut self.state, &rot, &linvel, dt);
        step_suspension(&self.config.suspension, &mut self.state, linvel.y, dt);

        self.state.tick += 1;

        log::trace!(
            "tick {} grounded={} traction={} throttle={:+.2} steer={:+.2} offset={:.3}",
            self.state.tick,
            self.state.grounded_wheels,
            self.state.has_traction,
            axes.throttle,
            axes.steer,
            self.state.body_offset_y,
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Chassis frozen in place; records what the controller asked for.
    struct Recorder {
        vel: Vector3<f32>,
        ground_hits: bool,
        forces: Vec<Vector3<f32>>,
        accels: Vec<Vector3<f32>>,
        turns: usize,
    }

    impl Recorder {
        fn new(vel: Vector3<f32>, ground_hits: bool) -> Self {
            Self { vel, ground_hits, forces: vec![], accels: vec![], turns: 0 }
        }
    }

    impl ChassisBody for Recorder {
        fn position(&self) -> Point3<f32> { Point3::new(0.0, 0.6, 0.0) }
        fn rotation(&self) -> UnitQuaternion<f32> { UnitQuaternion::identity() }
        fn linvel(&self) -> Vector3<f32> { self.vel }
        fn apply_force(&mut self, f: Vector3<f32>) { self.forces.push(f) }
        fn apply_acceleration(&mut self, a: Vector3<f32>) { self.accels.push(a) }
        fn rotate_local(&mut self, _: UnitQuaternion<f32>) { self.turns += 1 }
        fn raycast_down(&self, _: Point3<f32>, _: f32) -> Option<f32> {
            self.ground_hits.then_some(0.2)
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn enabled_controller() -> DrivingController {
        let mut c = DrivingController::new(VehicleConfig::hatchback()).unwrap();
        c.set_input_enabled(true);
        c
    }

    #[test]
    fn rejects_bad_config() {
        let mut cfg = VehicleConfig::hatchback();
        cfg.wheels.clear();
        assert!(DrivingController::new(cfg).is_err());
    }

    #[test]
    fn enable_waits_for_tick_boundary() {
        let mut c = DrivingController::new(VehicleConfig::hatchback()).unwrap();
        assert!(!c.input_enabled());
        c.set_input_enabled(true);
        assert!(!c.input_enabled());

        let mut body = Recorder::new(Vector3::new(0.0, 0.0, 5.0), true);
        let report = c.fixed_update(&mut body, &DriveAxes::new(1.0, 0.0), DT);
        assert!(report.input_enabled);
        assert!(c.input_enabled());
    }

    #[test]
    fn disabled_input_still_grips_but_does_not_drive() {
        let mut c = DrivingController::new(VehicleConfig::hatchback()).unwrap();
        let mut body = Recorder::new(Vector3::new(-1.0, 0.0, 5.0), true);
        let report = c.fixed_update(&mut body, &DriveAxes::new(1.0, 1.0), DT);

        assert!(body.forces.is_empty());
        assert_eq!(body.turns, 0);
        assert_eq!(body.accels.len(), 1);
        assert!(report.grip_accel.is_some());
        assert_eq!(c.state().input, DriveAxes::default());
        assert!(c.wheel_poses().iter().all(|w| w.spin_deg == 0.0));
    }

    #[test]
    fn airborne_skips_motor_steer_and_grip() {
        let mut c = enabled_controller();
        let mut body = Recorder::new(Vector3::new(-1.0, -3.0, 5.0), false);
        let report = c.fixed_update(&mut body, &DriveAxes::new(1.0, 1.0), DT);

        assert!(!report.has_traction);
        assert!(report.motor_force.is_none());
        assert!(report.yaw_delta_deg.is_none());
        assert!(report.grip_accel.is_none());
        assert!(body.forces.is_empty() && body.accels.is_empty());
        assert_eq!(body.turns, 0);
        // body still reacts to the fall
        assert!(c.state().body_offset_y > VehicleConfig::hatchback().suspension.rest_offset);
    }

    #[test]
    fn grounded_and_enabled_runs_every_phase() {
        let mut c = enabled_controller();
        let mut body = Recorder::new(Vector3::new(0.0, 0.0, 5.0), true);
        let report = c.fixed_update(&mut body, &DriveAxes::new(1.0, 0.5), DT);

        assert_eq!(report.ground.grounded, 4);
        assert_eq!(body.forces.len(), 1);
        assert_eq!(body.turns, 1);
        assert_eq!(body.accels.len(), 1);
        assert_eq!(c.wheel_poses()[0].steer_deg, 15.0);
        assert_eq!(c.state().tick, 1);
    }

    #[test]
    fn reset_motion_clears_velocity_history() {
        let mut c = enabled_controller();
        let mut body = Recorder::new(Vector3::new(0.0, 0.0, 12.0), true);
        c.fixed_update(&mut body, &DriveAxes::default(), DT);
        assert_eq!(c.state().previous_velocity, Vector3::new(0.0, 0.0, 12.0));

        c.reset_motion();
        assert_eq!(c.state().previous_velocity, Vector3::zeros());
    }

    #[test]
    fn disabling_carries_suspension_and_lean_over() {
        let mut c = enabled_controller();
        let mut body = Recorder::new(Vector3::new(0.0, -4.0, 0.0), true);
        let full = DriveAxes::new(1.0, 1.0);
        for _ in 0..5 {
            c.fixed_update(&mut body, &full, DT);
        }
        let carried = c.state().clone();
        let (_, lean_before) = c.visual_body_pose(Point3::origin(), UnitQuaternion::identity());
        assert!(lean_before.angle() > 0.0);

        c.set_input_enabled(false);
        let report = c.fixed_update(&mut body, &full, DT);
        assert!(!report.input_enabled);

        // the spring continues from where it was, no reset to rest
        let mut expected = carried.clone();
        step_suspension(&c.config().suspension, &mut expected, -4.0, DT);
        assert_eq!(c.state().body_offset_y, expected.body_offset_y);
        assert_eq!(c.state().body_vertical_velocity, expected.body_vertical_velocity);
        assert!(c.state().body_offset_y != c.config().suspension.rest_offset);
        assert!(c.state().body_vertical_velocity != 0.0);

        // lean eases toward neutral instead of snapping
        let (_, lean_after) = c.visual_body_pose(Point3::origin(), UnitQuaternion::identity());
        assert!(lean_after.angle() > 0.0);
        assert!(lean_after.angle() < lean_before.angle());
    }
}
