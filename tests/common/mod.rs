//! In-memory chassis over a flat floor at y = 0, integrated with explicit Euler.
//! Height is held fixed; only planar motion and yaw are simulated.

use arcade_drive::body::ChassisBody;
use arcade_drive::drive::{DrivingController, TickReport};
use arcade_drive::input::InputSource;
use nalgebra::{Point3, UnitQuaternion, Vector3};

pub const DT: f32 = 1.0 / 60.0;

pub struct TestChassis {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    pub mass: f32,
    pub linear_damping: f32,
    /// Whether the floor exists under a probe origin.
    pub floor: fn(&Point3<f32>) -> bool,
    force: Vector3<f32>,
    accel: Vector3<f32>,
}

pub fn everywhere(_: &Point3<f32>) -> bool {
    true
}

impl TestChassis {
    /// Resting with the wheel anchors `clearance` above the floor.
    pub fn on_floor(mass: f32, anchor_y: f32, clearance: f32) -> Self {
        Self {
            position: Point3::new(0.0, clearance - anchor_y, 0.0),
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            mass,
            linear_damping: 0.0,
            floor: everywhere,
            force: Vector3::zeros(),
            accel: Vector3::zeros(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    pub fn integrate(&mut self, dt: f32) {
        self.velocity += (self.force / self.mass + self.accel) * dt;
        self.velocity *= 1.0 / (1.0 + dt * self.linear_damping);
        self.velocity.y = 0.0;
        self.position += self.velocity * dt;
        self.force = Vector3::zeros();
        self.accel = Vector3::zeros();
    }

    /// One controller tick followed by one integration step.
    pub fn tick<I: InputSource>(
        &mut self,
        controller: &mut DrivingController,
        input: &I,
    ) -> TickReport {
        let report = controller.fixed_update(self, input, DT);
        self.integrate(DT);
        report
    }
}

impl ChassisBody for TestChassis {
    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    fn linvel(&self) -> Vector3<f32> {
        self.velocity
    }

    fn apply_force(&mut self, force: Vector3<f32>) {
        self.force += force;
    }

    fn apply_acceleration(&mut self, accel: Vector3<f32>) {
        self.accel += accel;
    }

    fn rotate_local(&mut self, delta: UnitQuaternion<f32>) {
        self.rotation *= delta;
    }

    fn raycast_down(&self, origin: Point3<f32>, max_dist: f32) -> Option<f32> {
        ((self.floor)(&origin) && origin.y >= 0.0 && origin.y <= max_dist).then_some(origin.y)
    }
}
