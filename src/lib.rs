//! Arcade vehicle driving core: ground probes, traction gate, motor, steering,
//! lateral grip, wheel visuals and a visual body with lean and suspension,
//! run per fixed tick against a rapier world.

pub mod body;
pub mod debug_builders;
pub mod drive;
pub mod input;
pub mod occupancy;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod vehicle;

pub use body::ChassisBody;
pub use drive::{DrivingController, TickReport};
pub use input::{InputSource, VehicleInput};
pub use physics::PhysicsWorld;
pub use vehicle::{ConfigError, VehicleConfig};
