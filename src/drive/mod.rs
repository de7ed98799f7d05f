//! drive - engine-agnostic arcade driving model (pure math + one controller)

pub mod body_pose;
pub mod controller;
pub mod grip;
pub mod ground;
pub mod motor;
pub mod steering;
pub mod wheels;

pub use controller::{DrivingController, TickReport};
pub use ground::MIN_TRACTION_WHEELS;
