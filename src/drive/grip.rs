use nalgebra::{UnitQuaternion, Vector3};

use crate::body::right;

/// Acceleration cancelling part of the chassis' sideways velocity.
///
/// Stand-in for tire side friction: `-(v·right) * grip` along `right`. No slip
/// angle or load dependence.
pub fn lateral_correction(
    rot: &UnitQuaternion<f32>,
    linvel: &Vector3<f32>,
    grip: f32,
) -> Vector3<f32> {
    let side = right(rot);
    let lateral = linvel.dot(&side);
    side * (-lateral * grip)
}
