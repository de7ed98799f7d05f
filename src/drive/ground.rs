// ==============================================================================
// ground.rs — GROUND SENSOR + TRACTION GATE
// ------------------------------------------------------------------------------
// One straight-down probe per wheel anchor, length wheel_radius + margin. The
// chassis decides what "not self" means (vehicle collision group for rapier).
//
// A wheel counts as grounded when its probe hits anything. No compression or
// normal force is derived here; the body offset is a single spring elsewhere.
// ==============================================================================

use nalgebra::Point3;

use crate::body::ChassisBody;
use crate::vehicle::VehicleConfig;

/// Grounded wheels needed before motor, steering and grip act.
pub const MIN_TRACTION_WHEELS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct WheelProbe {
    pub origin: Point3<f32>,
    pub length: f32,
    pub hit: Option<f32>, // distance along the probe
}

impl WheelProbe {
    pub fn grounded(&self) -> bool {
        self.hit.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroundReport {
    pub probes: Vec<WheelProbe>,
    pub grounded: usize,
}

#[inline]
pub fn has_traction(grounded: usize) -> bool {
    grounded >= MIN_TRACTION_WHEELS
}

pub fn sense_ground<B: ChassisBody + ?Sized>(body: &B, config: &VehicleConfig) -> GroundReport {
    let pos = body.position();
    let rot = body.rotation();
    let length = config.probe_length();

    let probes: Vec<WheelProbe> = config
        .wheels
        .iter()
        .map(|wheel| {
            let [x, y, z] = wheel.anchor;
            let origin = pos + rot * nalgebra::Vector3::new(x, y, z);
            WheelProbe {
                origin,
                length,
                hit: body.raycast_down(origin, length),
            }
        })
        .collect();

    let grounded = probes.iter().filter(|p| p.grounded()).count();

    GroundReport { probes, grounded }
}
