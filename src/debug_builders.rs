// ==============================================================================
// debug_builders.rs — DEBUG OVERLAY PRIMITIVES
// ------------------------------------------------------------------------------
// Serializable debug primitives for a viewer:
// - DebugRay: one per ground probe, green on hit, red on miss
// - DebugChassis: chassis pose + box extents
//
// Purely visualization scaffolding; nothing here feeds back into physics.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion};
use serde::Serialize;

use crate::drive::ground::GroundReport;

const HIT_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
const MISS_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

#[derive(Clone, Debug, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugChassis {
    pub vehicle: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion
    pub half_extents: [f32; 3],
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DebugOverlay {
    pub chassis: Vec<DebugChassis>,
    pub ground_rays: Vec<DebugRay>,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.chassis.clear();
        self.ground_rays.clear();
    }
}

pub fn push_ground_rays(overlay: &mut DebugOverlay, report: &GroundReport) {
    for probe in &report.probes {
        let o = probe.origin;
        overlay.ground_rays.push(DebugRay {
            origin: [o.x, o.y, o.z],
            direction: [0.0, -1.0, 0.0],
            length: probe.length,
            hit: probe.hit.map(|d| [o.x, o.y - d, o.z]),
            color: if probe.grounded() { HIT_COLOR } else { MISS_COLOR },
        });
    }
}

pub fn push_chassis(
    overlay: &mut DebugOverlay,
    vehicle: &str,
    position: Point3<f32>,
    rotation: UnitQuaternion<f32>,
    half_extents: [f32; 3],
) {
    overlay.chassis.push(DebugChassis {
        vehicle: vehicle.to_string(),
        position: [position.x, position.y, position.z],
        rotation: [rotation.i, rotation.j, rotation.k, rotation.w],
        half_extents,
    });
}
