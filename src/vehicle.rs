// ==============================================================================
// vehicle.rs — VEHICLE CONFIGURATION (DESIGNER TUNABLES)
// ------------------------------------------------------------------------------
// Every tunable the driving model reads lives here. A config is validated once
// when a DrivingController is built and is immutable afterwards.
//
// Presets:
// - VehicleConfig::hatchback(): light car, input-based lean
// - VehicleConfig::pickup():    heavier, acceleration-based lean
//
// Angles are degrees (designer facing), distances meters, forces Newtons.
// ==============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    pub id: String,          // "FL", "FR", "RL", "RR"
    pub anchor: [f32; 3],    // probe origin in chassis local space
    pub steerable: bool,     // front wheel yaw follows steering
    pub rolling: bool,       // wheel mesh spins with speed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeanMode {
    /// Roll/pitch follow raw steering/throttle input.
    Input,
    /// Roll/pitch follow the chassis' lateral/forward acceleration.
    Acceleration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeanConfig {
    pub mode: LeanMode,
    pub tilt_angle: f32,        // deg per unit steer (input mode)
    pub pitch_angle: f32,       // deg per unit throttle (input mode)
    pub tilt_gain: f32,         // deg per m/s² lateral (acceleration mode)
    pub pitch_gain: f32,        // deg per m/s² forward (acceleration mode)
    pub max_tilt_angle: f32,    // deg clamp (acceleration mode)
    pub max_pitch_angle: f32,   // deg clamp (acceleration mode)
    pub body_smooth: f32,       // 1/s, slerp rate toward target
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuspensionConfig {
    pub rest_offset: f32,   // m above chassis origin
    pub spring: f32,        // 1/s²
    pub damping: f32,       // 1/s
    pub max_offset: f32,    // m of travel either side of rest
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    // --- Chassis ---
    pub mass: f32,                      // kg
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters
    pub center_of_mass: [f32; 3],       // local offset
    pub linear_damping: f32,            // drag
    pub angular_damping: f32,           // rotational drag

    // --- Engine ---
    pub motor_force: f32,   // N
    pub max_speed: f32,     // m/s

    // --- Steering ---
    pub max_steer_angle: f32,   // deg
    pub steer_speed_low: f32,   // responsiveness at standstill
    pub steer_speed_high: f32,  // responsiveness at max speed
    pub min_steer_speed: f32,   // m/s below which no yaw is applied
    pub reverse_threshold: f32, // m/s of backwards travel that flips steering

    // --- Grip ---
    pub sideways_grip: f32, // 0..10

    // --- Wheels ---
    pub wheel_radius: f32,          // m
    pub ground_probe_margin: f32,   // m added to the radius for the down probe
    pub wheels: Vec<WheelConfig>,

    // --- Visual body ---
    pub lean: LeanConfig,
    pub suspension: SuspensionConfig,
}

pub const MAX_SIDEWAYS_GRIP: f32 = 10.0;

#[derive(Debug)]
pub enum ConfigError {
    NoWheels,
    NonPositive(&'static str),
    Negative(&'static str),
    NonFinite(&'static str),
    SteerClampInverted { low: f32, high: f32 },
    GripOutOfRange(f32),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoWheels => write!(f, "vehicle has no wheels"),
            ConfigError::NonPositive(field) => write!(f, "{field} must be greater than zero"),
            ConfigError::Negative(field) => write!(f, "{field} must not be negative"),
            ConfigError::NonFinite(field) => write!(f, "{field} must be finite"),
            ConfigError::SteerClampInverted { low, high } => {
                write!(f, "steer clamp low ({low}) exceeds high ({high})")
            }
            ConfigError::GripOutOfRange(g) => {
                write!(f, "sideways grip {g} outside 0..={MAX_SIDEWAYS_GRIP}")
            }
            ConfigError::Parse(e) => write!(f, "invalid vehicle config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

fn four_wheels(x: f32, y: f32, z: f32) -> Vec<WheelConfig> {
    let wheel = |id: &str, ax: f32, az: f32, front: bool| WheelConfig {
        id: id.to_string(),
        anchor: [ax, y, az],
        steerable: front,
        rolling: true,
    };
    // +Z is forward, -X is right
    vec![
        wheel("FL",  x,  z, true),
        wheel("FR", -x,  z, true),
        wheel("RL",  x, -z, false),
        wheel("RR", -x, -z, false),
    ]
}

impl VehicleConfig {
    pub fn hatchback() -> Self {
        Self {
            mass: 1200.0,
            chassis_half_extents: [0.9, 0.4, 2.0],
            center_of_mass: [0.0, -0.5, 0.0],
            linear_damping: 0.1,
            angular_damping: 0.8,

            motor_force: 5000.0,
            max_speed: 25.0,

            max_steer_angle: 30.0,
            steer_speed_low: 2.0,
            steer_speed_high: 8.0,
            min_steer_speed: 0.05,
            reverse_threshold: 0.1,

            sideways_grip: 3.0,

            wheel_radius: 0.35,
            ground_probe_margin: 0.1,
            wheels: four_wheels(0.8, -0.4, 1.4),

            lean: LeanConfig {
                mode: LeanMode::Input,
                tilt_angle: 5.0,
                pitch_angle: 3.0,
                tilt_gain: 0.6,
                pitch_gain: 0.4,
                max_tilt_angle: 6.0,
                max_pitch_angle: 4.0,
                body_smooth: 6.0,
            },
            suspension: SuspensionConfig {
                rest_offset: 0.3,
                spring: 250.0,
                damping: 20.0,
                max_offset: 0.7,
            },
        }
    }

    pub fn pickup() -> Self {
        let base = Self::hatchback();
        Self {
            mass: 2100.0,
            chassis_half_extents: [1.0, 0.5, 2.6],
            center_of_mass: [0.0, -0.6, 0.0],
            motor_force: 9000.0,
            max_speed: 22.0,
            max_steer_angle: 28.0,
            steer_speed_low: 1.5,
            steer_speed_high: 6.0,
            sideways_grip: 4.0,
            wheel_radius: 0.45,
            wheels: four_wheels(0.9, -0.5, 1.8),
            lean: LeanConfig {
                mode: LeanMode::Acceleration,
                max_tilt_angle: 8.0,
                max_pitch_angle: 5.0,
                body_smooth: 4.0,
                ..base.lean
            },
            suspension: SuspensionConfig {
                rest_offset: 0.4,
                spring: 180.0,
                damping: 14.0,
                max_offset: 0.9,
            },
            ..base
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: VehicleConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Length of each wheel's downward ground probe.
    pub fn probe_length(&self) -> f32 {
        self.wheel_radius + self.ground_probe_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wheels.is_empty() {
            return Err(ConfigError::NoWheels);
        }

        let [hx, hy, hz] = self.chassis_half_extents;
        let [cx, cy, cz] = self.center_of_mass;
        let lean = &self.lean;
        let susp = &self.suspension;

        let finite = [
            ("mass", self.mass),
            ("chassis_half_extents.x", hx),
            ("chassis_half_extents.y", hy),
            ("chassis_half_extents.z", hz),
            ("center_of_mass.x", cx),
            ("center_of_mass.y", cy),
            ("center_of_mass.z", cz),
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
            ("motor_force", self.motor_force),
            ("max_speed", self.max_speed),
            ("max_steer_angle", self.max_steer_angle),
            ("steer_speed_low", self.steer_speed_low),
            ("steer_speed_high", self.steer_speed_high),
            ("min_steer_speed", self.min_steer_speed),
            ("reverse_threshold", self.reverse_threshold),
            ("sideways_grip", self.sideways_grip),
            ("wheel_radius", self.wheel_radius),
            ("ground_probe_margin", self.ground_probe_margin),
            ("lean.tilt_angle", lean.tilt_angle),
            ("lean.pitch_angle", lean.pitch_angle),
            ("lean.tilt_gain", lean.tilt_gain),
            ("lean.pitch_gain", lean.pitch_gain),
            ("lean.max_tilt_angle", lean.max_tilt_angle),
            ("lean.max_pitch_angle", lean.max_pitch_angle),
            ("lean.body_smooth", lean.body_smooth),
            ("suspension.rest_offset", susp.rest_offset),
            ("suspension.spring", susp.spring),
            ("suspension.damping", susp.damping),
            ("suspension.max_offset", susp.max_offset),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite(*field));
        }

        let positive = [
            ("mass", self.mass),
            ("chassis_half_extents.x", hx),
            ("chassis_half_extents.y", hy),
            ("chassis_half_extents.z", hz),
            ("max_speed", self.max_speed),
            ("wheel_radius", self.wheel_radius),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::NonPositive(*field));
        }

        // zero is a valid setting for these
        let non_negative = [
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
            ("min_steer_speed", self.min_steer_speed),
            ("reverse_threshold", self.reverse_threshold),
            ("ground_probe_margin", self.ground_probe_margin),
            ("lean.max_tilt_angle", lean.max_tilt_angle),
            ("lean.max_pitch_angle", lean.max_pitch_angle),
            ("lean.body_smooth", lean.body_smooth),
            ("suspension.max_offset", susp.max_offset),
        ];
        if let Some((field, _)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::Negative(*field));
        }

        if self.steer_speed_low > self.steer_speed_high {
            return Err(ConfigError::SteerClampInverted {
                low: self.steer_speed_low,
                high: self.steer_speed_high,
            });
        }
        if !(0.0..=MAX_SIDEWAYS_GRIP).contains(&self.sideways_grip) {
            return Err(ConfigError::GripOutOfRange(self.sideways_grip));
        }

        Ok(())
    }
}
