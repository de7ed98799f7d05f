// ==============================================================================
// occupancy.rs — SEAT (ENTER / EXIT) COLLABORATOR
// ------------------------------------------------------------------------------
// One driver seat per vehicle. Entering hands the driver's input to the
// vehicle; exiting hands it back and returns where the driver should reappear.
//
//   enter on an occupied seat -> OccupancyError::Occupied, nothing changes
//   exit on an empty seat     -> OccupancyError::Empty,    nothing changes
//
// Requests reach the world as SeatRequest messages over an unbounded channel
// and are drained at the tick boundary.
// ==============================================================================

use std::fmt;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::Serialize;

use crate::drive::DrivingController;
use crate::input::VehicleInput;

#[derive(Debug, Clone, PartialEq)]
pub enum SeatRequest {
    Enter { vehicle: String, occupant: String },
    Exit { vehicle: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum OccupancyError {
    Occupied { occupant: String },
    Empty,
    UnknownVehicle(String),
}

impl fmt::Display for OccupancyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyError::Occupied { occupant } => write!(f, "vehicle occupied by {occupant}"),
            OccupancyError::Empty => write!(f, "vehicle is empty, can't exit"),
            OccupancyError::UnknownVehicle(id) => write!(f, "no vehicle with id {id}"),
        }
    }
}

impl std::error::Error for OccupancyError {}

/// Where a driver leaving a vehicle should be placed.
#[derive(Debug, Clone, Serialize)]
pub struct ExitPlacement {
    pub vehicle: String,
    pub occupant: String,
    pub position: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct VehicleSeat {
    occupant: Option<String>,
    exit_offset: Vector3<f32>, // chassis local, +X is the driver's left
}

impl VehicleSeat {
    pub fn new(exit_offset: [f32; 3]) -> Self {
        Self {
            occupant: None,
            exit_offset: Vector3::from(exit_offset),
        }
    }

    pub fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn enter(
        &mut self,
        occupant: String,
        input: &mut VehicleInput,
        controller: &mut DrivingController,
    ) -> Result<(), OccupancyError> {
        if let Some(current) = &self.occupant {
            return Err(OccupancyError::Occupied { occupant: current.clone() });
        }

        self.occupant = Some(occupant);
        input.enable(true);
        controller.set_input_enabled(true);
        Ok(())
    }

    pub fn exit(
        &mut self,
        vehicle: &str,
        input: &mut VehicleInput,
        controller: &mut DrivingController,
        chassis_pos: Point3<f32>,
        chassis_rot: UnitQuaternion<f32>,
    ) -> Result<ExitPlacement, OccupancyError> {
        let occupant = self.occupant.take().ok_or(OccupancyError::Empty)?;

        input.disable();
        controller.set_input_enabled(false);

        let p = chassis_pos + chassis_rot * self.exit_offset;
        Ok(ExitPlacement {
            vehicle: vehicle.to_string(),
            occupant,
            position: [p.x, p.y, p.z],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleConfig;
    use approx::assert_relative_eq;

    fn parts() -> (VehicleSeat, VehicleInput, DrivingController) {
        (
            VehicleSeat::new([1.8, 0.0, 0.0]),
            VehicleInput::new(),
            DrivingController::new(VehicleConfig::hatchback()).unwrap(),
        )
    }

    #[test]
    fn enter_enables_input() {
        let (mut seat, mut input, mut ctrl) = parts();
        seat.enter("alice".into(), &mut input, &mut ctrl).unwrap();
        assert_eq!(seat.occupant(), Some("alice"));
        assert!(input.is_enabled());
    }

    #[test]
    fn second_enter_is_rejected_without_change() {
        let (mut seat, mut input, mut ctrl) = parts();
        seat.enter("alice".into(), &mut input, &mut ctrl).unwrap();
        let err = seat.enter("bob".into(), &mut input, &mut ctrl).unwrap_err();
        assert_eq!(err, OccupancyError::Occupied { occupant: "alice".into() });
        assert_eq!(seat.occupant(), Some("alice"));
        assert!(input.is_enabled());
    }

    #[test]
    fn exit_on_empty_seat_is_rejected() {
        let (mut seat, mut input, mut ctrl) = parts();
        let err = seat
            .exit("car", &mut input, &mut ctrl, Point3::origin(), UnitQuaternion::identity())
            .unwrap_err();
        assert_eq!(err, OccupancyError::Empty);
        assert!(!seat.is_occupied());
        assert!(!input.is_enabled());
    }

    #[test]
    fn exit_places_driver_beside_the_car() {
        let (mut seat, mut input, mut ctrl) = parts();
        seat.enter("alice".into(), &mut input, &mut ctrl).unwrap();

        // car turned to face +X: its left (+X local) is now -Z
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
        let placement = seat
            .exit("car", &mut input, &mut ctrl, Point3::new(10.0, 1.0, 0.0), rot)
            .unwrap();

        assert_eq!(placement.occupant, "alice");
        assert_relative_eq!(placement.position[0], 10.0, epsilon = 1e-5);
        assert_relative_eq!(placement.position[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(placement.position[2], -1.8, epsilon = 1e-5);
        assert!(!seat.is_occupied());
        assert!(!input.is_enabled());
    }
}
