// ==============================================================================
// input.rs — DRIVER INPUT COLLABORATOR
// ------------------------------------------------------------------------------
// InputSource is what the driving controller reads once per tick.
// VehicleInput is the handler the outside world writes into: axes, an
// enable flag (a disabled handler reads neutral), and a latched exit request
// consumed by the world at the next tick boundary.
// ==============================================================================

use crate::state::DriveAxes;

pub trait InputSource {
    fn throttle(&self) -> f32;
    fn steering(&self) -> f32;
}

impl InputSource for DriveAxes {
    fn throttle(&self) -> f32 {
        self.throttle
    }

    fn steering(&self) -> f32 {
        self.steer
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleInput {
    axes: DriveAxes,
    enabled: bool,
    exit_requested: bool,
}

impl VehicleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_axes(&mut self, throttle: f32, steer: f32) {
        self.axes = DriveAxes::new(throttle, steer);
    }

    pub fn enable(&mut self, state: bool) {
        self.enabled = state;
        if !state {
            self.exit_requested = false;
        }
    }

    pub fn disable(&mut self) {
        self.enable(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Driver pressed "exit". Ignored while the handler is disabled.
    pub fn request_exit(&mut self) {
        if self.enabled {
            self.exit_requested = true;
        }
    }

    pub fn take_exit_request(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }
}

impl InputSource for VehicleInput {
    fn throttle(&self) -> f32 {
        if self.enabled { self.axes.throttle } else { 0.0 }
    }

    fn steering(&self) -> f32 {
        if self.enabled { self.axes.steer } else { 0.0 }
    }
}
