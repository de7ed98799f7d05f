// src/physics.rs

use std::collections::HashMap;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use rapier3d::prelude::{
    vector, ActiveEvents, CCDSolver, CoefficientCombineRule, ColliderBuilder, ColliderSet,
    DefaultBroadPhase, Group, ImpulseJointSet, IntegrationParameters, InteractionGroups,
    IslandManager, MassProperties, MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryFilter,
    QueryPipeline, Ray, Real, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::body::ChassisBody;
use crate::debug_builders::{push_chassis, push_ground_rays, DebugOverlay};
use crate::drive::DrivingController;
use crate::input::VehicleInput;
use crate::occupancy::{ExitPlacement, OccupancyError, SeatRequest, VehicleSeat};
use crate::state::{Pose, Snapshot, VehicleSnapshot};
use crate::vehicle::{ConfigError, VehicleConfig};

const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
const GROUP_VEHICLE: Group = Group::from_bits_truncate(0b0010);

const WORLD_LIMIT: f32 = 1_000.0;
const SEAT_EXIT_OFFSET: [f32; 3] = [1.8, 0.0, 0.0];

// --------------------------------------------------
// rapier chassis adapter
// --------------------------------------------------

/// One chassis inside a rapier body set, seen through `ChassisBody`.
///
/// Holds the whole body set so the down-probe can run the query pipeline while
/// the chassis itself is borrowed mutably.
pub struct RapierChassis<'a> {
    handle: RigidBodyHandle,
    bodies: &'a mut RigidBodySet,
    colliders: &'a ColliderSet,
    query_pipeline: &'a QueryPipeline,
}

impl<'a> RapierChassis<'a> {
    pub fn new(
        handle: RigidBodyHandle,
        bodies: &'a mut RigidBodySet,
        colliders: &'a ColliderSet,
        query_pipeline: &'a QueryPipeline,
    ) -> Option<Self> {
        bodies.contains(handle).then_some(Self {
            handle,
            bodies,
            colliders,
            query_pipeline,
        })
    }
}

impl ChassisBody for RapierChassis<'_> {
    fn position(&self) -> Point3<f32> {
        Point3::from(*self.bodies[self.handle].translation())
    }

    fn rotation(&self) -> UnitQuaternion<f32> {
        *self.bodies[self.handle].rotation()
    }

    fn linvel(&self) -> Vector3<f32> {
        *self.bodies[self.handle].linvel()
    }

    fn apply_force(&mut self, force: Vector3<f32>) {
        self.bodies[self.handle].add_force(force, true);
    }

    fn apply_acceleration(&mut self, accel: Vector3<f32>) {
        let body = &mut self.bodies[self.handle];
        let mass = body.mass();
        body.add_force(accel * mass, true);
    }

    fn rotate_local(&mut self, delta: UnitQuaternion<f32>) {
        let body = &mut self.bodies[self.handle];
        let rot = *body.rotation() * delta;
        body.set_rotation(rot, true);
    }

    fn raycast_down(&self, origin: Point3<f32>, max_dist: f32) -> Option<f32> {
        let ray = Ray::new(origin, vector![0.0, -1.0, 0.0]);
        // everything except vehicle chassis, including our own
        let filter = QueryFilter::default()
            .groups(InteractionGroups::new(Group::ALL, !GROUP_VEHICLE));

        self.query_pipeline
            .cast_ray(&*self.bodies, self.colliders, &ray, max_dist, true, filter)
            .map(|(_, toi)| toi)
    }
}

// --------------------------------------------------
// world
// --------------------------------------------------

pub struct Vehicle {
    pub body: RigidBodyHandle,
    pub spawn_position: [f32; 3], // runaway reset target
    pub controller: DrivingController,
    pub input: VehicleInput,
    pub seat: VehicleSeat,
}

pub struct PhysicsWorld {
    pub gravity: Vector3<Real>,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline, // ground probes
    pub vehicles: HashMap<String, Vehicle>, // vehicle id -> vehicle
    pub debug_overlay: DebugOverlay,
    tick: u64,
    exits: Vec<ExitPlacement>,
    seat_tx: UnboundedSender<SeatRequest>,
    seat_rx: UnboundedReceiver<SeatRequest>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Flat static slab, top surface at y = 0.
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -0.1, 0.0])
            .build();
        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 0.1, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_VEHICLE))
            .friction(1.0)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        log::info!(
            "ground inserted: bodies={} colliders={}",
            bodies.len(),
            colliders.len()
        );

        let (seat_tx, seat_rx) = mpsc::unbounded_channel();

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            vehicles: HashMap::new(),
            debug_overlay: DebugOverlay::default(),
            tick: 0,
            exits: Vec::new(),
            seat_tx,
            seat_rx,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Sender for enter/exit requests; drained at the next tick boundary.
    pub fn seat_requests(&self) -> UnboundedSender<SeatRequest> {
        self.seat_tx.clone()
    }

    pub fn debug_snapshot(&self) -> DebugOverlay {
        self.debug_overlay.clone()
    }

    /// Box chassis with an explicit mass and lowered centre of mass.
    pub fn spawn_vehicle(
        &mut self,
        id: String,
        config: VehicleConfig,
        position: [f32; 3],
    ) -> Result<RigidBodyHandle, ConfigError> {
        let controller = DrivingController::new(config)?;
        let config = controller.config();

        let [hx, hy, hz] = config.chassis_half_extents;
        let [cx, cy, cz] = config.center_of_mass;
        let m = config.mass;
        let inertia = vector![
            m / 3.0 * (hy * hy + hz * hz),
            m / 3.0 * (hx * hx + hz * hz),
            m / 3.0 * (hx * hx + hy * hy)
        ];

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();

        // Wheels are probes, not colliders: the box slides, grip steers it.
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_VEHICLE, GROUP_GROUND))
            .active_events(ActiveEvents::empty())
            .mass_properties(MassProperties::new(Point3::new(cx, cy, cz), m, inertia))
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.query_pipeline.update(&self.colliders);

        if let Some(old) = self.vehicles.insert(
            id.clone(),
            Vehicle {
                body: handle,
                spawn_position: position,
                controller,
                input: VehicleInput::new(),
                seat: VehicleSeat::new(SEAT_EXIT_OFFSET),
            },
        ) {
            log::warn!("vehicle {id} respawned, dropping previous body");
            self.remove_body(old.body);
        }

        log::info!("spawned vehicle {id} at {position:?} (body = {handle:?})");
        Ok(handle)
    }

    pub fn despawn_vehicle(&mut self, id: &str) -> bool {
        match self.vehicles.remove(id) {
            Some(v) => {
                self.remove_body(v.body);
                log::info!("despawned vehicle {id}");
                true
            }
            None => false,
        }
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
        self.query_pipeline.update(&self.colliders);
    }

    /// Store the driver's axes; read by the controller on the next tick.
    pub fn set_input(&mut self, id: &str, throttle: f32, steer: f32) {
        if let Some(v) = self.vehicles.get_mut(id) {
            v.input.set_axes(throttle, steer);
        }
    }

    pub fn press_exit(&mut self, id: &str) {
        if let Some(v) = self.vehicles.get_mut(id) {
            v.input.request_exit();
        }
    }

    /// Placements for drivers who left a vehicle since the last call.
    pub fn take_exits(&mut self) -> Vec<ExitPlacement> {
        std::mem::take(&mut self.exits)
    }

    pub fn handle_seat_request(&mut self, request: SeatRequest) -> Result<(), OccupancyError> {
        match request {
            SeatRequest::Enter { vehicle, occupant } => {
                let v = self
                    .vehicles
                    .get_mut(&vehicle)
                    .ok_or_else(|| OccupancyError::UnknownVehicle(vehicle.clone()))?;
                v.seat
                    .enter(occupant.clone(), &mut v.input, &mut v.controller)?;
                log::info!("{occupant} entered vehicle {vehicle}");
                Ok(())
            }
            SeatRequest::Exit { vehicle } => {
                let placement = self.exit_vehicle(&vehicle)?;
                log::info!(
                    "{} left vehicle {vehicle} at {:?}",
                    placement.occupant,
                    placement.position
                );
                self.exits.push(placement);
                Ok(())
            }
        }
    }

    fn exit_vehicle(&mut self, id: &str) -> Result<ExitPlacement, OccupancyError> {
        let v = self
            .vehicles
            .get_mut(id)
            .ok_or_else(|| OccupancyError::UnknownVehicle(id.to_string()))?;
        let body = self
            .bodies
            .get(v.body)
            .ok_or_else(|| OccupancyError::UnknownVehicle(id.to_string()))?;
        let pos = Point3::from(*body.translation());
        let rot = *body.rotation();
        v.seat.exit(id, &mut v.input, &mut v.controller, pos, rot)
    }

    fn drain_seat_requests(&mut self) {
        // exit key presses latched on the handlers
        let pressed: Vec<String> = self
            .vehicles
            .iter_mut()
            .filter_map(|(id, v)| v.input.take_exit_request().then(|| id.clone()))
            .collect();

        let mut requests: Vec<SeatRequest> = pressed
            .into_iter()
            .map(|vehicle| SeatRequest::Exit { vehicle })
            .collect();
        while let Ok(request) = self.seat_rx.try_recv() {
            requests.push(request);
        }

        for request in requests {
            if let Err(err) = self.handle_seat_request(request.clone()) {
                log::warn!("seat request {request:?} rejected: {err}");
            }
        }
    }

    pub fn chassis_pose(&self, id: &str) -> Option<(Point3<f32>, UnitQuaternion<f32>)> {
        let v = self.vehicles.get(id)?;
        let body = self.bodies.get(v.body)?;
        Some((Point3::from(*body.translation()), *body.rotation()))
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut vehicles: Vec<VehicleSnapshot> = self
            .vehicles
            .iter()
            .filter_map(|(id, v)| {
                let body = self.bodies.get(v.body)?;
                let pos = Point3::from(*body.translation());
                let rot = *body.rotation();
                let (body_pos, body_rot) = v.controller.visual_body_pose(pos, rot);
                let state = v.controller.state();

                Some(VehicleSnapshot {
                    id: id.clone(),
                    occupied: v.seat.is_occupied(),
                    speed: body.linvel().norm(),
                    grounded_wheels: state.grounded_wheels,
                    has_traction: state.has_traction,
                    chassis: Pose::new(pos, rot),
                    body: Pose::new(body_pos, body_rot),
                    wheels: v.controller.wheel_poses().to_vec(),
                })
            })
            .collect();
        vehicles.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            tick: self.tick,
            vehicles,
        }
    }

    pub fn step(&mut self, dt: Real) {
        self.debug_overlay.clear();

        // 0) seat changes land at the tick boundary
        self.drain_seat_requests();

        // 1) per-vehicle driving tick against its rapier chassis
        {
            let Self {
                vehicles,
                bodies,
                colliders,
                query_pipeline,
                debug_overlay,
                ..
            } = self;

            for (id, v) in vehicles.iter_mut() {
                if let Some(body) = bodies.get_mut(v.body) {
                    body.reset_forces(true);
                }
                let Some(mut chassis) = RapierChassis::new(v.body, bodies, colliders, query_pipeline)
                else {
                    log::warn!("vehicle {id} has no chassis body");
                    continue;
                };

                let report = v.controller.fixed_update(&mut chassis, &v.input, dt);

                push_ground_rays(debug_overlay, &report.ground);
                push_chassis(
                    debug_overlay,
                    id,
                    chassis.position(),
                    chassis.rotation(),
                    v.controller.config().chassis_half_extents,
                );

                log::debug!(
                    "[{id}] grounded={} traction={} motor={:?} yaw={:?}",
                    report.ground.grounded,
                    report.has_traction,
                    report.motor_force,
                    report.yaw_delta_deg
                );
            }
        }

        // 2) solver
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 3) safety: chassis that left the world go back to their spawn lane
        for (id, v) in self.vehicles.iter_mut() {
            let Some(body) = self.bodies.get_mut(v.body) else {
                continue;
            };
            let pos = *body.translation();
            let bad = pos.iter().any(|c| !c.is_finite() || c.abs() > WORLD_LIMIT);

            if bad {
                let [x, y, z] = v.spawn_position;
                let reset = vector![x, y, z];
                body.set_translation(reset, true);
                body.set_rotation(UnitQuaternion::identity(), true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
                v.controller.reset_motion();
                log::warn!("reset runaway vehicle {id} from {pos:?} to {reset:?}");
            }
        }

        self.tick += 1;
    }
}
