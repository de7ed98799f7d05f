use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::vehicle::VehicleConfig;

// ---------------------------------------------
// SPAWN RESULT RETURNED TO THE WORLD
// ---------------------------------------------
#[derive(Debug, Clone)]
pub struct VehicleSpawnInfo {
    pub vehicle_id: String,
    pub preset: &'static str,
    pub config: VehicleConfig,
    pub position: [f32; 3],
}

// ---------------------------------------------
// SPAWN MANAGER
// ---------------------------------------------
#[derive(Debug)]
pub struct SpawnManager {
    presets: Vec<(&'static str, VehicleConfig)>,
    spawned: usize,
    lane_spacing: f32,
}

impl Default for SpawnManager {
    fn default() -> Self {
        Self::new(vec![
            ("hatchback", VehicleConfig::hatchback()),
            ("pickup", VehicleConfig::pickup()),
        ])
    }
}

impl SpawnManager {
    pub fn new(presets: Vec<(&'static str, VehicleConfig)>) -> Self {
        Self {
            presets,
            spawned: 0,
            lane_spacing: 5.0,
        }
    }

    pub fn create_vehicle_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    // ---------------------------------------------------------
    // Each vehicle gets its own lane so bodies never overlap
    // ---------------------------------------------------------
    fn next_position(&mut self) -> [f32; 3] {
        let lane = self.spawned as f32;
        self.spawned += 1;
        [lane * self.lane_spacing, 1.5, 0.0]
    }

    // ---------------------------------------------------------
    // Random preset + fresh id + lane position
    // ---------------------------------------------------------
    pub fn allocate_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<VehicleSpawnInfo> {
        let (preset, config) = self.presets.choose(rng)?.clone();
        let vehicle_id = self.create_vehicle_id();
        let position = self.next_position();

        Some(VehicleSpawnInfo {
            vehicle_id,
            preset,
            config,
            position,
        })
    }
}
