use anyhow::Context;
use arcade_drive::occupancy::SeatRequest;
use arcade_drive::physics::PhysicsWorld;
use arcade_drive::spawn::SpawnManager;
use tokio::time::{interval, Duration};

const DT: f32 = 1.0 / 60.0;
const SNAPSHOT_EVERY: u64 = 60;
const RUN_TICKS: u64 = 60 * 20;

// Scripted driver: (start tick, throttle, steer)
const SCRIPT: &[(u64, f32, f32)] = &[
    (60, 1.0, 0.0),   // settle, then floor it
    (300, 1.0, 0.6),  // sweep right
    (540, 1.0, -0.6), // and back left
    (780, -1.0, 0.0), // brake into reverse
    (960, -1.0, 0.5), // reverse while steering
    (1080, 0.0, 0.0), // coast
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting headless driving sim");

    let mut physics = PhysicsWorld::new();
    let mut spawner = SpawnManager::default();

    let spawn = spawner
        .allocate_spawn(&mut rand::thread_rng())
        .context("no vehicle presets configured")?;
    let vehicle_id = spawn.vehicle_id.clone();
    physics
        .spawn_vehicle(spawn.vehicle_id, spawn.config, spawn.position)
        .with_context(|| format!("spawning {} preset", spawn.preset))?;

    let seats = physics.seat_requests();
    seats
        .send(SeatRequest::Enter {
            vehicle: vehicle_id.clone(),
            occupant: "driver".into(),
        })
        .context("seat channel closed")?;

    // Fixed timestep: ~60 Hz
    let mut ticker = interval(Duration::from_secs_f32(DT));

    while physics.tick() < RUN_TICKS {
        ticker.tick().await;

        let tick = physics.tick();
        if let Some(&(_, throttle, steer)) = SCRIPT.iter().rev().find(|(start, ..)| *start <= tick) {
            physics.set_input(&vehicle_id, throttle, steer);
        }

        physics.step(DT);

        if physics.tick() % SNAPSHOT_EVERY == 0 {
            let snapshot = serde_json::to_string(&physics.snapshot())?;
            log::info!("{snapshot}");
        }
    }

    seats
        .send(SeatRequest::Exit { vehicle: vehicle_id })
        .context("seat channel closed")?;
    physics.step(DT);
    for exit in physics.take_exits() {
        log::info!("{} stepped out at {:?}", exit.occupant, exit.position);
    }

    Ok(())
}
