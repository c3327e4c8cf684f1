//! preempt_scripted — the preemption loop on an in-memory junction.
//!
//! A three-phase junction with seeded background traffic and two emergency
//! vehicles.  Needs no SUMO installation; useful for trying config changes
//! and the CSV output.

use anyhow::{Context, Result};

use sp_core::{SimRng, Tick, VehicleCategory};
use sp_fuzzy::FuzzyInferenceEngine;
use sp_preempt::ControlLoopBuilder;
use sp_sim::{ScriptedSimulator, ScriptedSimulatorBuilder, ScriptedVehicle};

use preempt_demo::{init_tracing, load_config, print_summary, run};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64 = 42;
const BACKGROUND_CARS:  usize = 40;
const ARRIVAL_WINDOW:   u64 = 240;
const DEFAULT_MAX_TICKS: u64 = 1_000;

const LANES: [&str; 4] = ["n_0", "n_1", "e_0", "e_1"];

// ── Scenario ──────────────────────────────────────────────────────────────────

fn scenario(rng: &mut SimRng) -> Result<ScriptedSimulator> {
    let mut builder = ScriptedSimulatorBuilder::new()
        .traffic_light("J1", [("GGrr", 30.0), ("rrGG", 30.0), ("yyyy", 3.0)])
        .controlled_lanes("J1", LANES);

    for lane in LANES {
        builder = builder.lane(lane, rng.gen_range(0..6));
    }

    for i in 0..BACKGROUND_CARS {
        let lane = rng.choose(&LANES).copied().unwrap_or(LANES[0]);
        let car = ScriptedVehicle::new(&format!("car{i}"), VehicleCategory::Passenger, lane)
            .enters_at(Tick(rng.gen_range(0..ARRIVAL_WINDOW)))
            .clears_after(rng.gen_range(1..4));
        builder = builder.vehicle(car);
    }

    // The east approach is red from the start; the second ambulance arrives
    // on whichever lane the dice pick.
    let late_lane = rng.choose(&LANES).copied().unwrap_or(LANES[1]);
    builder = builder
        .vehicle(ScriptedVehicle::new("ambulance0", VehicleCategory::Emergency, "e_0").enters_at(Tick(12)).clears_after(4))
        .vehicle(
            ScriptedVehicle::new("ambulance1", VehicleCategory::Emergency, late_lane)
                .enters_at(Tick(rng.gen_range(120..ARRIVAL_WINDOW)))
                .clears_after(4),
        );

    builder.build().context("building scripted junction")
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let mut config = load_config()?;
    config.simulation.max_ticks.get_or_insert(DEFAULT_MAX_TICKS);

    println!("=== preempt_scripted ===");
    println!("Background cars: {BACKGROUND_CARS}  |  Seed: {SEED}");

    let mut rng = SimRng::new(SEED);
    let sim = scenario(&mut rng)?;
    let engine = FuzzyInferenceEngine::green_time().context("building green-time engine")?;

    let mut control = ControlLoopBuilder::new(sim, &engine, &config)
        .build()
        .context("preparing control loop")?;
    let summary = run(&mut control, &config)?;

    print_summary(&summary);
    Ok(())
}
