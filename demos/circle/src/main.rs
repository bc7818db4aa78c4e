//! circle — the classic ORCA benchmark.
//!
//! 250 agents start evenly spaced on a circle of radius 200 and each walks to
//! the antipodal point.  Positions are written to
//! `output/circle/positions.csv` every `OUTPUT_INTERVAL_STEPS` steps.
//!
//! Run with `RUST_LOG=debug` to see pool and tree diagnostics.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{Result, bail};
use csv::Writer;
use log::info;

use rvo_core::{AgentDefaults, AgentId, SimRng, Vector2, preferred_velocity_towards};
use rvo_sim::{Simulator, SimulatorBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:           usize = 250;
const CIRCLE_RADIUS:         f32   = 200.0;
const TIME_STEP:             f32   = 0.25;
const SEED:                  u64   = 42;
const MAX_STEPS:             usize = 20_000;
const OUTPUT_INTERVAL_STEPS: usize = 10;
const PERTURBATION:          f32   = 0.0001;

// ── Scenario ──────────────────────────────────────────────────────────────────

struct Goal {
    agent: AgentId,
    point: Vector2,
}

fn setup_scenario(sim: &mut Simulator) -> Result<Vec<Goal>> {
    let mut goals = Vec::with_capacity(AGENT_COUNT);
    for i in 0..AGENT_COUNT {
        let angle = i as f32 * std::f32::consts::TAU / AGENT_COUNT as f32;
        let position = CIRCLE_RADIUS * Vector2::new(angle.cos(), angle.sin());
        let agent = sim.add_agent(position)?;
        goals.push(Goal { agent, point: -position });
    }
    Ok(goals)
}

fn set_preferred_velocities(sim: &mut Simulator, goals: &[Goal], rng: &mut SimRng) {
    for goal in goals {
        let pref = preferred_velocity_towards(sim.agent_position(goal.agent), goal.point);
        // Nudge symmetric configurations out of deadlock.
        sim.set_agent_pref_velocity(goal.agent, pref + rng.perturbation(PERTURBATION));
    }
}

fn reached_goal(sim: &Simulator, goals: &[Goal]) -> bool {
    goals.iter().all(|goal| {
        let radius = sim.agent_radius(goal.agent);
        (sim.agent_position(goal.agent) - goal.point).abs_sq() <= radius * radius
    })
}

/// Append one row per agent; returns the number of rows written.
fn write_positions(out: &mut Writer<File>, sim: &Simulator, goals: &[Goal]) -> Result<usize> {
    let time = sim.global_time().to_string();
    for goal in goals {
        let p = sim.agent_position(goal.agent);
        out.write_record(&[
            time.clone(),
            goal.agent.0.to_string(),
            p.x.to_string(),
            p.y.to_string(),
        ])?;
    }
    Ok(goals.len())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== circle — rvo collision avoidance ===");
    println!("Agents: {AGENT_COUNT}  |  Radius: {CIRCLE_RADIUS}  |  Time step: {TIME_STEP}");
    println!();

    // 1. Simulator with the benchmark agent profile.
    let mut sim = SimulatorBuilder::new()
        .time_step(TIME_STEP)
        .agent_defaults(AgentDefaults::circle())
        .build()?;
    let goals = setup_scenario(&mut sim)?;
    println!("Workers: {}", sim.num_workers());

    // 2. Output.
    std::fs::create_dir_all("output/circle")?;
    let mut out = Writer::from_path(Path::new("output/circle/positions.csv"))?;
    out.write_record(["time", "agent_id", "x", "y"])?;
    let mut rows = write_positions(&mut out, &sim, &goals)?;

    // 3. Run until every agent is at its goal.
    let mut rng = SimRng::new(SEED);
    let t0 = Instant::now();
    let mut steps = 0;
    while !reached_goal(&sim, &goals) {
        if steps == MAX_STEPS {
            bail!("agents still travelling after {MAX_STEPS} steps");
        }
        set_preferred_velocities(&mut sim, &goals, &mut rng);
        sim.step();
        steps += 1;

        if steps % OUTPUT_INTERVAL_STEPS == 0 {
            rows += write_positions(&mut out, &sim, &goals)?;
            info!("t = {:.2}", sim.global_time());
        }
    }
    rows += write_positions(&mut out, &sim, &goals)?;
    out.flush()?;
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!(
        "All agents arrived after {steps} steps ({:.2} simulated s) in {:.3} s",
        sim.global_time(),
        elapsed.as_secs_f64()
    );
    println!("  positions.csv : {rows} rows");

    Ok(())
}
