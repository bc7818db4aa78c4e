//! blocks — four crowds crossing a field of box obstacles.
//!
//! Each corner of the field holds a 5 × 5 group of agents that walks to the
//! opposite corner through four axis-aligned blocks.  Boxes are given as
//! min/max corners and turned into counter-clockwise rectangles.
//!
//! Midway through the run the demo removes the agent nearest a "pick" point
//! and spawns a replacement there, the way an interactive front end would.
//! Agent snapshots go to `output/blocks/agent_snapshots.csv`.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use csv::Writer;
use log::{info, warn};

use rvo_core::{
    AgentDefaults, AgentId, AgentParams, SimRng, Vector2, preferred_velocity_towards, sqr,
};
use rvo_sim::{Simulator, SimulatorBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const TIME_STEP:             f32   = 0.25;
const SEED:                  u64   = 7;
const MAX_STEPS:             usize = 20_000;
const OUTPUT_INTERVAL_STEPS: usize = 20;
const PICK_STEP:             usize = 100;
const PICK_POINT:            Vector2 = Vector2::new(0.0, 0.0);
const PICK_RADIUS:           f32   = 10.0;

// ── Obstacles ─────────────────────────────────────────────────────────────────

/// Axis-aligned block, as a collider would report it.
struct Block {
    min: Vector2,
    max: Vector2,
}

impl Block {
    const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min: Vector2::new(min_x, min_y), max: Vector2::new(max_x, max_y) }
    }

    /// The four corners, counter-clockwise from the top right.
    fn polygon(&self) -> [Vector2; 4] {
        [
            Vector2::new(self.max.x, self.max.y),
            Vector2::new(self.min.x, self.max.y),
            Vector2::new(self.min.x, self.min.y),
            Vector2::new(self.max.x, self.min.y),
        ]
    }
}

const BLOCKS: [Block; 4] = [
    Block::new(-40.0, 10.0, -10.0, 40.0),
    Block::new(10.0, 10.0, 40.0, 40.0),
    Block::new(10.0, -40.0, 40.0, -10.0),
    Block::new(-40.0, -40.0, -10.0, -10.0),
];

// ── Scenario ──────────────────────────────────────────────────────────────────

fn agent_profile() -> AgentDefaults {
    AgentDefaults::new(
        AgentParams {
            neighbor_dist:     15.0,
            max_neighbors:     10,
            time_horizon:      5.0,
            time_horizon_obst: 5.0,
            radius:            2.0,
            max_speed:         2.0,
        },
        Vector2::ZERO,
    )
}

/// Four 5 × 5 groups, one per corner; every agent's goal is the mirrored
/// position in the opposite corner.
fn setup_scenario(sim: &mut Simulator) -> Result<Vec<(AgentId, Vector2)>> {
    let mut goals = Vec::with_capacity(100);
    for i in 0..5 {
        for j in 0..5 {
            let offset = Vector2::new(55.0 + i as f32 * 10.0, 55.0 + j as f32 * 10.0);
            for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
                let position = Vector2::new(sx * offset.x, sy * offset.y);
                let id = sim.add_agent(position)?;
                goals.push((id, -position));
            }
        }
    }

    for block in &BLOCKS {
        sim.add_obstacle(&block.polygon())?;
    }
    sim.process_obstacles();
    Ok(goals)
}

fn set_preferred_velocities(sim: &mut Simulator, goals: &[(AgentId, Vector2)], rng: &mut SimRng) {
    for &(id, goal) in goals {
        let pref = preferred_velocity_towards(sim.agent_position(id), goal);
        sim.set_agent_pref_velocity(id, pref + rng.perturbation(0.0001));
    }
}

/// Every agent lies within its own radius of its goal.
fn reached_goal(sim: &Simulator, goals: &[(AgentId, Vector2)]) -> bool {
    goals.iter().all(|&(id, goal)| {
        (sim.agent_position(id) - goal).abs_sq() <= sqr(sim.agent_radius(id))
    })
}

/// Remove the agent nearest `PICK_POINT` and spawn a fresh one in its place,
/// inheriting its goal.
fn replace_picked_agent(sim: &mut Simulator, goals: &mut [(AgentId, Vector2)]) -> Result<()> {
    let Some(picked) = sim.query_near_agent(PICK_POINT, PICK_RADIUS) else {
        warn!("no agent within {PICK_RADIUS} of {PICK_POINT}");
        return Ok(());
    };
    let position = sim.agent_position(picked);
    sim.delete_agent(picked);
    let spawned = sim.add_agent(position)?;

    let slot = goals
        .iter_mut()
        .find(|(id, _)| *id == picked)
        .context("picked agent has no goal")?;
    slot.0 = spawned;
    info!("replaced {picked} with {spawned} at {position}");
    Ok(())
}

fn write_snapshot(
    out:   &mut Writer<std::fs::File>,
    sim:   &Simulator,
    goals: &[(AgentId, Vector2)],
) -> Result<()> {
    for &(id, _) in goals {
        let p = sim.agent_position(id);
        let v = sim.agent_velocity(id);
        out.write_record(&[
            sim.global_time().to_string(),
            id.0.to_string(),
            p.x.to_string(),
            p.y.to_string(),
            v.x.to_string(),
            v.y.to_string(),
            sim.agent_num_agent_neighbors(id).to_string(),
        ])?;
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== blocks — rvo collision avoidance ===");

    // 1. Simulator and scenario.
    let mut sim = SimulatorBuilder::new()
        .time_step(TIME_STEP)
        .agent_defaults(agent_profile())
        .build()?;
    let mut goals = setup_scenario(&mut sim)?;
    println!(
        "Agents: {}  |  Blocks: {}  |  Obstacle vertices: {}  |  Workers: {}",
        sim.num_agents(),
        BLOCKS.len(),
        sim.num_obstacle_vertices(),
        sim.num_workers()
    );
    println!(
        "Diagonal line of sight through the centre: {}",
        sim.query_visibility(Vector2::new(-75.0, -75.0), Vector2::new(75.0, 75.0), 2.0)
    );
    println!();

    // 2. Output.
    std::fs::create_dir_all("output/blocks")?;
    let mut out = Writer::from_path(Path::new("output/blocks/agent_snapshots.csv"))?;
    out.write_record(["time", "agent_id", "x", "y", "vx", "vy", "agent_neighbors"])?;

    // 3. Run.
    let mut rng = SimRng::new(SEED);
    let t0 = Instant::now();
    let mut steps = 0;
    while !reached_goal(&sim, &goals) {
        if steps == MAX_STEPS {
            bail!("agents still travelling after {MAX_STEPS} steps");
        }
        if steps == PICK_STEP {
            replace_picked_agent(&mut sim, &mut goals)?;
        }
        set_preferred_velocities(&mut sim, &goals, &mut rng);
        sim.step();
        steps += 1;

        if steps % OUTPUT_INTERVAL_STEPS == 0 {
            write_snapshot(&mut out, &sim, &goals)?;
        }
    }
    out.flush()?;

    // 4. Summary.
    println!(
        "All groups arrived after {steps} steps ({:.2} simulated s) in {:.3} s",
        sim.global_time(),
        t0.elapsed().as_secs_f64()
    );
    Ok(())
}
