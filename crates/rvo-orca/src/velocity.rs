//! The two per-agent step operations.

use rvo_agent::{AgentState, AgentWork};

use crate::StepContext;
use crate::agent_lines::push_agent_lines;
use crate::linear_program::solve;
use crate::obstacle_lines::push_obstacle_lines;

/// Build the agent's constraint lines from its current neighbor lists and
/// store the chosen velocity in `work.new_velocity`.
///
/// Obstacle lines come first in `work.orca_lines` and are never relaxed.
pub fn compute_new_velocity(index: usize, ctx: &StepContext<'_>, work: &mut AgentWork) {
    let agent = &ctx.states[index];

    work.orca_lines.clear();
    push_obstacle_lines(agent, ctx.obstacles, &work.obstacle_neighbors, &mut work.orca_lines);
    let num_obst_lines = work.orca_lines.len();
    push_agent_lines(agent, ctx.states, &work.agent_neighbors, ctx.time_step, &mut work.orca_lines);

    work.new_velocity = solve(
        &work.orca_lines,
        num_obst_lines,
        agent.params.max_speed,
        agent.pref_velocity,
    );
}

/// Adopt the candidate velocity and advance the position by one step.
#[inline]
pub fn commit(state: &mut AgentState, work: &AgentWork, time_step: f32) {
    state.velocity = work.new_velocity;
    state.position += state.velocity * time_step;
}
