//! Neighbor discovery for one agent.

use rvo_agent::AgentWork;
use rvo_core::sqr;

use crate::StepContext;

/// Refill `work`'s neighbor lists for the agent at dense index `index`.
///
/// Obstacle edges are gathered within the distance the agent could cover
/// over its obstacle horizon plus its radius.  Other agents are gathered
/// within `neighbor_dist`, keeping only the `max_neighbors` closest; a cap of
/// zero skips the agent search entirely.
pub fn compute_neighbors(index: usize, ctx: &StepContext<'_>, work: &mut AgentWork) {
    let agent = &ctx.states[index];
    let params = &agent.params;

    work.obstacle_neighbors.clear();
    if let Some(tree) = ctx.obstacle_tree {
        let range_sq = sqr(params.time_horizon_obst * params.max_speed + params.radius);
        tree.query_neighbors(ctx.obstacles, agent.position, range_sq, &mut work.obstacle_neighbors);
    }

    work.agent_neighbors.clear();
    work.agent_neighbors.set_capacity(params.max_neighbors);
    if params.max_neighbors > 0 {
        let mut range_sq = sqr(params.neighbor_dist);
        ctx.agent_tree
            .query_neighbors(agent.position, index, &mut range_sq, &mut work.agent_neighbors);
    }
}
