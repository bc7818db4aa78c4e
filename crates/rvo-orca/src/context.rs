//! Read-only simulation state passed to every per-agent computation.

use rvo_agent::AgentState;
use rvo_spatial::{AgentTree, ObstacleArena, ObstacleTree};

/// A read-only snapshot of the world for one step's velocity phase.
///
/// Built once per step by the simulator after the agent tree is rebuilt, and
/// shared immutably across every worker.
///
/// # Lifetimes
///
/// All borrows live for the duration of one velocity phase.  The simulator
/// never allows mutable access to these structures while `StepContext` is
/// live.
#[derive(Copy, Clone)]
pub struct StepContext<'a> {
    /// Every agent's state as of the start of the step, by dense index.
    pub states: &'a [AgentState],

    /// Agent tree built over `states[i].position`.
    pub agent_tree: &'a AgentTree,

    /// `None` until obstacles have been processed at least once.
    pub obstacle_tree: Option<&'a ObstacleTree>,

    /// Vertex records the obstacle tree refers to.
    pub obstacles: &'a ObstacleArena,

    /// Seconds per step.
    pub time_step: f32,
}

impl<'a> StepContext<'a> {
    #[inline]
    pub fn new(
        states:        &'a [AgentState],
        agent_tree:    &'a AgentTree,
        obstacle_tree: Option<&'a ObstacleTree>,
        obstacles:     &'a ObstacleArena,
        time_step:     f32,
    ) -> Self {
        Self { states, agent_tree, obstacle_tree, obstacles, time_step }
    }
}
