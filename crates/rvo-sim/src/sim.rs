//! The `Simulator` struct, its step pipeline, and the public agent /
//! obstacle API.

use log::{debug, trace};
use rvo_agent::{AgentStore, AgentWork};
use rvo_core::{AgentDefaults, AgentId, AgentParams, Line, ObstacleId, SimConfig, Vector2};
use rvo_orca::{StepContext, commit, compute_neighbors, compute_new_velocity};
use rvo_spatial::{AgentTree, ObstacleArena, ObstacleTree};

use crate::{SimError, SimResult, WorkerPool};

// ── Simulator ─────────────────────────────────────────────────────────────────

/// The collision-avoidance simulation.
///
/// `Simulator` owns every agent and obstacle and drives the step pipeline:
///
/// 1. **Compaction**: agents deleted since the last step are dropped and the
///    id map rebuilt (only if something was deleted).
/// 2. **Pool**: the worker pool is created on first use and re-partitioned
///    whenever the agent count has changed.
/// 3. **Agent tree**: rebuilt from current positions (sequential).
/// 4. **Velocity phase** (parallel): neighbor search and new velocity for
///    every agent.
/// 5. **Commit phase** (parallel): velocities adopted, positions integrated.
/// 6. **Clock**: global time advances by one time step.
///
/// Agents are addressed by the [`AgentId`] returned from
/// [`add_agent`][Self::add_agent].  Passing an id that was never issued or has
/// been removed by a step is a contract violation and panics; use
/// [`contains_agent`][Self::contains_agent] to check first.
///
/// Create via [`Simulator::new`] or [`SimulatorBuilder`][crate::SimulatorBuilder].
pub struct Simulator {
    config:        SimConfig,
    defaults:      Option<AgentDefaults>,
    agents:        AgentStore,
    obstacles:     ObstacleArena,
    /// `None` until `process_obstacles` has run.
    obstacle_tree: Option<ObstacleTree>,
    agent_tree:    AgentTree,
    /// Scratch for the agent tree build, reused across steps.
    positions:     Vec<Vector2>,
    /// Created lazily by the first step.
    pool:          Option<WorkerPool>,
    global_time:   f32,
}

impl Simulator {
    /// An empty simulation with no default agent profile.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config, None))
    }

    pub(crate) fn with_valid_config(config: SimConfig, defaults: Option<AgentDefaults>) -> Self {
        Self {
            config,
            defaults,
            agents:        AgentStore::new(),
            obstacles:     ObstacleArena::new(),
            obstacle_tree: None,
            agent_tree:    AgentTree::new(),
            positions:     Vec::new(),
            pool:          None,
            global_time:   0.0,
        }
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Advance the simulation by one time step and return the new global
    /// time.
    pub fn step(&mut self) -> f32 {
        // ── Phase 1: drop agents deleted since the last step ─────────────
        if self.agents.has_pending_deletes() {
            self.agents.compact();
        }

        // ── Phase 2: worker pool and partition ───────────────────────────
        let agent_count = self.agents.len();
        let workers = self.config.resolved_workers();
        let pool = self
            .pool
            .get_or_insert_with(|| WorkerPool::new(workers, agent_count));
        if pool.agent_count() != agent_count {
            pool.partition(agent_count);
        }

        // ── Phase 3: agent tree ──────────────────────────────────────────
        self.positions.clear();
        self.positions.extend(self.agents.states.iter().map(|s| s.position));
        self.agent_tree.build(&self.positions);

        let time_step = self.config.time_step;

        // ── Phase 4: neighbors and new velocities ────────────────────────
        //
        // Every agent reads the start-of-step state of its neighbors and
        // writes only its own `AgentWork`.
        {
            let (states, work) = self.agents.split_mut();
            let ctx = StepContext::new(
                states,
                &self.agent_tree,
                self.obstacle_tree.as_ref(),
                &self.obstacles,
                time_step,
            );
            pool.for_each(work, |i, w| {
                compute_neighbors(i, &ctx, w);
                compute_new_velocity(i, &ctx, w);
            });
        }

        // ── Phase 5: commit ──────────────────────────────────────────────
        {
            let (states, work) = self.agents.both_mut();
            let work: &[AgentWork] = work;
            pool.for_each(states, |i, s| commit(s, &work[i], time_step));
        }

        // ── Phase 6: clock ───────────────────────────────────────────────
        self.global_time += time_step;
        trace!("step done: t = {}, {} agents", self.global_time, agent_count);
        self.global_time
    }

    // ── Agents: creation and removal ──────────────────────────────────────

    /// Add an agent at `position` using the default profile.
    ///
    /// # Errors
    /// [`SimError::NoAgentDefaults`] if no default profile is configured.
    pub fn add_agent(&mut self, position: Vector2) -> SimResult<AgentId> {
        let defaults = self.defaults.ok_or(SimError::NoAgentDefaults)?;
        Ok(self.agents.add(position, defaults.velocity, defaults.params))
    }

    /// Add an agent with explicit parameters and initial velocity.
    ///
    /// # Errors
    /// [`SimError::Core`] if `params` fails validation.
    pub fn add_agent_with(
        &mut self,
        position: Vector2,
        params:   AgentParams,
        velocity: Vector2,
    ) -> SimResult<AgentId> {
        params.validate()?;
        Ok(self.agents.add(position, velocity, params))
    }

    /// Mark an agent for removal.  It stays visible to every query until the
    /// next [`step`][Self::step] drops it.
    pub fn delete_agent(&mut self, id: AgentId) {
        self.agents.mark_deleted(id);
    }

    /// Install the profile used by [`add_agent`][Self::add_agent].
    pub fn set_agent_defaults(&mut self, defaults: AgentDefaults) -> SimResult<()> {
        defaults.params.validate()?;
        self.defaults = Some(defaults);
        Ok(())
    }

    pub fn agent_defaults(&self) -> Option<&AgentDefaults> {
        self.defaults.as_ref()
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    /// Add a closed polygon and return the id of its first vertex.
    ///
    /// Vertices run counter-clockwise around a solid obstacle and clockwise
    /// around a bounding enclosure.  The polygon takes effect only after the
    /// next [`process_obstacles`][Self::process_obstacles].
    ///
    /// # Errors
    /// [`SimError::Spatial`] if fewer than two vertices are given.
    pub fn add_obstacle(&mut self, vertices: &[Vector2]) -> SimResult<ObstacleId> {
        Ok(self.obstacles.add_polygon(vertices)?)
    }

    /// Build the obstacle tree over every obstacle added so far.
    pub fn process_obstacles(&mut self) {
        self.obstacle_tree = Some(ObstacleTree::build(&mut self.obstacles));
        debug!("processed obstacles: {} vertices", self.obstacles.len());
    }

    /// The vertex records, including any created by edge splitting.
    pub fn obstacles(&self) -> &ObstacleArena {
        &self.obstacles
    }

    pub fn num_obstacle_vertices(&self) -> usize {
        self.obstacles.len()
    }

    pub fn obstacle_vertex(&self, id: ObstacleId) -> Vector2 {
        self.obstacles.get(id).point
    }

    pub fn next_obstacle_vertex(&self, id: ObstacleId) -> ObstacleId {
        self.obstacles.get(id).next
    }

    pub fn prev_obstacle_vertex(&self, id: ObstacleId) -> ObstacleId {
        self.obstacles.get(id).previous
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` if the segment `p1 – p2` stays at least `radius` away from
    /// every processed obstacle.  Always `true` before the first
    /// [`process_obstacles`][Self::process_obstacles].
    pub fn query_visibility(&self, p1: Vector2, p2: Vector2, radius: f32) -> bool {
        match &self.obstacle_tree {
            None => true,
            Some(tree) => tree.query_visibility(&self.obstacles, p1, p2, radius),
        }
    }

    /// The agent closest to `point`, if one lies strictly within `radius`.
    ///
    /// Searches current positions, including agents marked for deletion
    /// that have not yet been dropped by a step.
    pub fn query_near_agent(&mut self, point: Vector2, radius: f32) -> Option<AgentId> {
        if self.agents.is_empty() {
            return None;
        }
        self.positions.clear();
        self.positions.extend(self.agents.states.iter().map(|s| s.position));
        self.agent_tree.build(&self.positions);

        self.agent_tree
            .query_nearest(point, radius)
            .map(|i| self.agents.id_at(i))
    }

    // ── Agents: lookup ────────────────────────────────────────────────────

    /// Number of agents, including ones marked for deletion but not yet
    /// dropped.
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Live ids in internal order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.ids().iter().copied()
    }

    pub fn contains_agent(&self, id: AgentId) -> bool {
        self.agents.contains(id)
    }

    /// Current dense index of `id`.  Indices shift when deleted agents are
    /// dropped.
    pub fn try_agent_index(&self, id: AgentId) -> Option<usize> {
        self.agents.try_index(id)
    }

    /// Read access to the agent arrays.
    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    // ── Agents: per-agent state ───────────────────────────────────────────

    pub fn agent_position(&self, id: AgentId) -> Vector2 {
        self.agents.state(id).position
    }

    pub fn set_agent_position(&mut self, id: AgentId, position: Vector2) {
        self.agents.state_mut(id).position = position;
    }

    pub fn agent_velocity(&self, id: AgentId) -> Vector2 {
        self.agents.state(id).velocity
    }

    pub fn set_agent_velocity(&mut self, id: AgentId, velocity: Vector2) {
        self.agents.state_mut(id).velocity = velocity;
    }

    pub fn agent_pref_velocity(&self, id: AgentId) -> Vector2 {
        self.agents.state(id).pref_velocity
    }

    pub fn set_agent_pref_velocity(&mut self, id: AgentId, pref_velocity: Vector2) {
        self.agents.state_mut(id).pref_velocity = pref_velocity;
    }

    pub fn agent_params(&self, id: AgentId) -> &AgentParams {
        &self.agents.state(id).params
    }

    /// Replace all of an agent's parameters at once.
    pub fn set_agent_params(&mut self, id: AgentId, params: AgentParams) -> SimResult<()> {
        params.validate()?;
        self.agents.state_mut(id).params = params;
        Ok(())
    }

    pub fn agent_radius(&self, id: AgentId) -> f32 {
        self.agent_params(id).radius
    }

    pub fn set_agent_radius(&mut self, id: AgentId, radius: f32) {
        debug_assert!(radius >= 0.0);
        self.agents.state_mut(id).params.radius = radius;
    }

    pub fn agent_max_speed(&self, id: AgentId) -> f32 {
        self.agent_params(id).max_speed
    }

    pub fn set_agent_max_speed(&mut self, id: AgentId, max_speed: f32) {
        debug_assert!(max_speed >= 0.0);
        self.agents.state_mut(id).params.max_speed = max_speed;
    }

    pub fn agent_neighbor_dist(&self, id: AgentId) -> f32 {
        self.agent_params(id).neighbor_dist
    }

    pub fn set_agent_neighbor_dist(&mut self, id: AgentId, neighbor_dist: f32) {
        debug_assert!(neighbor_dist >= 0.0);
        self.agents.state_mut(id).params.neighbor_dist = neighbor_dist;
    }

    pub fn agent_max_neighbors(&self, id: AgentId) -> usize {
        self.agent_params(id).max_neighbors
    }

    /// Takes effect at the next neighbor search.
    pub fn set_agent_max_neighbors(&mut self, id: AgentId, max_neighbors: usize) {
        self.agents.state_mut(id).params.max_neighbors = max_neighbors;
    }

    pub fn agent_time_horizon(&self, id: AgentId) -> f32 {
        self.agent_params(id).time_horizon
    }

    pub fn set_agent_time_horizon(&mut self, id: AgentId, time_horizon: f32) {
        debug_assert!(time_horizon > 0.0);
        self.agents.state_mut(id).params.time_horizon = time_horizon;
    }

    pub fn agent_time_horizon_obst(&self, id: AgentId) -> f32 {
        self.agent_params(id).time_horizon_obst
    }

    pub fn set_agent_time_horizon_obst(&mut self, id: AgentId, time_horizon_obst: f32) {
        debug_assert!(time_horizon_obst > 0.0);
        self.agents.state_mut(id).params.time_horizon_obst = time_horizon_obst;
    }

    // ── Agents: last step's results ───────────────────────────────────────

    /// Constraint lines from the last step: obstacle lines first, then one
    /// line per agent neighbor.
    pub fn agent_orca_lines(&self, id: AgentId) -> &[Line] {
        &self.agents.work(id).orca_lines
    }

    pub fn agent_num_agent_neighbors(&self, id: AgentId) -> usize {
        self.agents.work(id).agent_neighbors.len()
    }

    /// The `i`-th closest agent neighbor found by the last step.
    pub fn agent_agent_neighbor(&self, id: AgentId, i: usize) -> AgentId {
        let (_, index) = self.agents.work(id).agent_neighbors.entries()[i];
        self.agents.id_at(index)
    }

    pub fn agent_num_obstacle_neighbors(&self, id: AgentId) -> usize {
        self.agents.work(id).obstacle_neighbors.len()
    }

    /// The `i`-th closest obstacle edge found by the last step, named by the
    /// vertex it starts at.
    pub fn agent_obstacle_neighbor(&self, id: AgentId, i: usize) -> ObstacleId {
        self.agents.work(id).obstacle_neighbors.entries()[i].1
    }

    // ── Clock and configuration ───────────────────────────────────────────

    pub fn global_time(&self) -> f32 {
        self.global_time
    }

    pub fn set_global_time(&mut self, global_time: f32) {
        self.global_time = global_time;
    }

    pub fn time_step(&self) -> f32 {
        self.config.time_step
    }

    /// # Errors
    /// [`SimError::Core`] if `time_step` is not strictly positive.
    pub fn set_time_step(&mut self, time_step: f32) -> SimResult<()> {
        let config = SimConfig { time_step, ..self.config.clone() };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Worker count the next step will use.
    pub fn num_workers(&self) -> usize {
        self.config.resolved_workers()
    }

    /// Set the worker count; `0` selects the host's available parallelism.
    /// The pool is rebuilt at the next step.
    pub fn set_num_workers(&mut self, workers: usize) {
        self.config.num_workers = (workers > 0).then_some(workers);
        self.pool = None;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Reset to an empty simulation: no agents, no obstacles, no default
    /// profile, time zero, default time step and worker count.
    ///
    /// Agent ids keep counting up from where they were.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.obstacles.clear();
        self.obstacle_tree = None;
        self.agent_tree = AgentTree::new();
        self.defaults = None;
        self.global_time = 0.0;
        self.config.time_step = SimConfig::DEFAULT_TIME_STEP;
        self.set_num_workers(0);
        debug!("simulator cleared");
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::with_valid_config(SimConfig::default(), None)
    }
}
