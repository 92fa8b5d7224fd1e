//! Incremental plant growth
//!
//! A [`Plant`] grows one branch at a time onto open sockets of the branches
//! it already has. Each tick makes a bounded number of branch adds, each
//! add a bounded number of placement attempts, so a host can spread growth
//! over frames and interrupt it at any tick boundary.
//!
//! Growth of one plant only touches the plant itself and the environment
//! passed to [`Plant::tick`]. Separate plants in separate environments can
//! be advanced on separate threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::catalog::{BranchTemplate, SocketOption, TemplateCatalog, TemplateId};
use crate::core::{Error, Result};
use crate::math::placement::{
    branch_collider, clearance_capsule, oriented_rotation, root_rotation, socket_world_pose,
    surface_capsule, OrientationJitter, OrientationRules,
};
use crate::math::{Capsule, Pose};
use crate::world::{ColliderHit, EntityId, PlantId, WorldQuery};

use super::branch::{Branch, BranchId, BranchPath};
use super::config::PlantConfig;
use super::events::{GrowthEvent, GrowthStats, PlantState, StopReason};
use super::frontier::Frontier;
use super::instantiate::{BranchInstantiator, GrowthEnvironment, SpawnRequest};
use super::registry::BranchTypeRegistry;
use super::rng::{pick_weighted_index, GrowthRng, RngSnapshot};

static NEXT_PLANT_ID: AtomicU64 = AtomicU64::new(1);

/// Height above the plant the settle probe starts from
const SETTLE_PROBE_HEIGHT: f32 = 2.0;

/// Result of one placement attempt.
enum Attempt {
    Grew(BranchId),
    Failed,
    Finished(StopReason),
}

/// One growing plant instance.
pub struct Plant {
    id: PlantId,
    catalog: Arc<TemplateCatalog>,
    config: PlantConfig,
    pose: Pose,
    /// Plant pose when the current growth run started
    growth_origin: Pose,
    state: PlantState,
    stop_reason: Option<StopReason>,
    branches: Vec<Branch>,
    registry: BranchTypeRegistry,
    frontier: Frontier,
    rng: GrowthRng,
    stats: GrowthStats,
    events: Vec<GrowthEvent>,
    // Scratch buffers reused across attempts
    eligible: Vec<SocketOption>,
    hits: Vec<ColliderHit>,
}

impl Plant {
    pub fn new(catalog: Arc<TemplateCatalog>, config: PlantConfig) -> Self {
        let rng = GrowthRng::from_seed_u64(config.seed);
        let mut plant = Self {
            id: PlantId(NEXT_PLANT_ID.fetch_add(1, Ordering::Relaxed)),
            catalog,
            config,
            pose: Pose::IDENTITY,
            growth_origin: Pose::IDENTITY,
            state: PlantState::Done,
            stop_reason: None,
            branches: Vec::new(),
            registry: BranchTypeRegistry::default(),
            frontier: Frontier::new(),
            rng,
            stats: GrowthStats::default(),
            events: Vec::new(),
            eligible: Vec::new(),
            hits: Vec::new(),
        };
        plant.state = plant.idle_state();
        plant
    }

    /// Builder-style: place the plant before growing it.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn id(&self) -> PlantId {
        self.id
    }

    pub fn catalog(&self) -> &Arc<TemplateCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    /// Replace the setup. Takes effect on the next restart; a broken setup
    /// puts an idle plant into `MissingData` right away.
    pub fn set_config(&mut self, config: PlantConfig) {
        self.config = config;
        if self.state != PlantState::Growing {
            self.state = self.idle_state();
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Move the plant. Grown branches stay where they are until the next
    /// restart, which `restart_when_moved` triggers on the next tick.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn state(&self) -> PlantState {
        self.state
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn is_growing(&self) -> bool {
        self.state == PlantState::Growing
    }

    pub fn is_fully_grown(&self) -> bool {
        self.state == PlantState::Done && self.stop_reason.is_some_and(StopReason::is_fully_grown)
    }

    pub fn is_blocked(&self) -> bool {
        self.stop_reason == Some(StopReason::Blocked)
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Branches in insertion order; the root comes first.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.index())
    }

    pub fn root(&self) -> Option<&Branch> {
        self.branches.first()
    }

    pub fn registry(&self) -> &BranchTypeRegistry {
        &self.registry
    }

    pub fn open_branch_count(&self) -> usize {
        self.frontier.len()
    }

    pub fn stats(&self) -> &GrowthStats {
        &self.stats
    }

    pub fn difficulty(&self) -> f32 {
        self.stats.difficulty(self.config.budget.max_failed_attempts)
    }

    pub fn rng_snapshot(&self) -> RngSnapshot {
        self.rng.snapshot()
    }

    /// Continue the random stream from a snapshot taken earlier.
    pub fn restore_rng(&mut self, snapshot: &RngSnapshot) {
        self.rng = GrowthRng::restore(snapshot);
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GrowthEvent> + '_ {
        self.events.drain(..)
    }

    /// Socket path from the root to `id`.
    pub fn path(&self, id: BranchId) -> BranchPath {
        let mut sockets = Vec::new();
        let mut current = self.branch(id);
        while let Some(branch) = current {
            match (branch.parent, branch.socket) {
                (Some(parent), Some(socket)) => {
                    sockets.push(socket);
                    current = self.branch(parent);
                }
                _ => break,
            }
        }
        sockets.reverse();
        BranchPath(sockets)
    }

    /// Find a branch by its socket path.
    pub fn find_path(&self, path: &BranchPath) -> Option<BranchId> {
        if self.branches.is_empty() {
            return None;
        }
        let mut id = BranchId(0);
        for &socket in &path.0 {
            id = self.branch(id)?.child(socket as usize)?;
        }
        Some(id)
    }

    /// Throw away every branch and start growing again from the root.
    ///
    /// The random stream restarts from the configured seed, so restarting
    /// in an unchanged world regrows the same plant.
    pub fn restart<E: GrowthEnvironment + ?Sized>(&mut self, env: &mut E) -> Result<()> {
        self.clear(env);

        let root = match self.setup_problem() {
            Some(problem) => {
                log::error!("Plant {}: {}", self.id.0, problem);
                self.state = PlantState::MissingData;
                return Err(Error::MissingData(problem));
            }
            None => self.config.species.root.ok_or_else(|| {
                Error::MissingData(format!("species '{}' has no root", self.config.species.name))
            })?,
        };

        self.registry = match BranchTypeRegistry::discover(
            &self.catalog,
            root,
            self.config.budget.max_branch_types,
        ) {
            Ok(registry) => registry,
            Err(e) => {
                log::error!("Plant {}: {}", self.id.0, e);
                self.state = PlantState::MissingData;
                return Err(e);
            }
        };

        self.rng = GrowthRng::from_seed_u64(self.config.seed);
        self.growth_origin = self.pose;

        self.state = PlantState::Growing;
        self.events.push(GrowthEvent::Started);

        // The root goes in unconditionally
        let local = Pose::new(Vec3::ZERO, root_rotation());
        let world = self.pose.mul_pose(&local);
        self.spawn_branch(env, root, None, local, world);
        self.refresh_growability();

        log::info!(
            "Plant {} started growing '{}' (seed {}, {} branch types)",
            self.id.0,
            self.config.species.name,
            self.config.seed,
            self.registry.len()
        );
        self.complete_if_exhausted(env);
        Ok(())
    }

    /// Despawn every branch and forget the growth run, queued events
    /// included.
    pub fn clear<E: BranchInstantiator + ?Sized>(&mut self, env: &mut E) {
        for branch in self.branches.iter().rev() {
            env.despawn(branch.entity);
        }
        self.branches.clear();
        self.registry.clear();
        self.frontier.clear();
        self.events.clear();
        self.stats = GrowthStats::default();
        self.stop_reason = None;
        self.state = self.idle_state();
    }

    /// Advance growth by one budgeted batch. Returns the number of branches
    /// added.
    pub fn tick<E: GrowthEnvironment + ?Sized>(&mut self, env: &mut E) -> usize {
        if self.config.restart_when_moved && self.state != PlantState::MissingData {
            if let Err(e) = self.check_if_moved_and_restart(env) {
                log::error!("Plant {} could not restart after moving: {}", self.id.0, e);
                return 0;
            }
        }

        if self.state != PlantState::Growing {
            return 0;
        }

        let before = self.branches.len();
        let failed_before = self.stats.grow_failed;
        for _ in 0..self.config.budget.branches_per_tick {
            if self.state != PlantState::Growing {
                break;
            }
            self.grow(env);
        }

        let added = self.branches.len() - before;
        log::debug!(
            "Plant {} tick: +{} branches ({} total), {} failed attempts, {} open",
            self.id.0,
            added,
            self.branches.len(),
            self.stats.grow_failed - failed_before,
            self.frontier.len()
        );
        added
    }

    /// Restart growth if the plant moved beyond the configured threshold
    /// since the current run started. Returns whether it restarted.
    pub fn check_if_moved_and_restart<E: GrowthEnvironment + ?Sized>(
        &mut self,
        env: &mut E,
    ) -> Result<bool> {
        if !self.config.restart_when_moved || self.branches.is_empty() {
            return Ok(false);
        }
        let threshold = self.config.move_threshold;
        if !self
            .pose
            .moved_beyond(&self.growth_origin, threshold.distance, threshold.angle_degrees)
        {
            return Ok(false);
        }

        log::warn!(
            "Plant {} moved {:.3} units, restarting growth",
            self.id.0,
            self.pose.position.distance(self.growth_origin.position)
        );
        self.restart(env)?;
        Ok(true)
    }

    /// Whether the root branch would fit at `pose`, checking clearance only.
    pub fn check_seed_placement<W: WorldQuery + ?Sized>(&self, world: &W, pose: &Pose) -> bool {
        let Some(root) = self.root_template() else {
            return false;
        };
        let root_world = pose.mul_pose(&Pose::new(Vec3::ZERO, root_rotation()));
        let capsule = clearance_capsule(&root_world, root.radius, root.height);
        !world.check_capsule(&capsule, root.obstacle_layers)
    }

    /// Ease the plant down onto the surface below it.
    ///
    /// Each step sweeps a probe sphere from above the plant along its local
    /// down axis and moves the pose `lerp` of the way toward the hit, tilting
    /// its up axis toward the surface normal. Returns whether the plant ends
    /// within the move threshold of the surface.
    pub fn settle<W: WorldQuery + ?Sized>(&mut self, world: &W, steps: u32, lerp: f32) -> bool {
        let Some(root) = self.root_template() else {
            return false;
        };
        let mask = root.obstacle_layers.union(root.surface_layers);
        let radius = root.radius;
        let threshold = self.config.move_threshold;
        let lerp = lerp.clamp(0.0, 1.0);

        let mut settled = false;
        for _ in 0..steps.max(1) {
            let up = self.pose.up();
            let probe = Capsule::sphere(self.pose.position + up * SETTLE_PROBE_HEIGHT, radius);
            let Some(hit) = world.sweep_capsule(&probe, -up, SETTLE_PROBE_HEIGHT * 2.0, mask) else {
                return false;
            };

            let target = Pose::new(
                hit.point,
                (Quat::from_rotation_arc(up, hit.normal) * self.pose.rotation).normalize(),
            );
            self.pose = Pose::new(
                self.pose.position.lerp(target.position, lerp),
                self.pose.rotation.slerp(target.rotation, lerp).normalize(),
            );
            settled = !self
                .pose
                .moved_beyond(&target, threshold.distance, threshold.angle_degrees);
            if settled {
                break;
            }
        }
        settled
    }

    /// One branch add: up to `attempts_per_branch` placement attempts,
    /// stopping at the first success.
    fn grow<E: GrowthEnvironment + ?Sized>(&mut self, env: &mut E) -> Option<BranchId> {
        let max_failed = self.config.budget.max_failed_attempts;
        for _ in 0..self.config.budget.attempts_per_branch {
            match self.find_branch_to_grow(env) {
                Attempt::Grew(id) => {
                    self.complete_if_exhausted(env);
                    return Some(id);
                }
                Attempt::Finished(reason) => {
                    self.complete(env, reason);
                    return None;
                }
                Attempt::Failed => {
                    if self.stats.failed_attempts_since_success > max_failed {
                        self.complete(env, StopReason::Blocked);
                        return None;
                    }
                }
            }
        }
        None
    }

    fn find_branch_to_grow<E: GrowthEnvironment + ?Sized>(&mut self, env: &mut E) -> Attempt {
        if self.branches.len() >= self.config.species.max_total_branches {
            return Attempt::Finished(StopReason::MaxBranches);
        }
        if !self.registry.any_growable() {
            return Attempt::Finished(StopReason::NoGrowableTypes);
        }
        let Some((parent, socket_index)) = self.next_empty_slot() else {
            return Attempt::Finished(StopReason::NoOpenSockets);
        };

        let catalog = Arc::clone(&self.catalog);
        let parent_branch = &self.branches[parent.index()];
        let parent_world = parent_branch.world;
        let parent_entity = parent_branch.entity;
        let child_depth = parent_branch.depth + 1;
        let Some(socket) = catalog.sockets(parent_branch.template).get(socket_index) else {
            log::error!(
                "Plant {}: socket {} out of range on '{}'",
                self.id.0,
                socket_index,
                catalog[parent_branch.template].name
            );
            return self.fail();
        };

        self.eligible.clear();
        self.eligible.extend(socket.options.iter().filter(|o| {
            self.registry.is_growable(o.template) && catalog[o.template].allows_depth(child_depth)
        }));
        if self.eligible.is_empty() {
            return self.fail();
        }

        let draw = self.rng.unit();
        let pick = pick_weighted_index(self.eligible.iter().map(|o| o.weight), draw);
        let Some(template_id) = pick.map(|i| self.eligible[i].template) else {
            return self.fail();
        };
        let template = &catalog[template_id];

        let jitter = OrientationJitter {
            pivot_x: self.rng.symmetric(template.max_pivot_angle),
            pivot_y: self.rng.symmetric(template.max_pivot_angle),
            roll: self.rng.symmetric(template.max_roll_angle),
        };
        let rules = OrientationRules {
            vertical_bias: template.vertical_bias,
            face_upwards: template.face_upwards,
        };
        let socket_world = socket_world_pose(&parent_world, &socket.local);
        let world = Pose::new(
            socket_world.position,
            oriented_rotation(socket_world.rotation, jitter, rules),
        );

        if !placement_is_clear(&*env, self.id, template, &world, parent_entity, &mut self.hits) {
            log::trace!(
                "Plant {}: '{}' rejected at socket {} of branch {}",
                self.id.0,
                template.name,
                socket_index,
                parent.0
            );
            return self.fail();
        }

        let local = parent_world.relative(&world);
        let id = self.spawn_branch(env, template_id, Some((parent, socket_index as u8)), local, world);
        self.stats.record_success();
        self.refresh_growability();
        Attempt::Grew(id)
    }

    /// Frontier head and the first empty socket at or after the cursor.
    ///
    /// Heads with nothing left past the cursor rotate to the back. The scan
    /// visits each queued branch at most once per call.
    fn next_empty_slot(&mut self) -> Option<(BranchId, usize)> {
        let mut rotations = self.frontier.len();
        while let Some(head) = self.frontier.head() {
            let branch = &self.branches[head.index()];
            let socket_count = self.catalog.sockets(branch.template).len();
            let slot = (self.frontier.cursor()..socket_count).find(|&i| branch.children[i].is_none());
            if let Some(slot) = slot {
                self.frontier.set_cursor(slot);
                return Some((head, slot));
            }

            if rotations == 0 {
                log::warn!(
                    "Plant {}: {} queued branches but no empty socket",
                    self.id.0,
                    self.frontier.len()
                );
                return None;
            }
            rotations -= 1;

            if self.has_open_socket(head) {
                self.frontier.rotate();
            } else {
                log::warn!("Plant {}: dropping branch {} without open sockets", self.id.0, head.0);
                self.frontier.remove(head);
            }
        }
        None
    }

    /// Whether some empty socket of `id` has a candidate allowed one level
    /// deeper.
    fn has_open_socket(&self, id: BranchId) -> bool {
        let Some(branch) = self.branch(id) else {
            return false;
        };
        let child_depth = branch.depth + 1;
        self.catalog
            .sockets(branch.template)
            .iter()
            .enumerate()
            .any(|(i, socket)| {
                branch.children[i].is_none()
                    && socket
                        .options
                        .iter()
                        .any(|o| self.catalog[o.template].allows_depth(child_depth))
            })
    }

    fn spawn_branch<E: BranchInstantiator + ?Sized>(
        &mut self,
        env: &mut E,
        template_id: TemplateId,
        parent: Option<(BranchId, u8)>,
        local: Pose,
        world: Pose,
    ) -> BranchId {
        let catalog = Arc::clone(&self.catalog);
        let template = &catalog[template_id];

        let mesh_variant = if template.mesh_variants.is_empty() {
            None
        } else {
            let draw = self.rng.unit();
            pick_weighted_index(template.mesh_variants.iter().map(|v| v.weight), draw)
                .map(|i| template.mesh_variants[i].name.clone())
        };

        let (depth, parent_entity) = match parent {
            Some((p, _)) => {
                let p = &self.branches[p.index()];
                (p.depth + 1, Some(p.entity))
            }
            None => (0, None),
        };

        let entity = env.instantiate(&SpawnRequest {
            plant: self.id,
            template: template_id,
            template_name: &template.name,
            depth,
            parent: parent_entity,
            local,
            world,
            collider: branch_collider(&world, template.radius, template.height),
            layer: template.layer,
            mesh_variant: mesh_variant.as_deref(),
        });

        let id = BranchId(self.branches.len() as u32);
        self.branches.push(Branch {
            template: template_id,
            depth,
            parent: parent.map(|(p, _)| p),
            socket: parent.map(|(_, s)| s),
            children: Default::default(),
            local,
            world,
            entity,
            mesh_variant,
        });
        if let Some((p, socket)) = parent {
            self.branches[p.index()].children[socket as usize] = Some(id);
        }
        self.registry.record_added(template_id);

        if self.has_open_socket(id) {
            self.frontier.push(id);
        }
        if let Some((p, _)) = parent {
            if !self.has_open_socket(p) {
                self.frontier.remove(p);
            }
        }

        self.events.push(GrowthEvent::BranchAdded {
            branch: id,
            template: template_id,
            depth,
        });
        id
    }

    /// Finish as soon as the last add leaves nothing to grow.
    fn complete_if_exhausted<E: BranchInstantiator + ?Sized>(&mut self, env: &mut E) {
        let reason = if self.branches.len() >= self.config.species.max_total_branches {
            StopReason::MaxBranches
        } else if !self.registry.any_growable() {
            StopReason::NoGrowableTypes
        } else if self.frontier.is_empty() {
            StopReason::NoOpenSockets
        } else {
            return;
        };
        self.complete(env, reason);
    }

    fn fail(&mut self) -> Attempt {
        self.frontier.advance_cursor();
        self.stats.record_failure();
        Attempt::Failed
    }

    fn refresh_growability(&mut self) {
        self.registry.update_growability(&self.catalog, self.branches.len());
    }

    fn complete<E: BranchInstantiator + ?Sized>(&mut self, env: &mut E, reason: StopReason) {
        self.state = PlantState::Done;
        self.stop_reason = Some(reason);
        self.events.push(GrowthEvent::Completed { reason });
        log::info!(
            "Plant {} finished ({:?}): {} branches, {} placed / {} failed attempts, difficulty {:.2}",
            self.id.0,
            reason,
            self.branches.len(),
            self.stats.grow_succeeded,
            self.stats.grow_failed,
            self.difficulty()
        );
        if !self.config.keep_colliders {
            env.strip_colliders(self.id);
        }
    }

    fn root_template(&self) -> Option<&BranchTemplate> {
        self.config.species.root.and_then(|id| self.catalog.get(id))
    }

    fn setup_problem(&self) -> Option<String> {
        let species = &self.config.species;
        match species.root {
            None => Some(format!("species '{}' has no root template", species.name)),
            Some(id) if !self.catalog.contains(id) => Some(format!(
                "species '{}' root template #{} is not in the catalog",
                species.name, id.0
            )),
            Some(_) if species.max_total_branches == 0 => Some(format!(
                "species '{}' allows no branches, not even the root",
                species.name
            )),
            Some(_) => None,
        }
    }

    fn idle_state(&self) -> PlantState {
        if self.setup_problem().is_some() {
            PlantState::MissingData
        } else {
            PlantState::Done
        }
    }
}

/// Clearance and surface checks for a branch of `template` at `pose`.
///
/// Overlapping the parent branch is allowed. A required surface must belong
/// to something other than this plant.
fn placement_is_clear<W: WorldQuery + ?Sized>(
    world: &W,
    plant: PlantId,
    template: &BranchTemplate,
    pose: &Pose,
    parent: EntityId,
    hits: &mut Vec<ColliderHit>,
) -> bool {
    hits.clear();
    let clearance = clearance_capsule(pose, template.radius, template.height);
    world.overlap_capsule(&clearance, template.obstacle_layers, hits);
    if hits.iter().any(|hit| hit.entity() != Some(parent)) {
        return false;
    }

    if template.needs_surface() {
        hits.clear();
        let probe = surface_capsule(pose, template.radius, template.height, template.surface_distance);
        world.overlap_capsule(&probe, template.surface_layers, hits);
        if !hits.iter().any(|hit| hit.plant() != Some(plant)) {
            return false;
        }
    }
    true
}
