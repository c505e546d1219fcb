use std::collections::BTreeSet;

use tracing::{debug, instrument, trace, warn};

use crate::collision::{
    collide, BodyHandle, Bvh, BvhEntry, CollisionEvent, CollisionEventKind, CollisionPair, Contact,
};
use crate::constraints::{Joint, JointHandle};
use crate::dynamics::{integrate, BodySet, RigidBody};
use crate::error::{PhysicsError, Result};
use crate::forces::{ForceGenerator, ForceRegistry};
use crate::math::Vec2;
use crate::solver::{SequentialImpulseSolver, SolverConfig};

/// Configuration for the physics world
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Acceleration applied to every body that doesn't ignore it (y up)
    pub gravity: Vec2,
    /// Substeps used by [`World::advance`]
    pub default_substeps: usize,
    /// Solver configuration
    pub solver: SolverConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            default_substeps: 8,
            solver: SolverConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Checks that every field is in range
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig {
                field: "gravity",
                reason: "must be finite",
            });
        }
        if self.default_substeps == 0 {
            return Err(PhysicsError::InvalidConfig {
                field: "default_substeps",
                reason: "must be at least 1",
            });
        }
        self.solver.validate()
    }
}

/// The physics world: owns every body, joint and force generator and runs
/// the simulation pipeline.
///
/// Each substep runs integrate, broad phase, narrow phase, joint pre-solve,
/// contact solve and the joint iterations, in that order.
pub struct World {
    config: WorldConfig,
    bodies: BodySet,
    /// Removed joints leave `None` until `clear`
    joints: Vec<Option<Joint>>,
    forces: ForceRegistry,
    broad_phase: Bvh,
    solver: SequentialImpulseSolver,
    /// Contacts found by the last substep
    contacts: Vec<Contact>,
    /// Pairs that touched during the last step
    touching: BTreeSet<CollisionPair>,
    events: Vec<CollisionEvent>,
    time: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Creates a world, replacing out-of-range config values with defaults
    pub fn new(mut config: WorldConfig) -> Self {
        if config.default_substeps == 0 {
            warn!("default_substeps of 0 raised to 1");
            config.default_substeps = 1;
        }
        if !config.gravity.is_finite() {
            warn!(gravity = ?config.gravity, "non-finite gravity replaced by default");
            config.gravity = WorldConfig::default().gravity;
        }
        let solver = SequentialImpulseSolver::new(config.solver);
        config.solver = *solver.config();

        Self {
            config,
            bodies: BodySet::new(),
            joints: Vec::new(),
            forces: ForceRegistry::new(),
            broad_phase: Bvh::new(),
            solver,
            contacts: Vec::new(),
            touching: BTreeSet::new(),
            events: Vec::new(),
            time: 0.0,
        }
    }

    /// Creates a world, rejecting an invalid config
    pub fn try_new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Current configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Sets the gravity
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    /// Gets the gravity
    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Adds a body and returns its handle
    pub fn add_body(&mut self, mut body: RigidBody) -> BodyHandle {
        body.update_derived_data();
        let handle = self.bodies.insert(body);
        debug!(%handle, "body added");
        handle
    }

    /// Removes a body along with every joint and force generator that uses it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.bodies.remove(handle)?;

        for slot in &mut self.joints {
            if slot.as_ref().is_some_and(|joint| joint.involves(handle)) {
                *slot = None;
            }
        }
        self.forces.remove_body(handle);
        self.contacts
            .retain(|contact| contact.body_a != handle && contact.body_b != handle);
        self.touching.retain(|pair| !pair.contains(handle));

        debug!(%handle, "body removed");
        Some(body)
    }

    /// Gets a reference to a body
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Gets a mutable reference to a body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// All bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Returns the number of bodies in the world
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Adds a joint between two live, distinct bodies
    pub fn add_joint(&mut self, joint: impl Into<Joint>) -> Result<JointHandle> {
        let mut joint = joint.into();
        let (a, b) = joint.bodies();
        if a == b {
            return Err(PhysicsError::SelfJoint(a));
        }
        let body_a = self.bodies.get(a).ok_or(PhysicsError::UnknownBody(a))?;
        let body_b = self.bodies.get(b).ok_or(PhysicsError::UnknownBody(b))?;
        joint.on_added(body_a, body_b);

        let handle = JointHandle(self.joints.len() as u32);
        self.joints.push(Some(joint));
        debug!(%handle, body_a = %a, body_b = %b, "joint added");
        Ok(handle)
    }

    /// Removes a joint and returns it
    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<Joint> {
        let joint = self
            .joints
            .get_mut(handle.index())
            .and_then(Option::take)
            .ok_or(PhysicsError::UnknownJoint(handle))?;
        debug!(%handle, "joint removed");
        Ok(joint)
    }

    /// Gets a reference to a joint
    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle.index()).and_then(Option::as_ref)
    }

    /// Gets a mutable reference to a joint
    pub fn joint_mut(&mut self, handle: JointHandle) -> Option<&mut Joint> {
        self.joints.get_mut(handle.index()).and_then(Option::as_mut)
    }

    /// Live joints in insertion order
    pub fn joints(&self) -> impl Iterator<Item = (JointHandle, &Joint)> {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|joint| (JointHandle(i as u32), joint)))
    }

    /// Registers a force generator on `body`
    pub fn add_force_generator(&mut self, body: BodyHandle, generator: ForceGenerator) -> Result<()> {
        if !self.bodies.contains(body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        if let Some(other) = generator.other_body() {
            if !self.bodies.contains(other) {
                return Err(PhysicsError::UnknownBody(other));
            }
        }
        self.forces.add(body, generator);
        debug!(%body, "force generator added");
        Ok(())
    }

    /// The force registry, e.g. to steer control surfaces
    pub fn force_registry(&self) -> &ForceRegistry {
        &self.forces
    }

    /// Mutable access to the force registry
    pub fn force_registry_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    /// Removes every body, joint, force generator, contact and event.
    ///
    /// Slots left by earlier removals are reclaimed and handles restart from zero.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.forces.clear();
        self.broad_phase = Bvh::new();
        self.contacts.clear();
        self.touching.clear();
        self.events.clear();
        self.time = 0.0;
        debug!("world cleared");
    }

    /// Clears force/torque accumulators and refreshes derived data.
    ///
    /// Call once per frame before adding the frame's forces.
    pub fn start_frame(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.clear_accumulators();
            body.update_derived_data();
        }
    }

    /// Steps with [`WorldConfig::default_substeps`]
    pub fn advance(&mut self, dt: f32) {
        self.step(dt, self.config.default_substeps);
    }

    /// Advances the simulation by `dt`, split into `substeps` equal substeps.
    ///
    /// Forces added since [`World::start_frame`] act during every substep.
    /// Does nothing if `dt <= 0` or `substeps == 0`.
    #[instrument(level = "trace", skip(self))]
    pub fn step(&mut self, dt: f32, substeps: usize) {
        if dt.is_nan() || dt <= 0.0 || substeps == 0 {
            return;
        }
        let sub_dt = dt / substeps as f32;

        let frame_forces: Vec<(BodyHandle, Vec2, f32)> = self
            .bodies
            .iter()
            .map(|(handle, body)| (handle, body.force(), body.torque()))
            .collect();

        let mut touched = BTreeSet::new();
        for _ in 0..substeps {
            self.apply_frame_forces(&frame_forces);
            self.forces.update_forces(&mut self.bodies, sub_dt);
            self.substep(sub_dt);
            touched.extend(self.contacts.iter().map(Contact::pair));
        }

        self.update_events(touched);
        self.time += dt;
    }

    fn apply_frame_forces(&mut self, frame_forces: &[(BodyHandle, Vec2, f32)]) {
        for &(handle, force, torque) in frame_forces {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.clear_accumulators();
                body.add_force(force);
                body.add_torque(torque);
            }
        }
    }

    fn substep(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for (_, body) in self.bodies.iter_mut() {
            integrate(body, gravity, dt);
        }

        let pairs = self.broad_phase();
        self.narrow_phase(&pairs);
        trace!(pairs = pairs.len(), contacts = self.contacts.len(), "substep collisions");

        self.solver
            .pre_solve_joints(self.joints.iter_mut().flatten(), &mut self.bodies, dt);
        self.solver.solve_contacts(&self.contacts, &mut self.bodies);
        for _ in 0..self.solver.config().joint_iterations {
            self.solver
                .solve_joints(self.joints.iter_mut().flatten(), &mut self.bodies);
        }
    }

    /// Rebuilds the BVH and returns candidate pairs sorted by handle
    fn broad_phase(&mut self) -> Vec<CollisionPair> {
        self.broad_phase.build(self.bodies.iter().map(|(handle, body)| BvhEntry {
            handle,
            aabb: body.aabb(),
            collision_enabled: body.collision_enabled,
        }));
        let mut pairs = self.broad_phase.query_pairs();
        pairs.sort_unstable();
        pairs
    }

    fn narrow_phase(&mut self, pairs: &[CollisionPair]) {
        self.contacts.clear();
        for pair in pairs {
            let (Some(a), Some(b)) = (self.bodies.get(pair.body_a), self.bodies.get(pair.body_b)) else {
                continue;
            };
            if a.is_immovable() && b.is_immovable() {
                continue;
            }
            if let Some(contact) = collide(pair.body_a, a, pair.body_b, b) {
                self.contacts.push(contact);
            }
        }
    }

    fn update_events(&mut self, touched: BTreeSet<CollisionPair>) {
        self.events.clear();
        for pair in self.touching.union(&touched) {
            let kind = match (self.touching.contains(pair), touched.contains(pair)) {
                (false, true) => CollisionEventKind::Started,
                (true, true) => CollisionEventKind::Persisted,
                _ => CollisionEventKind::Ended,
            };
            self.events.push(CollisionEvent { pair: *pair, kind });
        }
        self.touching = touched;
    }

    /// Contacts produced by the most recent substep, in solve order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Touch events produced by the most recent step, sorted by pair
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Returns the current simulation time
    pub fn time(&self) -> f32 {
        self.time
    }
}
