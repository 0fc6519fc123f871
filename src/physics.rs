use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use log::{debug, info, warn};
use rapier2d::crossbeam;
use rapier2d::prelude::*;

use crate::constants::{PhysicsConfig, Tag};
use crate::events::Dispatcher;

// --------------------------------------------------------------------------------------------------

/// A world mutation requested while the simulation may not be mutated
/// directly. Queued mutations are drained in FIFO order at the start of
/// the next fixed step; a mutation naming a handle that has since been
/// removed is dropped with a debug log.
#[derive(Clone, Copy, Debug)]
pub enum Mutation {
    /// Activate a body created via [`PhysicsWorld::create_body`].
    AddBody(RigidBodyHandle),

    /// Remove a body and its colliders from the simulation.
    RemoveBody(RigidBodyHandle),

    /// Apply a continuous force (cleared after one step) or an impulse.
    ApplyForce {
        body: RigidBodyHandle,
        force: Vector<Real>,
        impulse: bool,
    },

    /// Rewrite a collider's category and mask bits.
    Recategorize {
        collider: ColliderHandle,
        category: u32,
        mask: u32,
    },
}

#[derive(Default)]
pub struct MutationQueue {
    pending: Vec<Mutation>,
}

impl MutationQueue {
    pub fn push(&mut self, mutation: Mutation) {
        self.pending.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn drain(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.pending)
    }
}

// --------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// A begin/end contact or intersection between two colliders, reported
/// after the fixed step that produced it.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
    pub phase: ContactPhase,
}

/// What the driver knows about a collider it created.
#[derive(Clone, Copy, Debug)]
pub struct ColliderInfo {
    pub entity_id: u32,
    pub tag: Tag,
    pub category: u32,
    pub mask: u32,
}

/// Read-only view of the simulation handed to the contact listener,
/// plus the mutation queue. The listener never sees `&mut PhysicsWorld`,
/// so contact handling cannot mutate the world mid-step other than by
/// queueing.
pub struct StepContext<'a> {
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub info: &'a HashMap<ColliderHandle, ColliderInfo>,
    pub queue: &'a mut MutationQueue,
}

impl<'a> StepContext<'a> {
    pub fn collider_info(&self, handle: ColliderHandle) -> Option<&ColliderInfo> {
        self.info.get(&handle)
    }

    /// Linear velocity of the body a collider is attached to.
    pub fn body_velocity(&self, collider: ColliderHandle) -> Vector<Real> {
        self.colliders
            .get(collider)
            .and_then(|c| c.parent())
            .and_then(|b| self.bodies.get(b))
            .map(|b| *b.linvel())
            .unwrap_or_else(Vector::zeros)
    }
}

pub trait ContactListener {
    fn handle_contacts(
        &mut self,
        events: &[ContactEvent],
        ctx: &mut StepContext,
        dispatcher: &mut Dispatcher,
    );
}

// --------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    Fixed,
    Dynamic,
    KinematicVelocityBased,
}

#[derive(Clone, Copy, Debug)]
pub struct BodyDef {
    pub position: Vector<Real>,
    pub body_type: BodyType,
    pub fixed_rotation: bool,
    pub gravity_scale: f32,
    pub linear_damping: f32,
}

impl BodyDef {
    pub fn new(body_type: BodyType, position: Vector<Real>) -> Self {
        BodyDef {
            position,
            body_type,
            fixed_rotation: true,
            gravity_scale: 1.0,
            linear_damping: 0.0,
        }
    }

    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColliderDef {
    pub half_extents: Vector<Real>,
    pub offset: Vector<Real>,
    pub sensor: bool,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub category: u32,
    pub mask: u32,
    pub tag: Tag,
}

impl ColliderDef {
    pub fn new(half_extents: Vector<Real>, category: u32, mask: u32, tag: Tag) -> Self {
        ColliderDef {
            half_extents,
            offset: Vector::zeros(),
            sensor: false,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            category,
            mask,
            tag,
        }
    }

    pub fn offset(mut self, offset: Vector<Real>) -> Self {
        self.offset = offset;
        self
    }

    /// Sensors carry no mass of their own.
    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self.density = 0.0;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

// --------------------------------------------------------------------------------------------------

/// Owns the rapier simulation and drives it on a fixed timestep with an
/// accumulator. All structural changes go through the mutation queue;
/// bodies created between ticks start disabled and are activated when
/// their queued `AddBody` drains, so nothing joins the simulation
/// mid-frame.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    queue: MutationQueue,
    collider_info: HashMap<ColliderHandle, ColliderInfo>,
    body_entities: HashMap<RigidBodyHandle, u32>,

    accumulator: f32,
    steps_executed: u64,
    in_step: bool,
    forced_bodies: Vec<RigidBodyHandle>,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;
        if let Some(iterations) = NonZeroUsize::new(config.solver_iterations) {
            integration_parameters.num_solver_iterations = iterations;
        }

        PhysicsWorld {
            config,
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            queue: MutationQueue::default(),
            collider_info: HashMap::new(),
            body_entities: HashMap::new(),
            accumulator: 0.0,
            steps_executed: 0,
            in_step: false,
            forced_bodies: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn timestep(&self) -> f32 {
        self.config.timestep
    }

    /// Fixed steps executed since creation.
    pub fn steps_executed(&self) -> u64 {
        self.steps_executed
    }

    // ----------------------------------------------------------------------
    // Construction and queued mutation

    /// Create a body with its colliders. The body starts disabled; its
    /// activation is queued and takes effect at the start of the next
    /// fixed step.
    pub fn create_body(
        &mut self,
        entity_id: u32,
        body_def: BodyDef,
        collider_defs: &[ColliderDef],
    ) -> RigidBodyHandle {
        debug_assert!(!self.in_step, "create_body called during a physics step");

        let builder = match body_def.body_type {
            BodyType::Fixed => RigidBodyBuilder::fixed(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
            BodyType::KinematicVelocityBased => RigidBodyBuilder::kinematic_velocity_based(),
        };
        let mut builder = builder
            .translation(body_def.position)
            .gravity_scale(body_def.gravity_scale)
            .linear_damping(body_def.linear_damping)
            .enabled(false);
        if body_def.fixed_rotation {
            builder = builder.lock_rotations();
        }

        let body = self.bodies.insert(builder.build());
        for def in collider_defs {
            let collider = ColliderBuilder::cuboid(def.half_extents.x, def.half_extents.y)
                .translation(def.offset)
                .sensor(def.sensor)
                .density(def.density)
                .friction(def.friction)
                .restitution(def.restitution)
                .collision_groups(InteractionGroups::new(
                    Group::from_bits_truncate(def.category),
                    Group::from_bits_truncate(def.mask),
                ))
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build();
            let handle = self
                .colliders
                .insert_with_parent(collider, body, &mut self.bodies);
            self.collider_info.insert(
                handle,
                ColliderInfo {
                    entity_id,
                    tag: def.tag,
                    category: def.category,
                    mask: def.mask,
                },
            );
        }

        self.body_entities.insert(body, entity_id);
        self.queue.push(Mutation::AddBody(body));
        body
    }

    pub fn queue_mutation(&mut self, mutation: Mutation) {
        self.queue.push(mutation);
    }

    pub fn queue_removal(&mut self, body: RigidBodyHandle) {
        self.queue.push(Mutation::RemoveBody(body));
    }

    pub fn queue_force(&mut self, body: RigidBodyHandle, force: Vector<Real>) {
        self.queue.push(Mutation::ApplyForce {
            body,
            force,
            impulse: false,
        });
    }

    pub fn queue_impulse(&mut self, body: RigidBodyHandle, impulse: Vector<Real>) {
        self.queue.push(Mutation::ApplyForce {
            body,
            force: impulse,
            impulse: true,
        });
    }

    pub fn queue_recategorize(&mut self, collider: ColliderHandle, category: u32, mask: u32) {
        self.queue.push(Mutation::Recategorize {
            collider,
            category,
            mask,
        });
    }

    pub fn pending_mutations(&self) -> usize {
        self.queue.len()
    }

    // ----------------------------------------------------------------------
    // Direct state access, legal only between steps

    /// Set a body's linear velocity. Unlike forces this is a direct
    /// write; it is only legal between steps.
    pub fn set_velocity(&mut self, body: RigidBodyHandle, velocity: Vector<Real>) {
        if self.in_step {
            warn!("set_velocity during step ignored");
            return;
        }
        if let Some(body) = self.bodies.get_mut(body) {
            body.set_linvel(velocity, true);
        }
    }

    pub fn velocity(&self, body: RigidBodyHandle) -> Vector<Real> {
        self.bodies
            .get(body)
            .map(|b| *b.linvel())
            .unwrap_or_else(Vector::zeros)
    }

    pub fn position(&self, body: RigidBodyHandle) -> Vector<Real> {
        self.bodies
            .get(body)
            .map(|b| *b.translation())
            .unwrap_or_else(Vector::zeros)
    }

    pub fn mass(&self, body: RigidBodyHandle) -> f32 {
        self.bodies.get(body).map(|b| b.mass()).unwrap_or(0.0)
    }

    pub fn contains_body(&self, body: RigidBodyHandle) -> bool {
        self.bodies.get(body).is_some()
    }

    pub fn body_is_enabled(&self, body: RigidBodyHandle) -> bool {
        self.bodies.get(body).map(|b| b.is_enabled()).unwrap_or(false)
    }

    pub fn collider_info(&self, collider: ColliderHandle) -> Option<&ColliderInfo> {
        self.collider_info.get(&collider)
    }

    pub fn entity_of_body(&self, body: RigidBodyHandle) -> Option<u32> {
        self.body_entities.get(&body).copied()
    }

    /// Handles of the colliders attached to a body.
    pub fn colliders_of(&self, body: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.bodies
            .get(body)
            .map(|b| b.colliders().to_vec())
            .unwrap_or_default()
    }

    /// Find the collider of a body carrying the given tag.
    pub fn collider_with_tag(&self, body: RigidBodyHandle, tag: Tag) -> Option<ColliderHandle> {
        self.colliders_of(body).into_iter().find(|h| {
            self.collider_info
                .get(h)
                .map(|info| info.tag == tag)
                .unwrap_or(false)
        })
    }

    // ----------------------------------------------------------------------
    // Stepping

    /// Advance the simulation by the frame delta. The delta is clamped
    /// to `max_frame_time`, added to the accumulator, and as many fixed
    /// steps as fit are executed; the queue drains at the start of each
    /// step and contact events are classified after each step.
    pub fn update(
        &mut self,
        dt: Duration,
        listener: &mut dyn ContactListener,
        dispatcher: &mut Dispatcher,
    ) {
        let frame_time = dt.as_secs_f32().min(self.config.max_frame_time);
        self.accumulator += frame_time;

        while self.accumulator >= self.config.timestep {
            self.drain_mutations();
            let events = self.step_once();
            self.process_contacts(&events, listener, dispatcher);
            self.accumulator -= self.config.timestep;
        }
    }

    /// Fraction of a timestep left in the accumulator, for render
    /// interpolation between the previous and current body transforms.
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator / self.config.timestep
    }

    /// Run the listener over a batch of contact events. Called from
    /// `update` after each fixed step.
    pub fn process_contacts(
        &mut self,
        events: &[ContactEvent],
        listener: &mut dyn ContactListener,
        dispatcher: &mut Dispatcher,
    ) {
        if events.is_empty() {
            return;
        }
        let mut ctx = StepContext {
            bodies: &self.bodies,
            colliders: &self.colliders,
            info: &self.collider_info,
            queue: &mut self.queue,
        };
        listener.handle_contacts(events, &mut ctx, dispatcher);
    }

    fn step_once(&mut self) -> Vec<ContactEvent> {
        let (collision_send, collision_recv) = crossbeam::channel::unbounded();
        let (force_send, _force_recv) = crossbeam::channel::unbounded();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.in_step = true;
        self.pipeline.step(
            &self.config.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );
        self.in_step = false;
        self.steps_executed += 1;

        // Queued forces last exactly one step.
        for handle in self.forced_bodies.drain(..) {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.reset_forces(true);
            }
        }

        let mut events = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            match event {
                CollisionEvent::Started(a, b, _) => events.push(ContactEvent {
                    a,
                    b,
                    phase: ContactPhase::Begin,
                }),
                CollisionEvent::Stopped(a, b, _) => events.push(ContactEvent {
                    a,
                    b,
                    phase: ContactPhase::End,
                }),
            }
        }
        events
    }

    fn drain_mutations(&mut self) {
        for mutation in self.queue.drain() {
            match mutation {
                Mutation::AddBody(handle) => {
                    if let Some(body) = self.bodies.get_mut(handle) {
                        body.set_enabled(true);
                    } else {
                        debug!("AddBody {:?} dropped, body was removed", handle);
                    }
                }
                Mutation::RemoveBody(handle) => {
                    if self.bodies.get(handle).is_some() {
                        for collider in self.colliders_of(handle) {
                            self.collider_info.remove(&collider);
                        }
                        self.bodies.remove(
                            handle,
                            &mut self.islands,
                            &mut self.colliders,
                            &mut self.impulse_joints,
                            &mut self.multibody_joints,
                            true,
                        );
                        self.body_entities.remove(&handle);
                    } else {
                        debug!("RemoveBody {:?} dropped, body already removed", handle);
                    }
                }
                Mutation::ApplyForce {
                    body,
                    force,
                    impulse,
                } => {
                    if let Some(b) = self.bodies.get_mut(body) {
                        if impulse {
                            b.apply_impulse(force, true);
                        } else {
                            b.add_force(force, true);
                            self.forced_bodies.push(body);
                        }
                    } else {
                        debug!("ApplyForce dropped, body {:?} was removed", body);
                    }
                }
                Mutation::Recategorize {
                    collider,
                    category,
                    mask,
                } => {
                    if let Some(c) = self.colliders.get_mut(collider) {
                        info!(
                            "recategorize {:?}: {:#05x}/{:#05x} -> {:#05x}/{:#05x}",
                            collider,
                            c.collision_groups().memberships.bits(),
                            c.collision_groups().filter.bits(),
                            category,
                            mask
                        );
                        c.set_collision_groups(InteractionGroups::new(
                            Group::from_bits_truncate(category),
                            Group::from_bits_truncate(mask),
                        ));
                        if let Some(info) = self.collider_info.get_mut(&collider) {
                            info.category = category;
                            info.mask = mask;
                        }
                    } else {
                        debug!("Recategorize dropped, collider {:?} was removed", collider);
                    }
                }
            }
        }
    }
}

// --------------------------------------------------------------------------------------------------

#[cfg(test)]
mod physics_tests {
    use super::*;
    use crate::constants::{category, mask};

    struct NullListener;

    impl ContactListener for NullListener {
        fn handle_contacts(
            &mut self,
            _events: &[ContactEvent],
            _ctx: &mut StepContext,
            _dispatcher: &mut Dispatcher,
        ) {
        }
    }

    /// Records contact batches, optionally queueing a removal on the
    /// first begin event it sees.
    #[derive(Default)]
    struct RecordingListener {
        begins: Vec<(ColliderHandle, ColliderHandle)>,
        ends: Vec<(ColliderHandle, ColliderHandle)>,
        remove_on_begin: Option<RigidBodyHandle>,
    }

    impl ContactListener for RecordingListener {
        fn handle_contacts(
            &mut self,
            events: &[ContactEvent],
            ctx: &mut StepContext,
            _dispatcher: &mut Dispatcher,
        ) {
            for event in events {
                match event.phase {
                    ContactPhase::Begin => {
                        self.begins.push((event.a, event.b));
                        if let Some(body) = self.remove_on_begin.take() {
                            ctx.queue.push(Mutation::RemoveBody(body));
                        }
                    }
                    ContactPhase::End => self.ends.push((event.a, event.b)),
                }
            }
        }
    }

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default())
    }

    /// A config whose timestep is an exact binary fraction, so step
    /// counts in these tests do not depend on float rounding.
    fn exact_config() -> PhysicsConfig {
        PhysicsConfig {
            timestep: 1.0 / 64.0,
            ..PhysicsConfig::default()
        }
    }

    // Slightly more than one 60Hz timestep; advances exactly one step.
    const FRAME: f32 = 0.017;

    fn tick(world: &mut PhysicsWorld, listener: &mut dyn ContactListener, seconds: f32) {
        let mut dispatcher = Dispatcher::default();
        world.update(
            Duration::from_secs_f32(seconds),
            listener,
            &mut dispatcher,
        );
    }

    fn dynamic_sensor_body(
        world: &mut PhysicsWorld,
        entity_id: u32,
        position: Vector<Real>,
        category: u32,
        mask: u32,
        tag: Tag,
    ) -> RigidBodyHandle {
        world.create_body(
            entity_id,
            BodyDef::new(BodyType::Dynamic, position).gravity_scale(0.0),
            &[ColliderDef::new(vector![0.5, 0.5], category, mask, tag).sensor()],
        )
    }

    #[test]
    fn step_count_is_independent_of_frame_chunking() {
        let chunkings: &[(usize, f32)] = &[(8, 0.125), (4, 0.25), (16, 0.0625)];
        let mut counts = vec![];
        for (n, dt) in chunkings {
            let mut w = PhysicsWorld::new(exact_config());
            let mut listener = NullListener;
            for _ in 0..*n {
                tick(&mut w, &mut listener, *dt);
            }
            counts.push(w.steps_executed());
        }
        assert_eq!(counts, vec![64, 64, 64]);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut w = PhysicsWorld::new(exact_config());
        let mut listener = NullListener;
        tick(&mut w, &mut listener, 10.0);
        // 0.25s of catch-up at 64Hz
        assert_eq!(w.steps_executed(), 16);
    }

    #[test]
    fn bodies_activate_only_when_the_queue_drains() {
        let mut w = world();
        let body = dynamic_sensor_body(
            &mut w,
            1,
            vector![0.0, 0.0],
            category::PLAYER,
            mask::PLAYER,
            Tag::PlayerBody,
        );
        assert!(!w.body_is_enabled(body));
        assert_eq!(w.pending_mutations(), 1);

        let mut listener = NullListener;
        tick(&mut w, &mut listener, FRAME);
        assert!(w.body_is_enabled(body));
        assert_eq!(w.pending_mutations(), 0);
    }

    #[test]
    fn removal_queued_from_contact_applies_next_step() {
        let mut w = world();
        let a = dynamic_sensor_body(
            &mut w,
            1,
            vector![0.0, 0.0],
            category::PLAYER,
            mask::PLAYER,
            Tag::PlayerBody,
        );
        let b = dynamic_sensor_body(
            &mut w,
            2,
            vector![0.25, 0.0],
            category::ENEMY,
            mask::ENEMY,
            Tag::EnemyBody,
        );

        let mut listener = RecordingListener::default();
        listener.remove_on_begin = Some(b);

        // First tick: activation drains, bodies overlap, the contact
        // queues the removal. The body must survive this tick.
        tick(&mut w, &mut listener, FRAME);
        assert!(!listener.begins.is_empty());
        assert!(w.contains_body(b));

        tick(&mut w, &mut listener, FRAME);
        assert!(w.contains_body(a));
        assert!(!w.contains_body(b));
    }

    #[test]
    fn mutations_for_stale_handles_are_dropped() {
        let mut w = world();
        let body = dynamic_sensor_body(
            &mut w,
            1,
            vector![0.0, 0.0],
            category::ITEM,
            mask::ITEM,
            Tag::ItemBody,
        );
        let collider = w.colliders_of(body)[0];

        let mut listener = NullListener;
        tick(&mut w, &mut listener, FRAME);

        // Duplicate removals plus mutations against the dead handles.
        w.queue_removal(body);
        w.queue_removal(body);
        w.queue_impulse(body, vector![5.0, 0.0]);
        w.queue_recategorize(collider, category::ENEMY, mask::ENEMY);
        tick(&mut w, &mut listener, FRAME);
        assert!(!w.contains_body(body));
        assert_eq!(w.pending_mutations(), 0);
    }

    #[test]
    fn category_filter_suppresses_unmatched_pairs() {
        let mut w = world();
        // Enemy and item overlap, but neither side's mask names the
        // other's category.
        dynamic_sensor_body(
            &mut w,
            1,
            vector![0.0, 0.0],
            category::ENEMY,
            mask::ENEMY,
            Tag::EnemyBody,
        );
        dynamic_sensor_body(
            &mut w,
            2,
            vector![0.25, 0.0],
            category::ITEM,
            mask::ITEM,
            Tag::ItemBody,
        );
        // Player overlaps both and all pair masks match.
        dynamic_sensor_body(
            &mut w,
            3,
            vector![0.25, 0.25],
            category::PLAYER,
            mask::PLAYER,
            Tag::PlayerBody,
        );

        let mut listener = RecordingListener::default();
        tick(&mut w, &mut listener, FRAME);

        let tags_of = |w: &PhysicsWorld, pair: &(ColliderHandle, ColliderHandle)| {
            (
                w.collider_info(pair.0).map(|i| i.tag),
                w.collider_info(pair.1).map(|i| i.tag),
            )
        };
        for pair in &listener.begins {
            let tags = tags_of(&w, pair);
            assert!(
                tags.0 == Some(Tag::PlayerBody) || tags.1 == Some(Tag::PlayerBody),
                "unexpected contact pair {:?}",
                tags
            );
        }
        assert!(!listener.begins.is_empty());
    }

    #[test]
    fn queued_impulse_changes_velocity_once_applied() {
        let mut w = world();
        let body = w.create_body(
            1,
            BodyDef::new(BodyType::Dynamic, vector![0.0, 0.0]).gravity_scale(0.0),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::PLAYER,
                mask::PLAYER,
                Tag::PlayerBody,
            )],
        );
        let mut listener = NullListener;
        tick(&mut w, &mut listener, FRAME);

        let mass = w.mass(body);
        assert!(mass > 0.0);
        w.queue_impulse(body, vector![mass * 3.0, 0.0]);
        assert_eq!(w.velocity(body).x, 0.0);

        tick(&mut w, &mut listener, FRAME);
        assert!((w.velocity(body).x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn recategorize_rewrites_collider_info() {
        let mut w = world();
        let body = dynamic_sensor_body(
            &mut w,
            1,
            vector![0.0, 0.0],
            category::ENEMY,
            mask::ENEMY,
            Tag::EnemyBody,
        );
        let collider = w.colliders_of(body)[0];

        w.queue_recategorize(collider, category::SHELL, mask::SHELL);
        let mut listener = NullListener;
        tick(&mut w, &mut listener, FRAME);

        let info = w.collider_info(collider).unwrap();
        assert_eq!(info.category, category::SHELL);
        assert_eq!(info.mask, mask::SHELL);
    }
}
