use std::time::Duration;

use rand::Rng;
use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::contact::ContactFlags;
use crate::entities::util::{DefeatState, Direction};
use crate::entity::{Entity, EntityClass, GameStatePeek};
use crate::events::{Dispatcher, Event, Message};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const WIDTH: f32 = 0.8;
const HEIGHT: f32 = 1.0;
const WALK_SPEED: f32 = 0.8;
const SHELL_SPEED: f32 = 8.0;
const WAKE_UP_TIME: f32 = 5.0;
const WAKE_UP_ANIMATION: f32 = 1.0;
const SHELL_STOP_THRESHOLD: f32 = 0.1;
const KNOCKBACK_IMPULSE: f32 = 2.0;
const TURNAROUND_GRACE: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KoopaState {
    Walking,
    /// Hiding in the shell; wakes up if left alone.
    Shell,
    /// Kicked; slides until something stops it.
    ShellMoving,
    WakingUp,
}

/// Retreats into a shell when stomped; the shell can be kicked, slides
/// as a `Shell`-category collider that defeats other enemies, and wakes
/// back up if left alone.
pub struct Koopa {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    spawn_position: Vector<Real>,
    state: KoopaState,
    state_time: f32,
    wake_up_remaining: f32,
    facing: Direction,
    lifetime: f32,
    defeat: DefeatState,
}

impl Koopa {
    pub fn new(spawn_position: Vector<Real>) -> Self {
        let facing = if rand::thread_rng().gen_bool(0.5) {
            Direction::East
        } else {
            Direction::West
        };
        Koopa {
            entity_id: 0,
            body: None,
            spawn_position,
            state: KoopaState::Walking,
            state_time: 0.0,
            wake_up_remaining: 0.0,
            facing,
            lifetime: 0.0,
            defeat: DefeatState::new(),
        }
    }

    pub fn state(&self) -> KoopaState {
        self.state
    }

    pub fn is_defeated(&self) -> bool {
        self.defeat.defeated()
    }

    fn set_state(&mut self, state: KoopaState) {
        self.state = state;
        self.state_time = 0.0;
    }

    fn shell_collider(&self, physics: &PhysicsWorld) -> Option<ColliderHandle> {
        self.body
            .and_then(|body| physics.collider_with_tag(body, Tag::EnemyBody))
    }

    fn enter_shell(&mut self, physics: &mut PhysicsWorld) {
        self.set_state(KoopaState::Shell);
        self.wake_up_remaining = WAKE_UP_TIME;
        if let Some(body) = self.body {
            physics.set_velocity(body, Vector::zeros());
        }
    }

    fn kick_shell(&mut self, physics: &mut PhysicsWorld, dispatcher: &mut Dispatcher) {
        self.set_state(KoopaState::ShellMoving);
        self.facing = self.facing.invert();
        if let Some(body) = self.body {
            physics.set_velocity(body, vector![SHELL_SPEED * self.facing.sign(), 0.0]);
        }
        // The sliding shell becomes a hazard to other enemies.
        if let Some(collider) = self.shell_collider(physics) {
            physics.queue_recategorize(collider, category::SHELL, mask::SHELL);
        }
        dispatcher.broadcast(Event::ShellKicked {
            shell: self.entity_id,
        });
    }

    fn stop_shell(&mut self, physics: &mut PhysicsWorld) {
        self.set_state(KoopaState::Shell);
        self.wake_up_remaining = WAKE_UP_TIME;
        if let Some(body) = self.body {
            let velocity = physics.velocity(body);
            physics.set_velocity(body, vector![0.0, velocity.y]);
        }
        if let Some(collider) = self.shell_collider(physics) {
            physics.queue_recategorize(collider, category::ENEMY, mask::ENEMY);
        }
    }
}

impl Entity for Koopa {
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld) {
        self.entity_id = entity_id;
        let body = physics.create_body(
            entity_id,
            BodyDef::new(BodyType::Dynamic, self.spawn_position),
            &[
                ColliderDef::new(
                    vector![WIDTH * 0.5, HEIGHT * 0.5],
                    category::ENEMY,
                    mask::ENEMY,
                    Tag::EnemyBody,
                )
                .friction(0.5),
                ColliderDef::new(
                    vector![WIDTH * 0.4, 0.1],
                    category::ENEMY_HEAD,
                    mask::ENEMY_HEAD,
                    Tag::EnemyHeadSensor,
                )
                .offset(vector![0.0, HEIGHT * 0.5])
                .sensor(),
            ],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Koopa
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn is_alive(&self) -> bool {
        self.defeat.alive()
    }

    fn update(
        &mut self,
        dt: Duration,
        _flags: ContactFlags,
        physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
        _peek: &GameStatePeek,
    ) {
        let dt = dt.as_secs_f32();
        self.lifetime += dt;
        self.state_time += dt;
        self.defeat.update(dt);
        if self.defeat.defeated() {
            return;
        }

        let body = match self.body {
            Some(body) => body,
            None => return,
        };

        match self.state {
            KoopaState::Walking => {
                let velocity = physics.velocity(body);
                if self.lifetime > TURNAROUND_GRACE
                    && velocity.x * self.facing.sign() < WALK_SPEED * 0.1
                {
                    self.facing = self.facing.invert();
                }
                physics.set_velocity(body, vector![WALK_SPEED * self.facing.sign(), velocity.y]);
            }
            KoopaState::Shell => {
                self.wake_up_remaining -= dt;
                if self.wake_up_remaining <= 0.0 {
                    self.set_state(KoopaState::WakingUp);
                }
            }
            KoopaState::ShellMoving => {
                if physics.velocity(body).x.abs() < SHELL_STOP_THRESHOLD {
                    self.stop_shell(physics);
                }
            }
            KoopaState::WakingUp => {
                if self.state_time > WAKE_UP_ANIMATION {
                    self.set_state(KoopaState::Walking);
                }
            }
        }
    }

    fn on_stomped_from_above(
        &mut self,
        _by: u32,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if self.defeat.defeated() {
            return;
        }
        match self.state {
            KoopaState::Walking | KoopaState::WakingUp => self.enter_shell(physics),
            KoopaState::Shell => self.kick_shell(physics, dispatcher),
            KoopaState::ShellMoving => self.stop_shell(physics),
        }
    }

    fn on_side_hit(
        &mut self,
        with: u32,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if self.defeat.defeated() {
            return;
        }
        if self.state == KoopaState::ShellMoving {
            // Running into a moving shell punts it back the other way.
            self.kick_shell(physics, dispatcher);
            return;
        }
        if self.defeat.try_inflict_damage() {
            dispatcher.entity_to_entity(self.entity_id, with, Event::InflictDamage);
            if let Some(body) = self.body {
                physics.queue_impulse(
                    body,
                    vector![KNOCKBACK_IMPULSE * -self.facing.sign(), KNOCKBACK_IMPULSE],
                );
            }
        }
    }

    fn handle_message(
        &mut self,
        message: &Message,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if let Event::HitByShell { .. } = message.event {
            if !self.defeat.defeated() {
                self.defeat.defeat(self.body, physics);
                dispatcher.broadcast(Event::EnemyDefeated {
                    enemy: self.entity_id,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------
