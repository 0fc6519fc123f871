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
const HEIGHT: f32 = 0.8;
const WALK_SPEED: f32 = 1.0;
// Grace before treating a near-zero velocity as an obstacle.
const TURNAROUND_GRACE: f32 = 0.2;

/// Walks in one direction until blocked, then turns around. Dies to a
/// stomp or a sliding shell; brushing it laterally damages the player.
pub struct Goomba {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    spawn_position: Vector<Real>,
    facing: Direction,
    lifetime: f32,
    defeat: DefeatState,
}

impl Goomba {
    pub fn new(spawn_position: Vector<Real>) -> Self {
        let facing = if rand::thread_rng().gen_bool(0.5) {
            Direction::East
        } else {
            Direction::West
        };
        Goomba {
            entity_id: 0,
            body: None,
            spawn_position,
            facing,
            lifetime: 0.0,
            defeat: DefeatState::new(),
        }
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_defeated(&self) -> bool {
        self.defeat.defeated()
    }
}

impl Entity for Goomba {
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
        EntityClass::Goomba
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
        self.defeat.update(dt);
        if self.defeat.defeated() {
            return;
        }

        let body = match self.body {
            Some(body) => body,
            None => return,
        };

        // Blocked by a wall or another enemy: turn around.
        let velocity = physics.velocity(body);
        if self.lifetime > TURNAROUND_GRACE && velocity.x * self.facing.sign() < WALK_SPEED * 0.1 {
            self.facing = self.facing.invert();
        }
        physics.set_velocity(body, vector![WALK_SPEED * self.facing.sign(), velocity.y]);
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
        self.defeat.defeat(self.body, physics);
        dispatcher.broadcast(Event::EnemyDefeated {
            enemy: self.entity_id,
        });
    }

    fn on_side_hit(
        &mut self,
        with: u32,
        _physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if self.defeat.try_inflict_damage() {
            dispatcher.entity_to_entity(self.entity_id, with, Event::InflictDamage);
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
