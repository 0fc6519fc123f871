use std::time::Duration;

use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::contact::ContactFlags;
use crate::entities::util::Direction;
use crate::entity::{Entity, EntityClass, GameStatePeek};
use crate::events::{Dispatcher, Event, Message};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.4;
const SPEED: f32 = 1.5;
const TURNAROUND_GRACE: f32 = 0.2;

/// A power-up that wanders the level until the player picks it up.
pub struct Mushroom {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    spawn_position: Vector<Real>,
    facing: Direction,
    lifetime: f32,
    collected: bool,
}

impl Mushroom {
    pub fn new(spawn_position: Vector<Real>) -> Self {
        Mushroom {
            entity_id: 0,
            body: None,
            spawn_position,
            facing: Direction::East,
            lifetime: 0.0,
            collected: false,
        }
    }
}

impl Entity for Mushroom {
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld) {
        self.entity_id = entity_id;
        let body = physics.create_body(
            entity_id,
            BodyDef::new(BodyType::Dynamic, self.spawn_position),
            &[ColliderDef::new(
                vector![HALF_EXTENT, HALF_EXTENT],
                category::ITEM,
                mask::ITEM,
                Tag::ItemBody,
            )
            .friction(0.1)],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Mushroom
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn is_alive(&self) -> bool {
        !self.collected
    }

    fn update(
        &mut self,
        dt: Duration,
        _flags: ContactFlags,
        physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
        _peek: &GameStatePeek,
    ) {
        self.lifetime += dt.as_secs_f32();
        let body = match self.body {
            Some(body) => body,
            None => return,
        };
        let velocity = physics.velocity(body);
        if self.lifetime > TURNAROUND_GRACE && velocity.x * self.facing.sign() < SPEED * 0.1 {
            self.facing = self.facing.invert();
        }
        physics.set_velocity(body, vector![SPEED * self.facing.sign(), velocity.y]);
    }

    fn handle_message(
        &mut self,
        message: &Message,
        _physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if let Event::TouchedByPlayer { player } = message.event {
            if !self.collected {
                self.collected = true;
                dispatcher.entity_to_entity(self.entity_id, player, Event::GrantPower);
            }
        }
    }
}
