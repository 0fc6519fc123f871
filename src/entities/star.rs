use std::time::Duration;

use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::contact::ContactFlags;
use crate::entities::util::Direction;
use crate::entity::{Entity, EntityClass, GameStatePeek};
use crate::events::{Dispatcher, Event, Message};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.4;
const SPEED: f32 = 2.0;
const TURNAROUND_GRACE: f32 = 0.2;
const BOUNCE: f32 = 0.8;

/// A star that bounces through the level; touching it makes the player
/// invincible for a while.
pub struct Star {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    spawn_position: Vector<Real>,
    facing: Direction,
    lifetime: f32,
    collected: bool,
}

impl Star {
    pub fn new(spawn_position: Vector<Real>) -> Self {
        Star {
            entity_id: 0,
            body: None,
            spawn_position,
            facing: Direction::East,
            lifetime: 0.0,
            collected: false,
        }
    }
}

impl Entity for Star {
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
            .friction(0.0)
            .restitution(BOUNCE)],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Star
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
                dispatcher.entity_to_entity(self.entity_id, player, Event::GrantInvincibility);
            }
        }
    }
}

#[cfg(test)]
mod star_tests {
    use super::*;
    use crate::constants::PhysicsConfig;

    #[test]
    fn pickup_grants_invincibility_and_reaps() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let mut dispatcher = Dispatcher::default();
        let mut star = Star::new(vector![0.0, 1.0]);
        star.init(14, &mut physics);

        let touch = Message {
            sender_entity_id: Some(1),
            recipient_entity_id: Some(14),
            event: Event::TouchedByPlayer { player: 1 },
        };
        star.handle_message(&touch, &mut physics, &mut dispatcher);
        star.handle_message(&touch, &mut physics, &mut dispatcher);

        let grants: Vec<_> = dispatcher
            .drain()
            .into_iter()
            .filter(|m| matches!(m.event, Event::GrantInvincibility))
            .collect();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].recipient_entity_id, Some(1));
        assert!(!star.is_alive());
    }
}
