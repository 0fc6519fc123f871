use rapier2d::prelude::*;

use crate::constants::{category, Tag};
use crate::entity::{Entity, EntityClass};
use crate::events::{Dispatcher, Event, Message};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.4;

/// A fire flower; stays where it sprouted and grants the fire power
/// tier on touch.
pub struct Flower {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    position: Vector<Real>,
    collected: bool,
}

impl Flower {
    pub fn new(position: Vector<Real>) -> Self {
        Flower {
            entity_id: 0,
            body: None,
            position,
            collected: false,
        }
    }
}

impl Entity for Flower {
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld) {
        self.entity_id = entity_id;
        let body = physics.create_body(
            entity_id,
            BodyDef::new(BodyType::Fixed, self.position),
            &[ColliderDef::new(
                vector![HALF_EXTENT, HALF_EXTENT],
                category::ITEM,
                category::PLAYER,
                Tag::ItemBody,
            )
            .sensor()],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Flower
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn is_alive(&self) -> bool {
        !self.collected
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
                dispatcher.entity_to_entity(self.entity_id, player, Event::GrantFirePower);
            }
        }
    }
}

#[cfg(test)]
mod flower_tests {
    use super::*;
    use crate::constants::PhysicsConfig;

    #[test]
    fn pickup_grants_fire_power_once() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let mut dispatcher = Dispatcher::default();
        let mut flower = Flower::new(vector![0.0, 1.0]);
        flower.init(13, &mut physics);

        let touch = Message {
            sender_entity_id: Some(1),
            recipient_entity_id: Some(13),
            event: Event::TouchedByPlayer { player: 1 },
        };
        flower.handle_message(&touch, &mut physics, &mut dispatcher);
        flower.handle_message(&touch, &mut physics, &mut dispatcher);

        let grants: Vec<_> = dispatcher
            .drain()
            .into_iter()
            .filter(|m| matches!(m.event, Event::GrantFirePower))
            .collect();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].recipient_entity_id, Some(1));
        assert!(!flower.is_alive());
    }
}
