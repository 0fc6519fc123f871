use rapier2d::prelude::*;

use crate::constants::{category, Tag};
use crate::entity::{Entity, EntityClass};
use crate::events::{Dispatcher, Event, Message};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.35;

/// A floating coin; purely a sensor, collected on touch.
pub struct Coin {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    position: Vector<Real>,
    collected: bool,
}

impl Coin {
    pub fn new(position: Vector<Real>) -> Self {
        Coin {
            entity_id: 0,
            body: None,
            position,
            collected: false,
        }
    }
}

impl Entity for Coin {
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
        EntityClass::Coin
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
                dispatcher.entity_to_entity(self.entity_id, player, Event::CollectCoin);
            }
        }
    }
}
