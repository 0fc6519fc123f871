use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::entity::{Entity, EntityClass};
use crate::events::{Dispatcher, Event};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockContent {
    Coin,
    Mushroom,
    Flower,
    Star,
}

impl BlockContent {
    pub fn entity_class(&self) -> EntityClass {
        match self {
            BlockContent::Coin => EntityClass::Coin,
            BlockContent::Mushroom => EntityClass::Mushroom,
            BlockContent::Flower => EntityClass::Flower,
            BlockContent::Star => EntityClass::Star,
        }
    }
}

/// A block that dispenses its content once when bonked from below, and
/// just bounces thereafter.
pub struct QuestionBlock {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    position: Vector<Real>,
    content: Option<BlockContent>,
}

impl QuestionBlock {
    pub fn new(position: Vector<Real>, content: BlockContent) -> Self {
        QuestionBlock {
            entity_id: 0,
            body: None,
            position,
            content: Some(content),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

impl Entity for QuestionBlock {
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld) {
        self.entity_id = entity_id;
        let body = physics.create_body(
            entity_id,
            BodyDef::new(BodyType::Fixed, self.position),
            &[
                ColliderDef::new(
                    vector![HALF_EXTENT, HALF_EXTENT],
                    category::BLOCK,
                    mask::BLOCK,
                    Tag::BlockBody,
                ),
                ColliderDef::new(
                    vector![HALF_EXTENT * 0.8, 0.1],
                    category::BLOCK,
                    mask::BLOCK_UNDERSIDE,
                    Tag::BlockUndersideSensor,
                )
                .offset(vector![0.0, -HALF_EXTENT])
                .sensor(),
            ],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::QuestionBlock
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn on_block_below_hit(
        &mut self,
        _power: bool,
        _physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        dispatcher.broadcast(Event::BlockBounced {
            block: self.entity_id,
        });
        if let Some(content) = self.content.take() {
            dispatcher.entity_to_global(
                self.entity_id,
                Event::SpawnEntity {
                    class: content.entity_class(),
                    position: self.position + vector![0.0, 2.0 * HALF_EXTENT],
                },
            );
        }
    }
}
