use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::entities::question_block::BlockContent;
use crate::entity::{Entity, EntityClass};
use crate::events::{Dispatcher, Event};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

const HALF_EXTENT: f32 = 0.5;

/// A brick that shatters when a powered-up player bonks it from below;
/// an unpowered bonk only bounces it. A brick may hide content, which
/// spawns when it breaks.
pub struct BrickBlock {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    position: Vector<Real>,
    content: Option<BlockContent>,
    broken: bool,
}

impl BrickBlock {
    pub fn new(position: Vector<Real>) -> Self {
        BrickBlock {
            entity_id: 0,
            body: None,
            position,
            content: None,
            broken: false,
        }
    }

    pub fn with_content(position: Vector<Real>, content: BlockContent) -> Self {
        BrickBlock {
            content: Some(content),
            ..BrickBlock::new(position)
        }
    }
}

impl Entity for BrickBlock {
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
        EntityClass::BrickBlock
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn is_alive(&self) -> bool {
        !self.broken
    }

    fn on_block_below_hit(
        &mut self,
        power: bool,
        _physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if self.broken {
            return;
        }
        if power {
            self.broken = true;
            dispatcher.broadcast(Event::BlockBroken {
                position: self.position,
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
        } else {
            dispatcher.broadcast(Event::BlockBounced {
                block: self.entity_id,
            });
        }
    }
}

#[cfg(test)]
mod brick_block_tests {
    use super::*;
    use crate::constants::PhysicsConfig;

    #[test]
    fn breaks_only_for_a_powered_player() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let mut dispatcher = Dispatcher::default();
        let mut brick = BrickBlock::new(vector![3.0, 4.0]);
        brick.init(11, &mut physics);

        brick.on_block_below_hit(false, &mut physics, &mut dispatcher);
        assert!(brick.is_alive());
        assert!(dispatcher
            .drain()
            .iter()
            .any(|m| matches!(m.event, Event::BlockBounced { .. })));

        brick.on_block_below_hit(true, &mut physics, &mut dispatcher);
        assert!(!brick.is_alive());
        let messages = dispatcher.drain();
        assert!(messages
            .iter()
            .any(|m| matches!(m.event, Event::BlockBroken { .. })));
        // An empty brick spawns nothing.
        assert!(messages
            .iter()
            .all(|m| !matches!(m.event, Event::SpawnEntity { .. })));
    }

    #[test]
    fn breaking_spawns_hidden_content() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let mut dispatcher = Dispatcher::default();
        let mut brick = BrickBlock::with_content(vector![3.0, 4.0], BlockContent::Star);
        brick.init(12, &mut physics);

        // Unpowered bonk: content stays hidden.
        brick.on_block_below_hit(false, &mut physics, &mut dispatcher);
        assert!(dispatcher
            .drain()
            .iter()
            .all(|m| !matches!(m.event, Event::SpawnEntity { .. })));

        brick.on_block_below_hit(true, &mut physics, &mut dispatcher);
        assert!(!brick.is_alive());
        assert!(dispatcher.drain().iter().any(|m| matches!(
            m.event,
            Event::SpawnEntity {
                class: EntityClass::Star,
                ..
            }
        )));
    }
}
