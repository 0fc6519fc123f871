use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use rapier2d::prelude::{vector, RigidBodyHandle};

use crate::constants::{category, mask, PhysicsConfig, Tag};
use crate::contact::ContactClassifier;
use crate::entities;
use crate::entity::{Entity, EntityClass, GameStatePeek, IdVendor, WORLD_ENTITY_ID};
use crate::events::{Dispatcher, Event, Message};
use crate::input::InputState;
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

// Routing passes per drain; entities answering messages with messages
// settle well inside this.
const MAX_ROUTING_PASSES: usize = 8;

/// Owns the physics driver, the contact classifier, the dispatcher and
/// the entities, and wires them together once per frame. The host calls
/// [`World::update`] with the frame delta and input, then drains
/// [`World::poll_events`] for everything observable that happened.
pub struct World {
    physics: PhysicsWorld,
    classifier: ContactClassifier,
    dispatcher: Dispatcher,
    id_vendor: IdVendor,
    entities: HashMap<u32, Box<dyn Entity>>,
    peek: GameStatePeek,
    notifications: Vec<Event>,
    game_over: bool,
}

impl World {
    pub fn new(config: PhysicsConfig) -> Self {
        World {
            physics: PhysicsWorld::new(config),
            classifier: ContactClassifier::default(),
            dispatcher: Dispatcher::default(),
            id_vendor: IdVendor::default(),
            entities: HashMap::new(),
            peek: GameStatePeek::default(),
            notifications: Vec::new(),
            game_over: false,
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn game_state(&self) -> &GameStatePeek {
        &self.peek
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn contains_entity(&self, entity_id: u32) -> bool {
        self.entities.contains_key(&entity_id)
    }

    /// Interpolation factor for rendering between fixed steps.
    pub fn interpolation_alpha(&self) -> f32 {
        self.physics.interpolation_alpha()
    }

    // ------------------------------------------------------------------
    // Construction

    pub fn spawn(&mut self, mut entity: Box<dyn Entity>) -> u32 {
        let entity_id = self.id_vendor.next_id();
        entity.init(entity_id, &mut self.physics);
        if entity.entity_class() == EntityClass::Player {
            self.peek.player_id = Some(entity_id);
            self.peek.player_alive = true;
        }
        debug!("spawned {:?} as entity {}", entity.entity_class(), entity_id);
        self.entities.insert(entity_id, entity);
        entity_id
    }

    pub fn add_ground_tile(&mut self, x: f32, y: f32) -> RigidBodyHandle {
        self.physics.create_body(
            WORLD_ENTITY_ID,
            BodyDef::new(BodyType::Fixed, vector![x, y]),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::GROUND,
                mask::GROUND,
                Tag::GroundTile,
            )
            .friction(0.8)],
        )
    }

    pub fn add_wall_tile(&mut self, x: f32, y: f32) -> RigidBodyHandle {
        self.physics.create_body(
            WORLD_ENTITY_ID,
            BodyDef::new(BodyType::Fixed, vector![x, y]),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::WALL,
                mask::WALL,
                Tag::WallTile,
            )],
        )
    }

    // ------------------------------------------------------------------
    // Frame

    pub fn update(&mut self, dt: Duration, input: &InputState) {
        self.classifier.set_player_power(self.peek.player_has_power);

        // Fixed physics steps; the classifier turns contacts into
        // messages as each step completes.
        self.physics
            .update(dt, &mut self.classifier, &mut self.dispatcher);
        self.route_messages();

        for entity in self.entities.values_mut() {
            entity.handle_input(input);
        }

        let ids: Vec<u32> = self.entities.keys().copied().collect();
        for entity_id in ids {
            let flags = self.classifier.flags(entity_id);
            if let Some(entity) = self.entities.get_mut(&entity_id) {
                entity.update(dt, flags, &mut self.physics, &mut self.dispatcher, &self.peek);
            }
        }
        self.route_messages();

        self.reap();
    }

    /// Drain the notifications accumulated since the last call.
    pub fn poll_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.notifications)
    }

    // ------------------------------------------------------------------
    // Message routing

    fn route_messages(&mut self) {
        for _ in 0..MAX_ROUTING_PASSES {
            if self.dispatcher.is_empty() {
                return;
            }
            for message in self.dispatcher.drain() {
                match message.recipient_entity_id {
                    Some(recipient) => self.route_to_entity(recipient, message),
                    None => self.handle_global(message),
                }
            }
        }
        if !self.dispatcher.is_empty() {
            warn!(
                "message routing did not settle after {} passes; dropping {} messages",
                MAX_ROUTING_PASSES,
                self.dispatcher.drain().len()
            );
        }
    }

    fn route_to_entity(&mut self, recipient: u32, message: Message) {
        if let Some(entity) = self.entities.get_mut(&recipient) {
            match &message.event {
                Event::StompedFromAbove { by } => {
                    entity.on_stomped_from_above(*by, &mut self.physics, &mut self.dispatcher)
                }
                Event::SideContact { with } => {
                    entity.on_side_hit(*with, &mut self.physics, &mut self.dispatcher)
                }
                Event::HitFromBelow { power } => {
                    entity.on_block_below_hit(*power, &mut self.physics, &mut self.dispatcher)
                }
                _ => entity.handle_message(&message, &mut self.physics, &mut self.dispatcher),
            }
        } else {
            debug!(
                "dropping message for removed entity {}: {:?}",
                recipient, message.event
            );
        }
    }

    fn handle_global(&mut self, message: Message) {
        match &message.event {
            Event::SpawnEntity { class, position } => {
                match entities::instantiate(*class, *position) {
                    Ok(entity) => {
                        self.spawn(entity);
                    }
                    Err(err) => warn!("spawn request failed: {}", err),
                }
            }
            Event::PlayerStatusChanged { status } => {
                self.peek.player_position = status.position;
                self.peek.player_has_power = status.has_power;
                self.peek.player_lives = status.lives;
                self.peek.player_alive = status.alive;
            }
            Event::PlayerDied => {
                self.game_over = true;
            }
            _ => {}
        }
        self.notifications.push(message.event);
    }

    fn reap(&mut self) {
        let dead: Vec<u32> = self
            .entities
            .iter()
            .filter(|(_, entity)| !entity.is_alive())
            .map(|(entity_id, _)| *entity_id)
            .collect();
        for entity_id in dead {
            if let Some(mut entity) = self.entities.remove(&entity_id) {
                entity.deactivate(&mut self.physics);
                self.classifier.remove_entity(entity_id);
                debug!("reaped entity {}", entity_id);
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------
