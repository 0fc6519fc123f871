use std::time::Duration;

use rapier2d::prelude::{Real, RigidBodyHandle, Vector};

use crate::contact::ContactFlags;
use crate::events::{Dispatcher, Message};
use crate::input::InputState;
use crate::physics::PhysicsWorld;

/// Entity id carried by static level geometry (ground and wall tiles).
pub const WORLD_ENTITY_ID: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityClass {
    Player,
    Goomba,
    Koopa,
    QuestionBlock,
    BrickBlock,
    Mushroom,
    Flower,
    Star,
    Coin,
}

/// A snapshot of the stuff entities are allowed to know about the
/// game's state, refreshed by the world once per frame.
#[derive(Clone, Copy, Debug)]
pub struct GameStatePeek {
    pub player_id: Option<u32>,
    pub player_position: Vector<Real>,
    pub player_has_power: bool,
    pub player_lives: u32,
    pub player_alive: bool,
}

impl Default for GameStatePeek {
    fn default() -> Self {
        GameStatePeek {
            player_id: None,
            player_position: Vector::zeros(),
            player_has_power: false,
            player_lives: 0,
            player_alive: false,
        }
    }
}

pub trait Entity {
    /// Create the entity's physics state. The world calls this once,
    /// with a freshly vended id, before the entity's first update.
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld);

    fn entity_id(&self) -> u32;

    fn entity_class(&self) -> EntityClass;

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        None
    }

    /// When false, the world reaps the entity at the end of the frame.
    fn is_alive(&self) -> bool {
        true
    }

    fn position(&self, physics: &PhysicsWorld) -> Vector<Real> {
        self.body_handle()
            .map(|h| physics.position(h))
            .unwrap_or_else(Vector::zeros)
    }

    fn handle_input(&mut self, _input: &InputState) {}

    fn update(
        &mut self,
        _dt: Duration,
        _flags: ContactFlags,
        _physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
        _peek: &GameStatePeek,
    ) {
    }

    // ------------------------------------------------------------------
    // Contact capability hooks. The world routes the classifier's
    // verdicts to these; an entity overrides the ones that mean
    // something to it.

    /// Another entity (normally the player) landed on this one.
    fn on_stomped_from_above(
        &mut self,
        _by: u32,
        _physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
    ) {
    }

    /// Another entity touched this one laterally or from below.
    fn on_side_hit(
        &mut self,
        _with: u32,
        _physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
    ) {
    }

    /// The player bonked this entity from underneath.
    fn on_block_below_hit(
        &mut self,
        _power: bool,
        _physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
    ) {
    }

    /// Catch-all for addressed messages that are not contact verdicts.
    fn handle_message(
        &mut self,
        _message: &Message,
        _physics: &mut PhysicsWorld,
        _dispatcher: &mut Dispatcher,
    ) {
    }

    /// Queue removal of the entity's physics state; called by the world
    /// when reaping.
    fn deactivate(&mut self, physics: &mut PhysicsWorld) {
        if let Some(handle) = self.body_handle() {
            physics.queue_removal(handle);
        }
    }
}

/// Vends unique entity ids. Id zero is reserved for level geometry.
pub struct IdVendor {
    current_id: u32,
}

impl Default for IdVendor {
    fn default() -> Self {
        IdVendor { current_id: 1 }
    }
}

impl IdVendor {
    pub fn next_id(&mut self) -> u32 {
        let id = self.current_id;
        self.current_id += 1;
        id
    }
}
