use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    East,
    West,
}

impl Direction {
    pub fn invert(&self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn sign(&self) -> f32 {
        match self {
            Direction::East => 1.0,
            Direction::West => -1.0,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Defeat lifecycle shared by the enemies: a defeated enemy stops
/// colliding, lingers for a short corpse period (for the host's death
/// animation) and is then reaped. Also tracks the damage cooldown that
/// keeps one brush with the player from inflicting damage every
/// classifier verdict.
pub struct DefeatState {
    defeated: bool,
    corpse_remaining: f32,
    damage_cooldown: f32,
}

impl DefeatState {
    const CORPSE_DURATION: f32 = 0.5;
    const DAMAGE_COOLDOWN: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            defeated: false,
            corpse_remaining: 0.0,
            damage_cooldown: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.damage_cooldown > 0.0 {
            self.damage_cooldown = (self.damage_cooldown - dt).max(0.0);
        }
        if self.defeated && self.corpse_remaining > 0.0 {
            self.corpse_remaining -= dt;
        }
    }

    pub fn defeated(&self) -> bool {
        self.defeated
    }

    pub fn alive(&self) -> bool {
        !self.defeated || self.corpse_remaining > 0.0
    }

    /// Mark the enemy defeated and stop its colliders interacting with
    /// anything, leaving the entity to linger out its corpse period.
    pub fn defeat(&mut self, body: Option<RigidBodyHandle>, physics: &mut PhysicsWorld) {
        if self.defeated {
            return;
        }
        self.defeated = true;
        self.corpse_remaining = Self::CORPSE_DURATION;
        if let Some(body) = body {
            for collider in physics.colliders_of(body) {
                mute_collider(collider, physics);
            }
        }
    }

    /// True when the enemy may inflict damage; arms the cooldown.
    pub fn try_inflict_damage(&mut self) -> bool {
        if self.defeated || self.damage_cooldown > 0.0 {
            return false;
        }
        self.damage_cooldown = Self::DAMAGE_COOLDOWN;
        true
    }
}

/// Queue a recategorization that empties a collider's interaction mask.
pub fn mute_collider(collider: ColliderHandle, physics: &mut PhysicsWorld) {
    let category = physics.collider_info(collider).map(|info| info.category);
    if let Some(category) = category {
        physics.queue_recategorize(collider, category, 0);
    }
}
