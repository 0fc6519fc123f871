use rapier2d::prelude::{vector, Real, Vector};

/// Collision category bits. Every collider carries exactly one category
/// and a mask of the categories it interacts with; a contact is reported
/// only when both sides accept each other.
pub mod category {
    pub const GROUND: u32 = 1 << 0;
    pub const PLAYER: u32 = 1 << 1;
    pub const ENEMY: u32 = 1 << 2;
    pub const ITEM: u32 = 1 << 3;
    pub const PLAYER_FOOT: u32 = 1 << 4;
    pub const ENEMY_HEAD: u32 = 1 << 5;
    pub const PLAYER_HEAD: u32 = 1 << 6;
    pub const BLOCK: u32 = 1 << 7;
    pub const SHELL: u32 = 1 << 8;
    pub const WALL: u32 = 1 << 9;
    pub const SENSOR: u32 = 1 << 10;
    pub const PROJECTILE: u32 = 1 << 11;
}

/// Stock interaction masks for the collider kinds the entities create.
/// Kept mutually consistent: if A's mask names B's category then B's
/// mask names A's category, so pair filtering is order-independent.
pub mod mask {
    use super::category as c;

    pub const PLAYER: u32 =
        c::GROUND | c::WALL | c::BLOCK | c::ENEMY | c::ENEMY_HEAD | c::ITEM | c::SHELL;
    pub const PLAYER_FOOT: u32 = c::GROUND | c::WALL | c::BLOCK;
    pub const PLAYER_WALL_PROBE: u32 = c::GROUND | c::WALL;
    pub const PLAYER_HEAD: u32 = c::BLOCK;
    pub const ENEMY: u32 = c::GROUND | c::WALL | c::BLOCK | c::PLAYER | c::ENEMY | c::SHELL;
    pub const ENEMY_HEAD: u32 = c::PLAYER;
    pub const SHELL: u32 = c::GROUND | c::WALL | c::BLOCK | c::PLAYER | c::ENEMY;
    pub const ITEM: u32 = c::GROUND | c::WALL | c::BLOCK | c::PLAYER;
    pub const GROUND: u32 = c::PLAYER | c::PLAYER_FOOT | c::ENEMY | c::SHELL | c::ITEM;
    pub const BLOCK: u32 =
        c::PLAYER | c::PLAYER_FOOT | c::PLAYER_HEAD | c::ENEMY | c::SHELL | c::ITEM;
    pub const WALL: u32 = c::PLAYER | c::PLAYER_FOOT | c::ENEMY | c::SHELL | c::ITEM;
    pub const BLOCK_UNDERSIDE: u32 = c::PLAYER_HEAD;
}

/// Role a collider plays in contact classification. Categories say who
/// touches whom; tags say what the touch means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    GroundTile,
    WallTile,
    PlayerBody,
    PlayerFootSensor,
    PlayerLeftWallSensor,
    PlayerRightWallSensor,
    PlayerHeadSensor,
    EnemyBody,
    EnemyHeadSensor,
    BlockBody,
    BlockUndersideSensor,
    ItemBody,
}

/// Tunables for the stepping driver. `timestep` is the fixed simulation
/// interval; frame deltas above `max_frame_time` are clamped before
/// entering the accumulator, so a long stall cannot trigger an unbounded
/// burst of catch-up steps.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsConfig {
    pub gravity: Vector<Real>,
    pub timestep: f32,
    pub max_frame_time: f32,
    pub solver_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: vector![0.0, -20.0],
            timestep: 1.0 / 60.0,
            max_frame_time: 0.25,
            solver_iterations: 8,
        }
    }
}
