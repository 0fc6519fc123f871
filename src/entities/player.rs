use std::time::Duration;

use rapier2d::prelude::*;

use crate::constants::{category, mask, Tag};
use crate::contact::ContactFlags;
use crate::entities::util::Direction;
use crate::entity::{Entity, EntityClass, GameStatePeek};
use crate::events::{Dispatcher, Event, Message};
use crate::input::{input_accumulator, Button, InputState};
use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};

// Tuning. Distances are in tiles, times in seconds; impulses are raw
// (not mass-scaled) and tuned against the default body density.
const WIDTH: f32 = 0.8;
const HEIGHT: f32 = 1.8;
const WALK_SPEED: f32 = 4.0;
const RUN_SPEED: f32 = 6.0;
const JUMP_IMPULSE: f32 = 12.0;
const WALL_JUMP_IMPULSE_X: f32 = 8.0;
const WALL_JUMP_IMPULSE_Y: f32 = 10.0;
const DASH_IMPULSE: f32 = 15.0;
const DASH_DURATION: f32 = 0.15;
const DASH_COOLDOWN: f32 = 0.5;
const COYOTE_TIME: f32 = 0.15;
const JUMP_BUFFER_TIME: f32 = 0.1;
const WALL_SLIDE_MAX_FALL_SPEED: f32 = 1.0;
const STOMP_BOUNCE_IMPULSE: f32 = 8.0;
const DEATH_HOP_IMPULSE: f32 = 8.0;
const KNOCKBACK_IMPULSE_X: f32 = 5.0;
const KNOCKBACK_IMPULSE_Y: f32 = 5.0;
const INVINCIBILITY_DURATION: f32 = 2.0;
const STAR_INVINCIBILITY_DURATION: f32 = 10.0;
const BLINK_PERIOD: f32 = 0.1;
const IDLE_SPEED_THRESHOLD: f32 = 0.1;
const STARTING_LIVES: u32 = 3;
const STOMP_SCORE: u32 = 100;
const COIN_SCORE: u32 = 100;
const POWER_UP_SCORE: u32 = 1000;
const COINS_PER_LIFE: u32 = 100;

/// The player's movement state, resolved once per frame. Earlier
/// variants take priority over later ones when several could apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementState {
    Dashing,
    WallSliding,
    Jumping,
    Falling,
    Running,
    Walking,
    Idle,
}

/// Everything the host needs to render and score the player, broadcast
/// every frame as [`Event::PlayerStatusChanged`].
#[derive(Clone, Copy, Debug)]
pub struct PlayerStatus {
    pub state: MovementState,
    pub facing: Direction,
    pub position: Vector<Real>,
    pub velocity: Vector<Real>,
    pub lives: u32,
    pub coins: u32,
    pub score: u32,
    pub has_power: bool,
    pub has_fire_power: bool,
    pub invincible: bool,
    pub visible: bool,
    pub alive: bool,
}

pub struct Player {
    entity_id: u32,
    body: Option<RigidBodyHandle>,
    spawn_position: Vector<Real>,

    state: MovementState,
    facing: Direction,
    was_grounded: bool,

    coyote_remaining: f32,
    jump_buffer_remaining: f32,
    dash_remaining: f32,
    dash_cooldown: f32,
    can_dash: bool,
    invincibility_remaining: f32,
    blink_timer: f32,
    visible: bool,

    lives: u32,
    coins: u32,
    score: u32,
    has_power: bool,
    has_fire_power: bool,
    alive: bool,

    // Input snapshot, refreshed by handle_input each frame.
    move_input: f32,
    run_held: bool,
    jump_pressed: bool,
    dash_pressed: bool,
}

impl Player {
    pub fn new(spawn_position: Vector<Real>) -> Self {
        Player {
            entity_id: 0,
            body: None,
            spawn_position,
            state: MovementState::Idle,
            facing: Direction::East,
            was_grounded: false,
            coyote_remaining: 0.0,
            jump_buffer_remaining: 0.0,
            dash_remaining: 0.0,
            dash_cooldown: 0.0,
            can_dash: true,
            invincibility_remaining: 0.0,
            blink_timer: 0.0,
            visible: true,
            lives: STARTING_LIVES,
            coins: 0,
            score: 0,
            has_power: false,
            has_fire_power: false,
            alive: true,
            move_input: 0.0,
            run_held: false,
            jump_pressed: false,
            dash_pressed: false,
        }
    }

    pub fn movement_state(&self) -> MovementState {
        self.state
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn has_power(&self) -> bool {
        self.has_power
    }

    pub fn has_fire_power(&self) -> bool {
        self.has_fire_power
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_remaining > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    pub fn status(&self, physics: &PhysicsWorld) -> PlayerStatus {
        let (position, velocity) = match self.body {
            Some(body) => (physics.position(body), physics.velocity(body)),
            None => (self.spawn_position, Vector::zeros()),
        };
        PlayerStatus {
            state: self.state,
            facing: self.facing,
            position,
            velocity,
            lives: self.lives,
            coins: self.coins,
            score: self.score,
            has_power: self.has_power,
            has_fire_power: self.has_fire_power,
            invincible: self.is_invincible(),
            visible: self.visible,
            alive: self.alive,
        }
    }

    fn jump(
        &mut self,
        body: RigidBodyHandle,
        wall_sliding: bool,
        flags: ContactFlags,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        if wall_sliding {
            // Kick away from the wall.
            let direction = if flags.left_wall { 1.0 } else { -1.0 };
            physics.set_velocity(body, Vector::zeros());
            physics.queue_impulse(
                body,
                vector![WALL_JUMP_IMPULSE_X * direction, WALL_JUMP_IMPULSE_Y],
            );
            self.facing = if direction > 0.0 {
                Direction::East
            } else {
                Direction::West
            };
            dispatcher.broadcast(Event::WallJumped);
        } else {
            // Cancel any downward velocity so buffered and coyote jumps
            // reach full height.
            let velocity = physics.velocity(body);
            physics.set_velocity(body, vector![velocity.x, 0.0]);
            physics.queue_impulse(body, vector![0.0, JUMP_IMPULSE]);
            dispatcher.broadcast(Event::Jumped);
        }
        self.coyote_remaining = 0.0;
    }

    fn start_dash(
        &mut self,
        body: RigidBodyHandle,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        self.can_dash = false;
        self.dash_remaining = DASH_DURATION;
        self.dash_cooldown = DASH_COOLDOWN;
        physics.set_velocity(body, Vector::zeros());
        physics.queue_impulse(body, vector![DASH_IMPULSE * self.facing.sign(), 0.0]);
        dispatcher.broadcast(Event::Dashed);
    }

    fn begin_invincibility(&mut self) {
        self.invincibility_remaining = INVINCIBILITY_DURATION;
        self.blink_timer = 0.0;
    }

    fn take_damage(&mut self, physics: &mut PhysicsWorld, dispatcher: &mut Dispatcher) {
        if !self.alive || self.is_invincible() {
            return;
        }

        if self.has_power {
            // Power absorbs the hit, one tier at a time.
            if self.has_fire_power {
                self.has_fire_power = false;
            } else {
                self.has_power = false;
            }
            self.begin_invincibility();
            dispatcher.broadcast(Event::TookDamage {
                lives_remaining: self.lives,
            });
            return;
        }

        self.lives -= 1;
        dispatcher.broadcast(Event::TookDamage {
            lives_remaining: self.lives,
        });

        if self.lives == 0 {
            self.die(physics, dispatcher);
        } else {
            self.begin_invincibility();
            if let Some(body) = self.body {
                physics.queue_impulse(
                    body,
                    vector![
                        KNOCKBACK_IMPULSE_X * -self.facing.sign(),
                        KNOCKBACK_IMPULSE_Y
                    ],
                );
            }
        }
    }

    fn die(&mut self, physics: &mut PhysicsWorld, dispatcher: &mut Dispatcher) {
        self.alive = false;
        self.visible = true;
        self.invincibility_remaining = 0.0;
        if let Some(body) = self.body {
            // The corpse stops interacting with the world and hops
            // offscreen under gravity.
            for collider in physics.colliders_of(body) {
                crate::entities::util::mute_collider(collider, physics);
            }
            physics.set_velocity(body, Vector::zeros());
            physics.queue_impulse(body, vector![0.0, DEATH_HOP_IMPULSE]);
        }
        dispatcher.broadcast(Event::PlayerDied);
    }
}

impl Entity for Player {
    fn init(&mut self, entity_id: u32, physics: &mut PhysicsWorld) {
        self.entity_id = entity_id;
        let half_width = WIDTH * 0.5;
        let half_height = HEIGHT * 0.5;
        let body = physics.create_body(
            entity_id,
            BodyDef::new(BodyType::Dynamic, self.spawn_position),
            &[
                ColliderDef::new(
                    vector![half_width, half_height],
                    category::PLAYER,
                    mask::PLAYER,
                    Tag::PlayerBody,
                )
                .friction(0.0),
                ColliderDef::new(
                    vector![half_width * 0.8, 0.1],
                    category::PLAYER_FOOT,
                    mask::PLAYER_FOOT,
                    Tag::PlayerFootSensor,
                )
                .offset(vector![0.0, -half_height])
                .sensor(),
                ColliderDef::new(
                    vector![half_width * 0.8, 0.1],
                    category::PLAYER_HEAD,
                    mask::PLAYER_HEAD,
                    Tag::PlayerHeadSensor,
                )
                .offset(vector![0.0, half_height])
                .sensor(),
                ColliderDef::new(
                    vector![0.1, half_height * 0.7],
                    category::PLAYER_FOOT,
                    mask::PLAYER_WALL_PROBE,
                    Tag::PlayerLeftWallSensor,
                )
                .offset(vector![-half_width, 0.0])
                .sensor(),
                ColliderDef::new(
                    vector![0.1, half_height * 0.7],
                    category::PLAYER_FOOT,
                    mask::PLAYER_WALL_PROBE,
                    Tag::PlayerRightWallSensor,
                )
                .offset(vector![half_width, 0.0])
                .sensor(),
            ],
        );
        self.body = Some(body);
    }

    fn entity_id(&self) -> u32 {
        self.entity_id
    }

    fn entity_class(&self) -> EntityClass {
        EntityClass::Player
    }

    fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    fn handle_input(&mut self, input: &InputState) {
        self.move_input = input_accumulator(
            input.button_state(Button::Left),
            input.button_state(Button::Right),
        );
        self.run_held = input.is_active(Button::Run);
        if input.was_pressed(Button::Jump) {
            self.jump_pressed = true;
        }
        if input.was_pressed(Button::Dash) {
            self.dash_pressed = true;
        }
    }

    fn update(
        &mut self,
        dt: Duration,
        flags: ContactFlags,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
        _peek: &GameStatePeek,
    ) {
        let dt = dt.as_secs_f32();
        let body = match self.body {
            Some(body) => body,
            None => return,
        };

        if self.alive {
            // --------------------------------------------------------------
            // Timers

            if self.invincibility_remaining > 0.0 {
                self.invincibility_remaining = (self.invincibility_remaining - dt).max(0.0);
                self.blink_timer += dt;
                if self.blink_timer >= BLINK_PERIOD {
                    self.blink_timer -= BLINK_PERIOD;
                    self.visible = !self.visible;
                }
                if self.invincibility_remaining == 0.0 {
                    self.visible = true;
                }
            }

            if self.dash_cooldown > 0.0 {
                self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
            }

            let grounded = flags.grounded;
            if grounded && !self.was_grounded {
                dispatcher.broadcast(Event::Landed);
            }

            if grounded {
                self.coyote_remaining = COYOTE_TIME;
            } else {
                self.coyote_remaining = (self.coyote_remaining - dt).max(0.0);
            }

            // The dash re-arms only while standing on ground with the
            // cooldown spent; a second mid-air dash is never available.
            if !self.can_dash && grounded && self.dash_cooldown == 0.0 {
                self.can_dash = true;
            }

            if self.jump_pressed {
                self.jump_buffer_remaining = JUMP_BUFFER_TIME;
            } else {
                self.jump_buffer_remaining = (self.jump_buffer_remaining - dt).max(0.0);
            }

            let mut dash_expired = false;
            if self.dash_remaining > 0.0 {
                self.dash_remaining -= dt;
                if self.dash_remaining <= 0.0 {
                    self.dash_remaining = 0.0;
                    dash_expired = true;
                    let velocity = physics.velocity(body);
                    physics.set_velocity(body, vector![velocity.x * 0.5, velocity.y]);
                }
            }

            // --------------------------------------------------------------
            // Wall slide

            let velocity = physics.velocity(body);
            let dashing = self.dash_remaining > 0.0;
            let airborne = !grounded && self.coyote_remaining == 0.0;
            let wall_sliding = airborne
                && !dashing
                && (flags.left_wall || flags.right_wall)
                && velocity.y < 0.0;
            if wall_sliding {
                if velocity.y < -WALL_SLIDE_MAX_FALL_SPEED {
                    physics.set_velocity(body, vector![velocity.x, -WALL_SLIDE_MAX_FALL_SPEED]);
                }
                self.facing = if flags.left_wall {
                    Direction::West
                } else {
                    Direction::East
                };
            }

            // --------------------------------------------------------------
            // Dash and jump

            if self.dash_pressed && self.can_dash && self.dash_cooldown == 0.0 && !dashing {
                self.start_dash(body, physics, dispatcher);
            } else if self.jump_buffer_remaining > 0.0
                && (grounded || self.coyote_remaining > 0.0 || wall_sliding)
            {
                self.jump(body, wall_sliding, flags, physics, dispatcher);
                self.jump_buffer_remaining = 0.0;
            }

            // --------------------------------------------------------------
            // Horizontal drive; suspended while dashing

            if self.dash_remaining == 0.0 {
                let max_speed = if self.run_held { RUN_SPEED } else { WALK_SPEED };
                let velocity = physics.velocity(body);
                let target = self.move_input * max_speed;
                let force = physics.mass(body) * (target - velocity.x) / physics.timestep();
                physics.queue_force(body, vector![force, 0.0]);
                // On the expiry frame the halved dash speed stands; the
                // drive force eases it down from the next step on.
                if velocity.x.abs() > max_speed && !dash_expired {
                    physics.set_velocity(
                        body,
                        vector![velocity.x.signum() * max_speed, velocity.y],
                    );
                }
                if !wall_sliding && self.move_input != 0.0 {
                    self.facing = if self.move_input < 0.0 {
                        Direction::West
                    } else {
                        Direction::East
                    };
                }
            }

            // --------------------------------------------------------------
            // Resolve movement state, highest priority first

            let velocity = physics.velocity(body);
            self.state = if self.dash_remaining > 0.0 {
                MovementState::Dashing
            } else if wall_sliding {
                MovementState::WallSliding
            } else if airborne && velocity.y > 0.0 {
                MovementState::Jumping
            } else if airborne {
                MovementState::Falling
            } else if velocity.x.abs() > IDLE_SPEED_THRESHOLD || self.move_input != 0.0 {
                if self.run_held {
                    MovementState::Running
                } else {
                    MovementState::Walking
                }
            } else {
                MovementState::Idle
            };

            self.was_grounded = grounded;
        }

        // Input snapshot is consumed whether alive or not.
        self.jump_pressed = false;
        self.dash_pressed = false;

        dispatcher.broadcast(Event::PlayerStatusChanged {
            status: self.status(physics),
        });
    }

    fn handle_message(
        &mut self,
        message: &Message,
        physics: &mut PhysicsWorld,
        dispatcher: &mut Dispatcher,
    ) {
        match &message.event {
            Event::BouncedOnEnemy { enemy } => {
                if !self.alive {
                    return;
                }
                if let Some(body) = self.body {
                    let velocity = physics.velocity(body);
                    physics.set_velocity(body, vector![velocity.x, 0.0]);
                    physics.queue_impulse(body, vector![0.0, STOMP_BOUNCE_IMPULSE]);
                }
                self.score += STOMP_SCORE;
                dispatcher.broadcast(Event::StompedEnemy { enemy: *enemy });
            }
            Event::InflictDamage => {
                self.take_damage(physics, dispatcher);
            }
            Event::CollectCoin => {
                self.coins += 1;
                self.score += COIN_SCORE;
                if self.coins % COINS_PER_LIFE == 0 {
                    self.lives += 1;
                    dispatcher.broadcast(Event::ExtraLife { lives: self.lives });
                }
                dispatcher.broadcast(Event::CoinCollected { total: self.coins });
            }
            Event::GrantPower => {
                if !self.has_power {
                    self.has_power = true;
                    self.score += POWER_UP_SCORE;
                }
                dispatcher.broadcast(Event::PowerUpCollected);
            }
            Event::GrantFirePower => {
                if !self.has_fire_power {
                    self.has_power = true;
                    self.has_fire_power = true;
                    self.score += POWER_UP_SCORE;
                }
                dispatcher.broadcast(Event::PowerUpCollected);
            }
            Event::GrantInvincibility => {
                self.invincibility_remaining = STAR_INVINCIBILITY_DURATION;
                self.blink_timer = 0.0;
                self.score += POWER_UP_SCORE;
                dispatcher.broadcast(Event::StarCollected);
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------
