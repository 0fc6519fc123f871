use rapier2d::prelude::{Real, Vector};

use crate::entities::player::PlayerStatus;
use crate::entity::EntityClass;

/// Payloads carried by [`Message`]s between the classifier, entities and
/// the world, and surfaced to the host through [`crate::world::World::poll_events`].
#[derive(Debug, Clone)]
pub enum Event {
    // ------------------------------------------------------------------
    // Classifier verdicts, routed to the named entity.
    /// The sender landed on this entity from above.
    StompedFromAbove { by: u32 },

    /// The sender touched this entity laterally or from below.
    SideContact { with: u32 },

    /// A head-bonk on this block from the player below.
    HitFromBelow { power: bool },

    /// A sliding shell ran into this entity.
    HitByShell { shell: u32 },

    /// The player overlapped this item.
    TouchedByPlayer { player: u32 },

    /// The player stomped an enemy and should bounce off it.
    BouncedOnEnemy { enemy: u32 },

    // ------------------------------------------------------------------
    // Entity-to-entity requests.
    /// The recipient takes one hit of damage.
    InflictDamage,

    /// The recipient collects one coin.
    CollectCoin,

    /// The recipient powers up.
    GrantPower,

    /// The recipient gains fire power (and base power with it).
    GrantFirePower,

    /// The recipient becomes invincible for the star's duration.
    GrantInvincibility,

    // ------------------------------------------------------------------
    // Global notifications; the world consumes some of these and hands
    // the rest to the host for audio, particles and scoring displays.
    /// Request to add an entity to the world next tick.
    SpawnEntity {
        class: EntityClass,
        position: Vector<Real>,
    },

    Jumped,
    WallJumped,
    Landed,
    Dashed,
    StompedEnemy { enemy: u32 },
    EnemyDefeated { enemy: u32 },
    ShellKicked { shell: u32 },
    TookDamage { lives_remaining: u32 },
    BlockBounced { block: u32 },
    BlockBroken { position: Vector<Real> },
    CoinCollected { total: u32 },
    PowerUpCollected,
    StarCollected,
    ExtraLife { lives: u32 },
    PlayerDied,
    PlayerStatusChanged { status: PlayerStatus },
}

/// A Message to be routed to an Entity instance, or to the world itself.
#[derive(Debug, Clone)]
pub struct Message {
    /// The entity that sent this message; None if the world sent it.
    pub sender_entity_id: Option<u32>,

    /// The entity to which to route this Message; None routes it to the
    /// world's global handler.
    pub recipient_entity_id: Option<u32>,

    /// The event payload describing whatever happened.
    pub event: Event,
}

impl Message {
    fn new(sender: Option<u32>, recipient: Option<u32>, event: Event) -> Self {
        Message {
            sender_entity_id: sender,
            recipient_entity_id: recipient,
            event,
        }
    }
}

#[derive(Default)]
pub struct Dispatcher {
    messages: Vec<Message>,
}

impl Dispatcher {
    pub fn entity_to_global(&mut self, sender: u32, event: Event) {
        self.messages.push(Message::new(Some(sender), None, event));
    }

    pub fn entity_to_entity(&mut self, sender: u32, recipient: u32, event: Event) {
        self.messages
            .push(Message::new(Some(sender), Some(recipient), event));
    }

    pub fn global_to_entity(&mut self, recipient: u32, event: Event) {
        self.messages
            .push(Message::new(None, Some(recipient), event));
    }

    pub fn broadcast(&mut self, event: Event) {
        self.messages.push(Message::new(None, None, event));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the current message buffer, and clears it.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}
