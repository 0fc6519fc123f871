use std::collections::{HashMap, HashSet};

use log::debug;
use rapier2d::prelude::ColliderHandle;

use crate::constants::{category, Tag};
use crate::events::{Dispatcher, Event};
use crate::physics::{ColliderInfo, ContactEvent, ContactListener, ContactPhase, StepContext};

/// Per-entity contact snapshot, computed by the classifier and read by
/// the entities each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContactFlags {
    pub grounded: bool,
    pub left_wall: bool,
    pub right_wall: bool,
}

/// The colliders currently overlapping an entity's probe sensors. Flags
/// derive from set emptiness, so walking across adjacent tiles (one
/// contact ends while another persists) never momentarily drops a flag.
#[derive(Default)]
struct ContactState {
    ground: HashSet<ColliderHandle>,
    left_wall: HashSet<ColliderHandle>,
    right_wall: HashSet<ColliderHandle>,
}

impl ContactState {
    fn flags(&self) -> ContactFlags {
        ContactFlags {
            grounded: !self.ground.is_empty(),
            left_wall: !self.left_wall.is_empty(),
            right_wall: !self.right_wall.is_empty(),
        }
    }
}

/// Turns raw collider pair events into game meaning: grounded and
/// wall-touch flags, stomp versus side-hit verdicts, head-bonks on
/// blocks, item pickups and shell hits. Verdicts are dispatched as
/// messages to the entities involved; the classifier itself never
/// mutates the physics world.
#[derive(Default)]
pub struct ContactClassifier {
    states: HashMap<u32, ContactState>,
    player_has_power: bool,
}

impl ContactClassifier {
    /// Snapshot of the player's powered-up state, refreshed by the world
    /// before each physics update; folded into block-hit verdicts.
    pub fn set_player_power(&mut self, has_power: bool) {
        self.player_has_power = has_power;
    }

    pub fn flags(&self, entity_id: u32) -> ContactFlags {
        self.states
            .get(&entity_id)
            .map(|s| s.flags())
            .unwrap_or_default()
    }

    pub fn remove_entity(&mut self, entity_id: u32) {
        self.states.remove(&entity_id);
    }

    fn state_mut(&mut self, entity_id: u32) -> &mut ContactState {
        self.states.entry(entity_id).or_default()
    }

    /// Drop a collider handle from every probe set. Used when an End
    /// event names a collider whose metadata is already gone (removed
    /// by a mutation drained in the same step), so a stale handle can
    /// never pin a flag on.
    fn forget_collider(&mut self, handle: ColliderHandle) {
        for state in self.states.values_mut() {
            state.ground.remove(&handle);
            state.left_wall.remove(&handle);
            state.right_wall.remove(&handle);
        }
    }

    fn classify(
        &mut self,
        phase: ContactPhase,
        first: ColliderInfo,
        first_handle: ColliderHandle,
        second: ColliderInfo,
        second_handle: ColliderHandle,
        ctx: &StepContext,
        dispatcher: &mut Dispatcher,
    ) {
        match first.tag {
            Tag::PlayerFootSensor => {
                if second.category & (category::GROUND | category::WALL | category::BLOCK) != 0 {
                    let ground = &mut self.state_mut(first.entity_id).ground;
                    match phase {
                        ContactPhase::Begin => ground.insert(second_handle),
                        ContactPhase::End => ground.remove(&second_handle),
                    };
                }
            }

            Tag::PlayerLeftWallSensor | Tag::PlayerRightWallSensor => {
                if second.category & (category::GROUND | category::WALL) != 0 {
                    let state = self.state_mut(first.entity_id);
                    let set = if first.tag == Tag::PlayerLeftWallSensor {
                        &mut state.left_wall
                    } else {
                        &mut state.right_wall
                    };
                    match phase {
                        ContactPhase::Begin => set.insert(second_handle),
                        ContactPhase::End => set.remove(&second_handle),
                    };
                }
            }

            Tag::PlayerHeadSensor => {
                // A bonk counts only while the player is actually moving
                // upward into the block.
                if phase == ContactPhase::Begin
                    && second.tag == Tag::BlockUndersideSensor
                    && ctx.body_velocity(first_handle).y > 0.0
                {
                    debug!(
                        "player {} bonked block {} from below",
                        first.entity_id, second.entity_id
                    );
                    dispatcher.entity_to_entity(
                        first.entity_id,
                        second.entity_id,
                        Event::HitFromBelow {
                            power: self.player_has_power,
                        },
                    );
                }
            }

            Tag::PlayerBody => {
                if phase != ContactPhase::Begin {
                    return;
                }
                match second.tag {
                    // Stomps are decided here, on the head sensor, by the
                    // player's vertical velocity alone. Body overlap with
                    // downward velocity is the same stomp seen from the
                    // solid fixture, so it is ignored to avoid a double
                    // verdict.
                    Tag::EnemyHeadSensor => {
                        if ctx.body_velocity(first_handle).y < 0.0 {
                            debug!(
                                "player {} stomped enemy {}",
                                first.entity_id, second.entity_id
                            );
                            dispatcher.entity_to_entity(
                                first.entity_id,
                                second.entity_id,
                                Event::StompedFromAbove {
                                    by: first.entity_id,
                                },
                            );
                            dispatcher.entity_to_entity(
                                second.entity_id,
                                first.entity_id,
                                Event::BouncedOnEnemy {
                                    enemy: second.entity_id,
                                },
                            );
                        }
                    }
                    Tag::EnemyBody => {
                        if ctx.body_velocity(first_handle).y >= 0.0 {
                            dispatcher.entity_to_entity(
                                first.entity_id,
                                second.entity_id,
                                Event::SideContact {
                                    with: first.entity_id,
                                },
                            );
                        }
                    }
                    Tag::ItemBody => {
                        dispatcher.entity_to_entity(
                            first.entity_id,
                            second.entity_id,
                            Event::TouchedByPlayer {
                                player: first.entity_id,
                            },
                        );
                    }
                    _ => {}
                }
            }

            Tag::EnemyBody => {
                // A sliding shell defeats any other enemy it runs into.
                if phase == ContactPhase::Begin
                    && second.category & category::SHELL != 0
                    && second.entity_id != first.entity_id
                {
                    dispatcher.entity_to_entity(
                        second.entity_id,
                        first.entity_id,
                        Event::HitByShell {
                            shell: second.entity_id,
                        },
                    );
                }
            }

            _ => {}
        }
    }
}

impl ContactListener for ContactClassifier {
    fn handle_contacts(
        &mut self,
        events: &[ContactEvent],
        ctx: &mut StepContext,
        dispatcher: &mut Dispatcher,
    ) {
        for event in events {
            let (first, second) = match (
                ctx.collider_info(event.a).copied(),
                ctx.collider_info(event.b).copied(),
            ) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    if event.phase == ContactPhase::End {
                        self.forget_collider(event.a);
                        self.forget_collider(event.b);
                    }
                    continue;
                }
            };
            self.classify(event.phase, first, event.a, second, event.b, ctx, dispatcher);
            self.classify(event.phase, second, event.b, first, event.a, ctx, dispatcher);
        }
    }
}

// --------------------------------------------------------------------------------------------------

#[cfg(test)]
mod contact_tests {
    use super::*;
    use crate::constants::{mask, PhysicsConfig};
    use crate::events::Message;
    use crate::physics::{BodyDef, BodyType, ColliderDef, PhysicsWorld};
    use rapier2d::prelude::{vector, RigidBodyHandle};

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default())
    }

    struct NullListener;

    impl ContactListener for NullListener {
        fn handle_contacts(
            &mut self,
            _: &[ContactEvent],
            _: &mut StepContext,
            _: &mut Dispatcher,
        ) {
        }
    }

    /// One physics tick with no classification, to drain queued
    /// mutations.
    fn settle(w: &mut PhysicsWorld) {
        let mut dispatcher = Dispatcher::default();
        w.update(
            std::time::Duration::from_secs_f32(0.017),
            &mut NullListener,
            &mut dispatcher,
        );
    }

    fn player(w: &mut PhysicsWorld, id: u32) -> RigidBodyHandle {
        w.create_body(
            id,
            BodyDef::new(BodyType::Dynamic, vector![0.0, 2.0]),
            &[
                ColliderDef::new(
                    vector![0.4, 0.9],
                    category::PLAYER,
                    mask::PLAYER,
                    Tag::PlayerBody,
                ),
                ColliderDef::new(
                    vector![0.3, 0.1],
                    category::PLAYER_FOOT,
                    mask::PLAYER_FOOT,
                    Tag::PlayerFootSensor,
                )
                .offset(vector![0.0, -0.9])
                .sensor(),
                ColliderDef::new(
                    vector![0.3, 0.1],
                    category::PLAYER_HEAD,
                    mask::PLAYER_HEAD,
                    Tag::PlayerHeadSensor,
                )
                .offset(vector![0.0, 0.9])
                .sensor(),
            ],
        )
    }

    fn enemy(w: &mut PhysicsWorld, id: u32) -> RigidBodyHandle {
        w.create_body(
            id,
            BodyDef::new(BodyType::Dynamic, vector![0.0, 0.0]),
            &[
                ColliderDef::new(
                    vector![0.4, 0.4],
                    category::ENEMY,
                    mask::ENEMY,
                    Tag::EnemyBody,
                ),
                ColliderDef::new(
                    vector![0.3, 0.1],
                    category::ENEMY_HEAD,
                    category::PLAYER,
                    Tag::EnemyHeadSensor,
                )
                .offset(vector![0.0, 0.4])
                .sensor(),
            ],
        )
    }

    fn begin(a: ColliderHandle, b: ColliderHandle) -> ContactEvent {
        ContactEvent {
            a,
            b,
            phase: ContactPhase::Begin,
        }
    }

    fn end(a: ColliderHandle, b: ColliderHandle) -> ContactEvent {
        ContactEvent {
            a,
            b,
            phase: ContactPhase::End,
        }
    }

    fn run(
        w: &mut PhysicsWorld,
        classifier: &mut ContactClassifier,
        events: &[ContactEvent],
    ) -> Vec<Message> {
        let mut dispatcher = Dispatcher::default();
        w.process_contacts(events, classifier, &mut dispatcher);
        dispatcher.drain()
    }

    #[test]
    fn downward_contact_on_enemy_head_is_a_stomp() {
        let mut w = world();
        let player_body = player(&mut w, 1);
        let enemy_body = enemy(&mut w, 2);
        w.set_velocity(player_body, vector![0.0, -2.0]);

        let player_collider = w.collider_with_tag(player_body, Tag::PlayerBody).unwrap();
        let head = w.collider_with_tag(enemy_body, Tag::EnemyHeadSensor).unwrap();

        let mut classifier = ContactClassifier::default();
        let messages = run(&mut w, &mut classifier, &[begin(player_collider, head)]);

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|m| {
            m.recipient_entity_id == Some(2)
                && matches!(m.event, Event::StompedFromAbove { by: 1 })
        }));
        assert!(messages.iter().any(|m| {
            m.recipient_entity_id == Some(1) && matches!(m.event, Event::BouncedOnEnemy { enemy: 2 })
        }));
    }

    #[test]
    fn lateral_contact_with_enemy_is_a_side_hit() {
        let mut w = world();
        let player_body = player(&mut w, 1);
        let enemy_body = enemy(&mut w, 2);
        w.set_velocity(player_body, vector![3.0, 1.0]);

        let player_collider = w.collider_with_tag(player_body, Tag::PlayerBody).unwrap();
        let enemy_collider = w.collider_with_tag(enemy_body, Tag::EnemyBody).unwrap();

        let mut classifier = ContactClassifier::default();
        let messages = run(
            &mut w,
            &mut classifier,
            &[begin(player_collider, enemy_collider)],
        );

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_entity_id, Some(2));
        assert!(matches!(messages[0].event, Event::SideContact { with: 1 }));
    }

    #[test]
    fn grounded_persists_across_adjacent_tiles() {
        let mut w = world();
        let player_body = player(&mut w, 1);
        let tile_a = w.create_body(
            100,
            BodyDef::new(BodyType::Fixed, vector![0.0, 0.0]),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::GROUND,
                mask::GROUND,
                Tag::GroundTile,
            )],
        );
        let tile_b = w.create_body(
            101,
            BodyDef::new(BodyType::Fixed, vector![1.0, 0.0]),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::GROUND,
                mask::GROUND,
                Tag::GroundTile,
            )],
        );

        let foot = w
            .collider_with_tag(player_body, Tag::PlayerFootSensor)
            .unwrap();
        let ga = w.collider_with_tag(tile_a, Tag::GroundTile).unwrap();
        let gb = w.collider_with_tag(tile_b, Tag::GroundTile).unwrap();

        let mut classifier = ContactClassifier::default();
        run(&mut w, &mut classifier, &[begin(foot, ga), begin(foot, gb)]);
        assert!(classifier.flags(1).grounded);

        run(&mut w, &mut classifier, &[end(foot, ga)]);
        assert!(classifier.flags(1).grounded);

        run(&mut w, &mut classifier, &[end(foot, gb)]);
        assert!(!classifier.flags(1).grounded);
    }

    #[test]
    fn end_event_for_a_removed_collider_still_clears_the_ground_set() {
        let mut w = world();
        let player_body = player(&mut w, 1);
        let tile = w.create_body(
            100,
            BodyDef::new(BodyType::Fixed, vector![0.0, 0.0]),
            &[ColliderDef::new(
                vector![0.5, 0.5],
                category::GROUND,
                mask::GROUND,
                Tag::GroundTile,
            )],
        );

        let foot = w
            .collider_with_tag(player_body, Tag::PlayerFootSensor)
            .unwrap();
        let ground = w.collider_with_tag(tile, Tag::GroundTile).unwrap();

        let mut classifier = ContactClassifier::default();
        run(&mut w, &mut classifier, &[begin(foot, ground)]);
        assert!(classifier.flags(1).grounded);

        // The tile is removed before its End event is classified; the
        // stale handle must still leave the ground set.
        w.queue_removal(tile);
        settle(&mut w);
        assert!(w.collider_info(ground).is_none());

        run(&mut w, &mut classifier, &[end(foot, ground)]);
        assert!(!classifier.flags(1).grounded);
    }

    #[test]
    fn block_bonk_requires_upward_velocity() {
        let mut w = world();
        let player_body = player(&mut w, 1);
        let block = w.create_body(
            10,
            BodyDef::new(BodyType::Fixed, vector![0.0, 4.0]),
            &[
                ColliderDef::new(
                    vector![0.5, 0.5],
                    category::BLOCK,
                    mask::BLOCK,
                    Tag::BlockBody,
                ),
                ColliderDef::new(
                    vector![0.4, 0.1],
                    category::BLOCK,
                    mask::BLOCK_UNDERSIDE,
                    Tag::BlockUndersideSensor,
                )
                .offset(vector![0.0, -0.5])
                .sensor(),
            ],
        );

        let head = w.collider_with_tag(player_body, Tag::PlayerHeadSensor).unwrap();
        let underside = w
            .collider_with_tag(block, Tag::BlockUndersideSensor)
            .unwrap();

        let mut classifier = ContactClassifier::default();

        // Falling past the block: no bonk.
        w.set_velocity(player_body, vector![0.0, -1.0]);
        let messages = run(&mut w, &mut classifier, &[begin(head, underside)]);
        assert!(messages.is_empty());

        // Rising into it: bonk, carrying the power snapshot.
        w.set_velocity(player_body, vector![0.0, 3.0]);
        classifier.set_player_power(true);
        let messages = run(&mut w, &mut classifier, &[begin(head, underside)]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_entity_id, Some(10));
        assert!(matches!(messages[0].event, Event::HitFromBelow { power: true }));
    }

    #[test]
    fn sliding_shell_defeats_other_enemies() {
        let mut w = world();
        let goomba = enemy(&mut w, 2);
        let koopa = enemy(&mut w, 3);
        let shell_collider = w.collider_with_tag(koopa, Tag::EnemyBody).unwrap();
        w.queue_recategorize(shell_collider, category::SHELL, mask::SHELL);

        // Apply the recategorization by stepping once.
        settle(&mut w);

        let goomba_collider = w.collider_with_tag(goomba, Tag::EnemyBody).unwrap();
        let mut classifier = ContactClassifier::default();
        let messages = run(
            &mut w,
            &mut classifier,
            &[begin(goomba_collider, shell_collider)],
        );

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_entity_id, Some(2));
        assert!(matches!(messages[0].event, Event::HitByShell { shell: 3 }));
    }
}
