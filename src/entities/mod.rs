use anyhow::{bail, Result};
use rapier2d::prelude::{Real, Vector};

use crate::entity::{Entity, EntityClass};

pub mod brick_block;
pub mod coin;
pub mod flower;
pub mod goomba;
pub mod koopa;
pub mod mushroom;
pub mod player;
pub mod question_block;
pub mod star;
pub mod util;

/// Instantiate an entity for spawn requests. The player is built by the
/// host (it owns the spawn point and input wiring) and is not spawnable
/// here.
pub fn instantiate(class: EntityClass, position: Vector<Real>) -> Result<Box<dyn Entity>> {
    match class {
        EntityClass::Goomba => Ok(Box::new(goomba::Goomba::new(position))),
        EntityClass::Koopa => Ok(Box::new(koopa::Koopa::new(position))),
        EntityClass::BrickBlock => Ok(Box::new(brick_block::BrickBlock::new(position))),
        EntityClass::QuestionBlock => Ok(Box::new(question_block::QuestionBlock::new(
            position,
            question_block::BlockContent::Coin,
        ))),
        EntityClass::Mushroom => Ok(Box::new(mushroom::Mushroom::new(position))),
        EntityClass::Flower => Ok(Box::new(flower::Flower::new(position))),
        EntityClass::Star => Ok(Box::new(star::Star::new(position))),
        EntityClass::Coin => Ok(Box::new(coin::Coin::new(position))),
        EntityClass::Player => bail!("player is not spawnable via instantiate"),
    }
}
