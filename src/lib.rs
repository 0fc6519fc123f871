//! Simulation core for a side-scrolling platformer: a fixed-timestep
//! physics driver over rapier2d, a sensor-based contact classifier, an
//! entity/message layer, and the player movement state machine.
//!
//! Rendering, audio and window plumbing live in the host; this crate
//! exposes [`world::World`] as the single entry point and reports
//! everything observable through [`events::Event`] notifications.

pub mod constants;
pub mod contact;
pub mod entities;
pub mod entity;
pub mod events;
pub mod input;
pub mod physics;
pub mod world;
