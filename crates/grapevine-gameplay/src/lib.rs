//! # Grapevine Gameplay
//!
//! Gameplay core for the Grapevine brawler.
//!
//! This crate holds every rule of the fight and nothing about pixels:
//! - Characters (heroes and template-spawned enemies)
//! - Tick-based cooldowns and the per-frame action state machine
//! - Proximity, grab and damage resolution
//! - Roster and spawn registry
//! - Input snapshots and key bindings
//! - Cosmetic appearance state for the presentation layer
//! - Event bus for combat and roster events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod action;
pub mod appearance;
pub mod character;
pub mod combat;
pub mod cooldown;
pub mod events;
pub mod input;
pub mod roster;
pub mod rules;
pub mod template;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::*;
    pub use crate::appearance::*;
    pub use crate::character::*;
    pub use crate::combat::*;
    pub use crate::cooldown::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::roster::*;
    pub use crate::rules::*;
    pub use crate::template::*;
}

pub use prelude::*;
