//! Discrete cosmetic state handed to the presentation layer.
//!
//! Nothing here affects gameplay. The presentation layer maps an
//! [`Appearance`] to a sprite; the core never deals in paths or pixels.

use serde::{Deserialize, Serialize};

/// Which variant of the stun pose is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StunPose {
    /// Stunned while held
    Held,
    /// Stunned in mid-air
    Jumping,
    /// Stunned on the ground
    Knockdown,
    /// Stunned on foot
    Plain,
}

/// The visually dominant state of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    /// Standing or walking
    Idle,
    /// Lying on the ground
    Knockdown,
    /// Held by an enemy
    Held,
    /// In the air
    Jumping,
    /// Throwing an attack
    Attacking,
    /// Holding the hero
    Grabbing,
    /// Stunned, with the compound variant
    Stunned(StunPose),
    /// Guarding
    Blocking,
    /// Gone for good
    Dead,
}

/// Cosmetic health bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    /// hp ≤ 20
    Critical,
    /// 20 < hp ≤ 60
    Wounded,
    /// 60 < hp ≤ 90
    Bruised,
    /// hp > 90
    Healthy,
}

impl HealthBand {
    /// Buckets a hit point value.
    #[must_use]
    pub const fn from_hp(hp: i32) -> Self {
        if hp <= 20 {
            Self::Critical
        } else if hp <= 60 {
            Self::Wounded
        } else if hp <= 90 {
            Self::Bruised
        } else {
            Self::Healthy
        }
    }
}

/// Whether a character is a hero or an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// Player controlled
    Hero,
    /// Spawned from a template
    Enemy,
}

/// Everything the presentation layer needs to pick a sprite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Appearance {
    /// Hero or enemy
    pub kind: CharacterKind,
    /// Sprite file prefix
    pub image_prefix: String,
    /// Dominant state
    pub pose: Pose,
    /// Health bracket
    pub band: HealthBand,
}
