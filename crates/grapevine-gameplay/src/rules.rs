//! Tunable gameplay constants.

use grapevine_common::{ConfigError, ConfigResult, Extent, ScreenRect};
use serde::{Deserialize, Serialize};

/// Numbers that drive the action state machine and the combat resolver.
///
/// Durations are in frames. Defaults reproduce the prototype's feel at 30 Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Horizontal reach of the "near" box (exclusive)
    pub near_x: u32,
    /// Vertical reach of the "near" box (exclusive)
    pub near_y: u32,
    /// Damage of an unblocked hit
    pub strike_damage: i32,
    /// Damage of a blocked hit
    pub blocked_damage: i32,
    /// Length of an attack window
    pub attack_ticks: i64,
    /// Length of a jump, apex at the midpoint
    pub jump_ticks: i64,
    /// Vertical pixels travelled per jump frame
    pub jump_step: i32,
    /// How long an enemy keeps hold of the hero
    pub grab_ticks: i64,
    /// How long the hero stays held
    pub held_ticks: i64,
    /// Horizontal push applied when the hero breaks free
    pub release_knockback: i32,
    /// Where a grabbed hero is pinned, relative to the grabber
    pub grab_offset_x: i32,
    /// Hitbox given to newly spawned characters
    pub hitbox: Extent,
    /// Hit every overlapping frame (true) or once per swing (false)
    pub continuous_damage: bool,
    /// Area characters may walk in and get knocked back into; `None` leaves
    /// movement unbounded. Jumps are clamped by their ground position.
    pub playfield: Option<ScreenRect>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            near_x: 60,
            near_y: 30,
            strike_damage: 100,
            blocked_damage: 10,
            attack_ticks: 20,
            jump_ticks: 60,
            jump_step: 3,
            grab_ticks: 60,
            held_ticks: 60,
            release_knockback: 40,
            grab_offset_x: 30,
            hitbox: Extent::default(),
            continuous_damage: true,
            playfield: None,
        }
    }
}

impl GameRules {
    /// Frame of a jump at which the character stops rising.
    #[must_use]
    pub fn jump_apex(&self) -> u32 {
        (self.jump_ticks.max(0) / 2) as u32
    }

    /// Rejects durations that would make a state end before it starts.
    pub fn validate(&self) -> ConfigResult<()> {
        let durations = [
            ("attack_ticks", self.attack_ticks),
            ("jump_ticks", self.jump_ticks),
            ("grab_ticks", self.grab_ticks),
            ("held_ticks", self.held_ticks),
        ];
        for (attribute, ticks) in durations {
            if ticks <= 0 {
                return Err(ConfigError::InvalidAttribute {
                    template: "rules".to_string(),
                    attribute,
                    reason: format!("duration must be positive, got {ticks}"),
                });
            }
        }
        Ok(())
    }

    /// Height above the take-off point after `elapsed` frames of a jump.
    #[must_use]
    pub fn jump_lift(&self, elapsed: u32) -> i32 {
        let apex = self.jump_apex();
        let rising = elapsed.min(apex) as i32;
        let falling = elapsed.saturating_sub(apex) as i32;
        rising.saturating_sub(falling).saturating_mul(self.jump_step)
    }

    /// Sets the walkable area.
    #[must_use]
    pub fn with_playfield(mut self, playfield: ScreenRect) -> Self {
        self.playfield = Some(playfield);
        self
    }

    /// Selects once-per-swing damage instead of continuous contact damage.
    #[must_use]
    pub fn with_single_hit_swings(mut self) -> Self {
        self.continuous_damage = false;
        self
    }
}
