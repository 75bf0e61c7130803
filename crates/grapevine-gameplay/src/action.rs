//! Per-frame character state machine.
//!
//! [`tick`] advances one character by one frame. Every cooldown decrements
//! independently; the dominant pose is derived afterwards by
//! [`Character::pose`]. Evaluation order:
//!
//! 1. held (release applies a knock-back)
//! 2. jumping (rise until the apex, then fall)
//! 3. attacking
//! 4. stun, knockdown and the enemy-only timers
//! 5. blocking follows the block input
//! 6. free characters move, attack and jump from input
//! 7. `hp <= 0` makes the character dead

use grapevine_common::ScreenPos;
use tracing::{debug, trace};

use crate::character::{Character, CharacterError, CharacterResult};
use crate::cooldown::{CooldownKind, CooldownTick};
use crate::input::{Action, Input};
use crate::rules::GameRules;

/// Transitions that happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// A hold ended and the knock-back was applied
    pub released: bool,
    /// A jump finished
    pub landed: bool,
    /// An attack window closed
    pub attack_ended: bool,
    /// The character entered the dead state
    pub died: bool,
}

/// Advances a character by one frame.
///
/// Ticking a character that is already dead is a driver bug and is reported
/// as [`CharacterError::TickedDead`].
pub fn tick(character: &mut Character, input: &Input, rules: &GameRules) -> CharacterResult<TickOutcome> {
    if character.is_dead() {
        return Err(CharacterError::TickedDead {
            id: character.id(),
            name: character.name().to_string(),
        });
    }

    let mut outcome = TickOutcome::default();

    if character.cooldowns_mut().held.tick() == CooldownTick::Expired {
        let pos = character.position().offset(rules.release_knockback, 0);
        character.set_position(keep_on_playfield(character, pos, rules));
        outcome.released = true;
        debug!(character = %character.name(), "Broke free");
    }

    advance_jump(character, rules, &mut outcome);

    if character.cooldowns_mut().attacking.tick() == CooldownTick::Expired {
        character.end_swing();
        outcome.attack_ended = true;
    }

    let cooldowns = character.cooldowns_mut();
    cooldowns.stun.tick();
    cooldowns.knockdown.tick();
    if let Some(enemy) = character.enemy_state_mut() {
        enemy.blocking.tick();
        enemy.grabbing.tick();
    }

    character.set_blocking(input.is_pressed(Action::Block));

    if character.is_free() {
        apply_free_input(character, input, rules);
    }

    if character.hp() <= 0 {
        character.mark_dead();
        outcome.died = true;
        debug!(character = %character.name(), "Died");
    }

    Ok(outcome)
}

fn advance_jump(character: &mut Character, rules: &GameRules, outcome: &mut TickOutcome) {
    let jump = &mut character.cooldowns_mut().jumping;
    if !jump.is_active() {
        return;
    }
    let frame = jump.elapsed() + 1;
    let status = jump.tick();

    let step = if frame <= rules.jump_apex() {
        -rules.jump_step
    } else {
        rules.jump_step
    };
    let pos = character.position().offset(0, step);
    character.set_position(pos);

    if status == CooldownTick::Expired {
        outcome.landed = true;
        trace!(character = %character.name(), "Landed");
    }
}

fn apply_free_input(character: &mut Character, input: &Input, rules: &GameRules) {
    let (dx, dy) = input.direction();
    if dx != 0 || dy != 0 {
        let speed = character.speed();
        let pos = character
            .position()
            .offset(dx.saturating_mul(speed), dy.saturating_mul(speed));
        character.set_position(keep_on_playfield(character, pos, rules));
    }

    if input.is_pressed(Action::Attack) {
        character.start_cooldown(CooldownKind::Attacking, rules.attack_ticks);
        trace!(character = %character.name(), "Attack started");
    }

    if input.is_pressed(Action::Jump) && !character.cooldowns().jumping.is_active() {
        character.start_cooldown(CooldownKind::Jumping, rules.jump_ticks);
        trace!(character = %character.name(), "Jump started");
    }
}

/// Clamps `pos` to the playfield by the character's ground position, so an
/// airborne character keeps its height above the ground.
fn keep_on_playfield(character: &Character, pos: ScreenPos, rules: &GameRules) -> ScreenPos {
    let Some(field) = rules.playfield else {
        return pos;
    };
    let jump = &character.cooldowns().jumping;
    let lift = if jump.is_active() {
        rules.jump_lift(jump.elapsed())
    } else {
        0
    };
    field
        .clamp_inside(pos.offset(0, lift), character.extent())
        .offset(0, -lift)
}
