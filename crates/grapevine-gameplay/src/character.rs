//! Characters: heroes and template-spawned enemies.
//!
//! A [`Character`] is one record with a [`Role`] discriminant carrying the
//! role-specific state. Cooldowns common to every role live in
//! [`Cooldowns`]; enemies additionally carry timed blocking and grabbing.

use grapevine_common::{CharacterId, Extent, GrapevineError, ScreenPos, ScreenRect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::appearance::{Appearance, CharacterKind, HealthBand, Pose, StunPose};
use crate::cooldown::{Cooldown, CooldownKind, Cooldowns};
use crate::template::{EnemyTemplate, HeroSpec};

/// Error types for character operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    /// The driver ticked a character the roster should already have removed
    #[error("ticked dead character {name} ({id})")]
    TickedDead {
        /// Character id
        id: CharacterId,
        /// Display name
        name: String,
    },
    /// No character with this id on the roster
    #[error("character not found: {0}")]
    NotFound(CharacterId),
    /// The character exists but is not a hero
    #[error("character {0} is not a hero")]
    NotAHero(CharacterId),
}

/// Result type for character operations.
pub type CharacterResult<T> = Result<T, CharacterError>;

impl From<CharacterError> for GrapevineError {
    fn from(err: CharacterError) -> Self {
        Self::Invariant(err.to_string())
    }
}

/// Life cycle of a character. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Life {
    /// Taking part in the fight
    #[default]
    Alive,
    /// Awaiting removal from the roster
    Dead,
}

/// Hit points and the cosmetic stats that ride along with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Hit points, never below zero
    pub hp: i32,
    /// Stamina (tracked, unused by any rule)
    pub stamina: i32,
    /// Fear (tracked, unused by any rule)
    pub fear: i32,
    /// Experience level
    pub level: u32,
}

/// Hero-only state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroState {
    /// Block key held this frame
    pub blocking: bool,
}

/// Enemy-only state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Template the enemy was spawned from
    pub template: String,
    /// Per-template sequence number (1-based)
    pub serial: u32,
    /// Timed guard
    pub blocking: Cooldown,
    /// Timed hold on the hero
    pub grabbing: Cooldown,
}

/// Role discriminant with role-specific state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Player controlled
    Hero(HeroState),
    /// Spawned from a template
    Enemy(EnemyState),
}

/// A hero or enemy on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    name: String,
    image_prefix: String,
    role: Role,
    position: ScreenPos,
    extent: Extent,
    speed: i32,
    vitals: Vitals,
    cooldowns: Cooldowns,
    life: Life,
    /// Enemies already struck by the current swing
    swing_hits: Vec<CharacterId>,
}

impl Character {
    /// Builds a hero from an explicit attribute list.
    pub(crate) fn hero(id: CharacterId, spec: &HeroSpec, position: ScreenPos, extent: Extent) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            image_prefix: spec.image_prefix.clone(),
            role: Role::Hero(HeroState::default()),
            position,
            extent,
            speed: spec.speed,
            vitals: Vitals {
                hp: spec.hp,
                stamina: spec.stamina,
                fear: spec.fear,
                level: spec.level,
            },
            cooldowns: Cooldowns::default(),
            life: Life::Alive,
            swing_hits: Vec::new(),
        }
    }

    /// Builds an enemy from a template.
    pub(crate) fn enemy(
        id: CharacterId,
        template: &EnemyTemplate,
        serial: u32,
        position: ScreenPos,
        extent: Extent,
    ) -> Self {
        Self {
            id,
            name: format!("{} {serial}", template.name),
            image_prefix: template.image_prefix.clone(),
            role: Role::Enemy(EnemyState {
                template: template.name.clone(),
                serial,
                blocking: Cooldown::idle(),
                grabbing: Cooldown::idle(),
            }),
            position,
            extent,
            speed: template.speed,
            vitals: Vitals {
                hp: template.hp,
                stamina: template.stamina,
                fear: template.fear,
                level: template.level,
            },
            cooldowns: Cooldowns::default(),
            life: Life::Alive,
            swing_hits: Vec::new(),
        }
    }

    /// Returns the character's unique ID.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Display name (`"Shit Clown 3"`, `"Boonrit"`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sprite file prefix.
    #[must_use]
    pub fn image_prefix(&self) -> &str {
        &self.image_prefix
    }

    /// Role and role-specific state.
    #[must_use]
    pub const fn role(&self) -> &Role {
        &self.role
    }

    /// Hero or enemy.
    #[must_use]
    pub const fn kind(&self) -> CharacterKind {
        match self.role {
            Role::Hero(_) => CharacterKind::Hero,
            Role::Enemy(_) => CharacterKind::Enemy,
        }
    }

    /// Whether this is a hero.
    #[must_use]
    pub const fn is_hero(&self) -> bool {
        matches!(self.role, Role::Hero(_))
    }

    /// Template name, for enemies.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        match &self.role {
            Role::Enemy(enemy) => Some(&enemy.template),
            Role::Hero(_) => None,
        }
    }

    /// Top-left corner of the hitbox.
    #[must_use]
    pub const fn position(&self) -> ScreenPos {
        self.position
    }

    /// Teleports the character.
    pub fn set_position(&mut self, position: ScreenPos) {
        self.position = position;
    }

    /// Collision rectangle at the current position.
    #[must_use]
    pub const fn hitbox(&self) -> ScreenRect {
        ScreenRect::new(self.position, self.extent)
    }

    /// Hitbox size.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Walking speed.
    #[must_use]
    pub const fn speed(&self) -> i32 {
        self.speed
    }

    /// Hit points and cosmetic stats.
    #[must_use]
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.vitals.hp
    }

    /// Overwrites hit points, clamped at zero.
    ///
    /// Death is noticed on the character's next tick.
    pub fn set_hp(&mut self, hp: i32) {
        self.vitals.hp = hp.max(0);
    }

    /// Subtracts damage, clamping hit points at zero. Returns the new value.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.vitals.hp = self.vitals.hp.saturating_sub(amount.max(0)).max(0);
        self.vitals.hp
    }

    /// Life cycle state.
    #[must_use]
    pub const fn life(&self) -> Life {
        self.life
    }

    /// Whether the character is still fighting.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.life, Life::Alive)
    }

    /// Whether the character is waiting to be removed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self.life, Life::Dead)
    }

    pub(crate) fn mark_dead(&mut self) {
        self.life = Life::Dead;
    }

    /// Shared cooldown timers.
    #[must_use]
    pub const fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub(crate) fn cooldowns_mut(&mut self) -> &mut Cooldowns {
        &mut self.cooldowns
    }

    /// Looks up any cooldown the role carries.
    ///
    /// Heroes have no blocking timer and never grab, so those kinds return
    /// `None` for them.
    #[must_use]
    pub fn cooldown(&self, kind: CooldownKind) -> Option<&Cooldown> {
        match (kind, &self.role) {
            (CooldownKind::Blocking, Role::Enemy(enemy)) => Some(&enemy.blocking),
            (CooldownKind::Grabbing, Role::Enemy(enemy)) => Some(&enemy.grabbing),
            (CooldownKind::Blocking | CooldownKind::Grabbing, Role::Hero(_)) => None,
            (kind, _) => self.cooldowns.get(kind),
        }
    }

    /// Starts a cooldown the role carries. Returns `false` if it has none of
    /// that kind.
    ///
    /// Negative or out-of-range durations leave the cooldown expired.
    pub fn start_cooldown(&mut self, kind: CooldownKind, ticks: i64) -> bool {
        let cooldown = match (kind, &mut self.role) {
            (CooldownKind::Blocking, Role::Enemy(enemy)) => &mut enemy.blocking,
            (CooldownKind::Grabbing, Role::Enemy(enemy)) => &mut enemy.grabbing,
            (CooldownKind::Blocking | CooldownKind::Grabbing, Role::Hero(_)) => return false,
            (kind, _) => match self.cooldowns.get_mut(kind) {
                Some(cooldown) => cooldown,
                None => return false,
            },
        };
        cooldown.start(ticks);
        if kind == CooldownKind::Attacking {
            self.swing_hits.clear();
        }
        true
    }

    /// Whether the character is guarding this frame.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        match &self.role {
            Role::Hero(hero) => hero.blocking,
            Role::Enemy(enemy) => enemy.blocking.is_active(),
        }
    }

    /// Sets the hero's held-key guard. Has no effect on enemies, whose guard
    /// is timed.
    pub fn set_blocking(&mut self, blocking: bool) {
        if let Role::Hero(hero) = &mut self.role {
            hero.blocking = blocking;
        }
    }

    /// Whether the enemy is holding someone.
    #[must_use]
    pub const fn is_grabbing(&self) -> bool {
        match &self.role {
            Role::Enemy(enemy) => enemy.grabbing.is_active(),
            Role::Hero(_) => false,
        }
    }

    pub(crate) fn enemy_state_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.role {
            Role::Enemy(enemy) => Some(enemy),
            Role::Hero(_) => None,
        }
    }

    /// Free to move and start actions: not blocking, attacking, stunned or
    /// held.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        !self.is_blocking()
            && !self.cooldowns.attacking.is_active()
            && !self.cooldowns.stun.is_active()
            && !self.cooldowns.held.is_active()
    }

    /// Whether this enemy may start a grab: alive, not already grabbing, not
    /// guarding and not incapacitated.
    #[must_use]
    pub const fn can_grab(&self) -> bool {
        match &self.role {
            Role::Enemy(enemy) => {
                self.is_alive()
                    && !enemy.grabbing.is_active()
                    && !enemy.blocking.is_active()
                    && !self.cooldowns.stun.is_active()
                    && !self.cooldowns.held.is_active()
                    && !self.cooldowns.knockdown.is_active()
            },
            Role::Hero(_) => false,
        }
    }

    /// Records a hit by the current swing. Returns `false` if the target was
    /// already struck by it.
    pub(crate) fn register_swing_hit(&mut self, target: CharacterId) -> bool {
        if self.swing_hits.contains(&target) {
            return false;
        }
        self.swing_hits.push(target);
        true
    }

    pub(crate) fn end_swing(&mut self) {
        self.swing_hits.clear();
    }

    /// The dominant pose.
    ///
    /// Precedence, highest first: dead, blocking, stunned (held, jumping,
    /// knockdown or plain), attacking, grabbing, jumping, held, knockdown.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        let cds = &self.cooldowns;
        if self.is_dead() {
            Pose::Dead
        } else if self.is_blocking() {
            Pose::Blocking
        } else if cds.stun.is_active() {
            let stun = if cds.held.is_active() {
                StunPose::Held
            } else if cds.jumping.is_active() {
                StunPose::Jumping
            } else if cds.knockdown.is_active() {
                StunPose::Knockdown
            } else {
                StunPose::Plain
            };
            Pose::Stunned(stun)
        } else if cds.attacking.is_active() {
            Pose::Attacking
        } else if self.is_grabbing() {
            Pose::Grabbing
        } else if cds.jumping.is_active() {
            Pose::Jumping
        } else if cds.held.is_active() {
            Pose::Held
        } else if cds.knockdown.is_active() {
            Pose::Knockdown
        } else {
            Pose::Idle
        }
    }

    /// Cosmetic state for the presentation layer.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        Appearance {
            kind: self.kind(),
            image_prefix: self.image_prefix.clone(),
            pose: self.pose(),
            band: HealthBand::from_hp(self.vitals.hp),
        }
    }
}
