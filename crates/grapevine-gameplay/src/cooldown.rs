//! Tick-based cooldown timers.
//!
//! A cooldown is an `(active, remaining)` pair that gates an action or a pose
//! until its countdown reaches zero. Timers count frames, never wall time.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Longest accepted cooldown, ten minutes at 60 Hz.
///
/// Durations above this (or below zero) are treated as already expired.
pub const MAX_COOLDOWN_TICKS: i64 = 36_000;

/// Every cooldown a character can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooldownKind {
    /// Airborne after a jump input
    Jumping,
    /// Attack window (punch for enemies)
    Attacking,
    /// Being held by a grabbing enemy
    Held,
    /// Knocked to the ground
    Knockdown,
    /// Dazed and unable to act
    Stun,
    /// Holding the hero (enemies only)
    Grabbing,
    /// Guarding (timed for enemies, key-driven for heroes)
    Blocking,
}

impl CooldownKind {
    /// All kinds, in evaluation order.
    pub const ALL: [Self; 7] = [
        Self::Held,
        Self::Jumping,
        Self::Attacking,
        Self::Stun,
        Self::Knockdown,
        Self::Grabbing,
        Self::Blocking,
    ];

    /// Short lowercase label used in logs and sprite names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jumping => "jumping",
            Self::Attacking => "attacking",
            Self::Held => "held",
            Self::Knockdown => "knockdown",
            Self::Stun => "stun",
            Self::Grabbing => "grabbing",
            Self::Blocking => "blocking",
        }
    }
}

/// What happened to a cooldown during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownTick {
    /// The cooldown was not running
    Idle,
    /// Still counting down
    Running,
    /// Reached zero on this tick and was cleared
    Expired,
}

/// A countdown timer with an activity flag.
///
/// `active` is false whenever `remaining` is zero; the two never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    active: bool,
    remaining: u32,
    duration: u32,
}

impl Cooldown {
    /// An inactive cooldown with a zero timer.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            active: false,
            remaining: 0,
            duration: 0,
        }
    }

    /// Starts (or restarts) the cooldown for `ticks` frames.
    ///
    /// Negative or out-of-range durations clear the cooldown instead.
    pub fn start(&mut self, ticks: i64) {
        if ticks <= 0 || ticks > MAX_COOLDOWN_TICKS {
            if ticks != 0 {
                warn!(ticks, "Cooldown duration out of range, treating as expired");
            }
            self.clear();
            return;
        }
        let ticks = ticks as u32;
        self.active = true;
        self.remaining = ticks;
        self.duration = ticks;
    }

    /// Advances the timer by one frame.
    pub fn tick(&mut self) -> CooldownTick {
        if !self.active {
            return CooldownTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            CooldownTick::Expired
        } else {
            CooldownTick::Running
        }
    }

    /// Stops the cooldown immediately.
    pub fn clear(&mut self) {
        self.active = false;
        self.remaining = 0;
    }

    /// Whether the cooldown is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Frames left before expiry.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Length the cooldown was last started with.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Frames elapsed since the last start.
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        self.duration.saturating_sub(self.remaining)
    }
}

/// Cooldowns shared by every role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    /// Jump arc timer
    pub jumping: Cooldown,
    /// Attack window
    pub attacking: Cooldown,
    /// Held by an enemy
    pub held: Cooldown,
    /// Knocked down
    pub knockdown: Cooldown,
    /// Stunned
    pub stun: Cooldown,
}

impl Cooldowns {
    /// Returns the shared cooldown of the given kind, if it is one.
    #[must_use]
    pub fn get(&self, kind: CooldownKind) -> Option<&Cooldown> {
        match kind {
            CooldownKind::Jumping => Some(&self.jumping),
            CooldownKind::Attacking => Some(&self.attacking),
            CooldownKind::Held => Some(&self.held),
            CooldownKind::Knockdown => Some(&self.knockdown),
            CooldownKind::Stun => Some(&self.stun),
            CooldownKind::Grabbing | CooldownKind::Blocking => None,
        }
    }

    /// Mutable access to the shared cooldown of the given kind.
    pub fn get_mut(&mut self, kind: CooldownKind) -> Option<&mut Cooldown> {
        match kind {
            CooldownKind::Jumping => Some(&mut self.jumping),
            CooldownKind::Attacking => Some(&mut self.attacking),
            CooldownKind::Held => Some(&mut self.held),
            CooldownKind::Knockdown => Some(&mut self.knockdown),
            CooldownKind::Stun => Some(&mut self.stun),
            CooldownKind::Grabbing | CooldownKind::Blocking => None,
        }
    }
}
