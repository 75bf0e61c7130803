//! Combat and roster events.
//!
//! The resolver and the roster describe what happened during a frame as
//! [`GameEvent`]s. Callers either read them from the frame report or
//! subscribe to an [`EventBus`].

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use grapevine_common::{CharacterId, ScreenPos};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Something noteworthy that happened during a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A character joined the roster
    Spawned {
        /// New character
        id: CharacterId,
        /// Display name
        name: String,
        /// Where it appeared
        position: ScreenPos,
    },
    /// An enemy got hold of a hero
    Grabbed {
        /// The grabbing enemy
        enemy: CharacterId,
        /// The held hero
        hero: CharacterId,
    },
    /// A hero broke free of a hold
    Released {
        /// The freed hero
        hero: CharacterId,
    },
    /// An attack connected
    Struck {
        /// Who attacked
        attacker: CharacterId,
        /// Who got hit
        target: CharacterId,
        /// Hit points removed
        damage: i32,
        /// Whether the target was guarding
        blocked: bool,
        /// Target hit points after the hit
        hp_left: i32,
    },
    /// A character's hit points ran out
    Died {
        /// The dead character
        id: CharacterId,
    },
    /// A dead character left the roster
    Removed {
        /// The removed character
        id: CharacterId,
        /// Display name at removal
        name: String,
    },
}

impl GameEvent {
    /// The character the event is mainly about.
    #[must_use]
    pub const fn subject(&self) -> CharacterId {
        match self {
            Self::Spawned { id, .. } | Self::Died { id } | Self::Removed { id, .. } => *id,
            Self::Grabbed { hero, .. } | Self::Released { hero } => *hero,
            Self::Struck { target, .. } => *target,
        }
    }

    /// Hit points removed by this event.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        match self {
            Self::Struck { damage, .. } => *damage,
            _ => 0,
        }
    }
}

/// Bounded channel carrying frame events to consumers on other threads.
///
/// The frame loop never blocks on a slow consumer: when the channel is full
/// the event is dropped, logged and counted in [`EventBus::dropped`].
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    capacity: usize,
    dropped: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events (at
    /// least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queues an event. Returns `false` if it was dropped because the bus is
    /// full.
    pub fn publish(&self, event: GameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event) | TrySendError::Disconnected(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(subject = %event.subject(), "Event bus full, dropping event");
                false
            }
        }
    }

    /// Queues every event of a frame, in order, and returns how many were
    /// dropped.
    pub fn publish_all<'a, I>(&self, events: I) -> usize
    where
        I: IntoIterator<Item = &'a GameEvent>,
    {
        events
            .into_iter()
            .filter(|event| !self.publish((*event).clone()))
            .count()
    }

    /// Takes every queued event.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// A receiving handle for a consumer thread. Receivers share the queue,
    /// so each event goes to exactly one of them.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.receiver.clone()
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Maximum number of queued events.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped so far because the bus was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
