//! Per-frame input snapshot.
//!
//! The presentation layer samples the keyboard once per frame and hands the
//! core an [`Input`]: a set of logical actions that are currently held. Key
//! codes are mapped to actions through [`KeyBindings`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical actions a hero can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Walk left
    MoveLeft,
    /// Walk right
    MoveRight,
    /// Walk up (away from the camera)
    MoveUp,
    /// Walk down (towards the camera)
    MoveDown,
    /// Throw an attack
    Attack,
    /// Jump
    Jump,
    /// Guard while held
    Block,
}

impl Action {
    const fn bit(self) -> u8 {
        match self {
            Self::MoveLeft => 1 << 0,
            Self::MoveRight => 1 << 1,
            Self::MoveUp => 1 << 2,
            Self::MoveDown => 1 << 3,
            Self::Attack => 1 << 4,
            Self::Jump => 1 << 5,
            Self::Block => 1 << 6,
        }
    }
}

/// Snapshot of which actions are held during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    held: u8,
}

impl Input {
    /// A snapshot with nothing pressed.
    #[must_use]
    pub const fn idle() -> Self {
        Self { held: 0 }
    }

    /// A snapshot with exactly the given actions pressed.
    #[must_use]
    pub fn pressing(actions: &[Action]) -> Self {
        let mut input = Self::idle();
        for &action in actions {
            input.set(action, true);
        }
        input
    }

    /// Marks an action as held or released.
    pub fn set(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.held |= action.bit();
        } else {
            self.held &= !action.bit();
        }
    }

    /// Whether an action is held.
    #[must_use]
    pub const fn is_pressed(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    /// Whether nothing is held.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.held == 0
    }

    /// Movement direction as unit steps on each axis.
    ///
    /// Opposite directions cancel out.
    #[must_use]
    pub const fn direction(&self) -> (i32, i32) {
        let dx = self.is_pressed(Action::MoveRight) as i32 - self.is_pressed(Action::MoveLeft) as i32;
        let dy = self.is_pressed(Action::MoveDown) as i32 - self.is_pressed(Action::MoveUp) as i32;
        (dx, dy)
    }
}

/// Keyboard keys that can be bound to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Space bar
    Space,
    /// Left Shift
    LShift,
}

/// One key bound to one action, as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Physical key
    pub key: KeyCode,
    /// Action it triggers
    pub action: Action,
}

/// Mapping from keys to logical actions.
///
/// Serialized as a list of [`KeyBinding`]s sorted by key; a later entry for
/// the same key wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<KeyBinding>", into = "Vec<KeyBinding>")]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Action>,
}

impl From<Vec<KeyBinding>> for KeyBindings {
    fn from(list: Vec<KeyBinding>) -> Self {
        Self {
            bindings: list.into_iter().map(|b| (b.key, b.action)).collect(),
        }
    }
}

impl From<KeyBindings> for Vec<KeyBinding> {
    fn from(bindings: KeyBindings) -> Self {
        let mut list: Vec<KeyBinding> = bindings
            .bindings
            .into_iter()
            .map(|(key, action)| KeyBinding { key, action })
            .collect();
        list.sort_by_key(|b| b.key);
        list
    }
}

impl Default for KeyBindings {
    /// Arrows move, `D` attacks, `S` jumps and `A` blocks.
    fn default() -> Self {
        let bindings = HashMap::from([
            (KeyCode::Left, Action::MoveLeft),
            (KeyCode::Right, Action::MoveRight),
            (KeyCode::Up, Action::MoveUp),
            (KeyCode::Down, Action::MoveDown),
            (KeyCode::D, Action::Attack),
            (KeyCode::S, Action::Jump),
            (KeyCode::A, Action::Block),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Binds a key to an action, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyCode, action: Action) {
        self.bindings.insert(key, action);
    }

    /// Removes the binding for a key.
    pub fn unbind(&mut self, key: KeyCode) {
        self.bindings.remove(&key);
    }

    /// Returns the action bound to a key.
    #[must_use]
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Builds a snapshot from the keys currently held down.
    #[must_use]
    pub fn snapshot<I>(&self, held_keys: I) -> Input
    where
        I: IntoIterator<Item = KeyCode>,
    {
        let mut input = Input::idle();
        for action in held_keys.into_iter().filter_map(|key| self.action_for(key)) {
            input.set(action, true);
        }
        input
    }
}

/// Source of per-frame input snapshots.
///
/// Implemented by the presentation layer. `None` means the player asked to
/// quit (window closed).
pub trait InputSource {
    /// Samples input for the next frame.
    fn sample(&mut self) -> Option<Input>;
}
