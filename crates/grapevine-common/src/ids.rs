//! ID types for characters.

use serde::{Deserialize, Serialize};

/// Unique identifier for a character in a roster.
///
/// Ids are handed out by an [`IdAllocator`] owned by the roster; there is no
/// process-wide counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(u64);

impl CharacterId {
    /// Creates a character ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid character ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) character ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential allocator for [`CharacterId`]s.
///
/// Starts at 1 so that [`CharacterId::NULL`] is never produced. Ids are never
/// reused, even after the character they named is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next unused id.
    pub fn allocate(&mut self) -> CharacterId {
        let id = CharacterId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_sequential() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();

        assert!(a.is_valid());
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_null_id() {
        assert!(!CharacterId::NULL.is_valid());
        assert_eq!(CharacterId::from_raw(7).to_string(), "#7");
    }
}
