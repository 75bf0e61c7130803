//! Sprite naming and caching.
//!
//! The gameplay core exposes an [`Appearance`]; this module turns it into a
//! sprite file name (`boonrit-attack-1.png`, `shit_clown-2.png`) and keeps
//! loaded sprites in a bounded least-recently-used cache. Decoding is left to
//! a [`SpriteLoader`] supplied by the presentation layer.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use grapevine_gameplay::{Appearance, HealthBand, Pose, StunPose};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while loading a sprite.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// No file at the resolved path
    #[error("Sprite not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the file
    #[error("Failed to read sprite: {0}")]
    Io(#[from] std::io::Error),

    /// The loader could not decode the file
    #[error("Failed to decode sprite {path}: {reason}")]
    Decode {
        /// File that failed
        path: PathBuf,
        /// Loader message
        reason: String,
    },
}

/// Result type for sprite operations.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Sprite file name for an appearance, or `None` for the dead (not drawn).
#[must_use]
pub fn sprite_name(appearance: &Appearance) -> Option<String> {
    let suffix = match appearance.pose {
        Pose::Dead => return None,
        Pose::Blocking => "block",
        Pose::Attacking => "attack-1",
        Pose::Held => "held",
        Pose::Stunned(StunPose::Held) => "held-stun",
        Pose::Stunned(StunPose::Jumping) => "jumping-stun",
        Pose::Stunned(StunPose::Knockdown) => "knockdown-stun",
        Pose::Stunned(StunPose::Plain) => "stun",
        Pose::Idle | Pose::Jumping | Pose::Knockdown | Pose::Grabbing => band_suffix(appearance.band),
    };
    Some(format!("{}-{suffix}.png", appearance.image_prefix))
}

const fn band_suffix(band: HealthBand) -> &'static str {
    match band {
        HealthBand::Critical => "1",
        HealthBand::Wounded => "2",
        HealthBand::Bruised | HealthBand::Healthy => "3",
    }
}

/// Turns a sprite path into something drawable.
pub trait SpriteLoader {
    /// Decoded sprite type
    type Sprite;

    /// Loads one sprite file.
    fn load(&mut self, path: &Path) -> SpriteResult<Self::Sprite>;
}

/// Cache hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from memory
    pub hits: u64,
    /// Lookups that went to the loader
    pub misses: u64,
    /// Sprites dropped to stay within capacity
    pub evictions: u64,
}

struct CacheEntry<T> {
    sprite: T,
    last_used: u64,
}

/// Bounded sprite cache keyed by file name, evicting the least recently
/// used entry when full.
pub struct SpriteCache<L: SpriteLoader> {
    loader: L,
    root: PathBuf,
    capacity: usize,
    entries: AHashMap<String, CacheEntry<L::Sprite>>,
    clock: u64,
    stats: CacheStats,
}

impl<L: SpriteLoader> std::fmt::Debug for SpriteCache<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteCache")
            .field("root", &self.root)
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<L: SpriteLoader> SpriteCache<L> {
    /// Creates a cache reading from `root` and holding at most `capacity`
    /// sprites (at least one).
    pub fn new(loader: L, root: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            loader,
            root: root.into(),
            capacity: capacity.max(1),
            entries: AHashMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of cached sprites.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit, miss and eviction counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether a sprite is currently cached.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Full path of a sprite file.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns a sprite by file name, loading it on a miss.
    pub fn get(&mut self, name: &str) -> SpriteResult<&L::Sprite> {
        self.clock += 1;
        let now = self.clock;

        if self.entries.contains_key(name) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let path = self.path_for(name);
            trace!(path = %path.display(), "Loading sprite");
            let sprite = self.loader.load(&path)?;
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
            self.entries.insert(
                name.to_string(),
                CacheEntry {
                    sprite,
                    last_used: now,
                },
            );
        }

        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| SpriteError::NotFound(self.root.join(name)))?;
        entry.last_used = now;
        Ok(&entry.sprite)
    }

    /// Returns the sprite for an appearance, or `None` for the dead.
    pub fn sprite_for(&mut self, appearance: &Appearance) -> SpriteResult<Option<&L::Sprite>> {
        match sprite_name(appearance) {
            Some(name) => self.get(&name).map(Some),
            None => Ok(None),
        }
    }

    /// Drops every cached sprite.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(name, _)| name.clone());
        if let Some(name) = oldest {
            debug!(sprite = %name, "Evicting sprite");
            self.entries.remove(&name);
            self.stats.evictions += 1;
        }
    }
}

/// Loader that only checks the file exists and hands back its path.
///
/// Useful for headless runs where nothing is drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLoader;

impl SpriteLoader for PathLoader {
    type Sprite = PathBuf;

    fn load(&mut self, path: &Path) -> SpriteResult<PathBuf> {
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(SpriteError::NotFound(path.to_path_buf()))
        }
    }
}
