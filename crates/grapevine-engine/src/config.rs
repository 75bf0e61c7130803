//! Game configuration.
//!
//! Window and frame-rate settings, gameplay rules, enemy templates, heroes
//! and the initial spawn groups. Loaded from and saved to a TOML file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use grapevine_common::{ConfigError, Extent, ScreenPos, ScreenRect};
use grapevine_gameplay::{EnemyTemplate, GameRules, HeroSpec, KeyBindings, TemplateTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "grapevine.toml";

/// Errors that can occur while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// Failed to read or write the file
    #[error("Failed to access config file: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed but inconsistent
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// Result type for configuration loading.
pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

/// A hero and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroEntry {
    /// Attribute list
    #[serde(flatten)]
    pub spec: HeroSpec,
    /// Starting x
    pub x: i32,
    /// Starting y
    pub y: i32,
}

impl HeroEntry {
    /// Starting position.
    #[must_use]
    pub const fn position(&self) -> ScreenPos {
        ScreenPos::new(self.x, self.y)
    }
}

/// A batch of enemies placed at random inside a rectangle when the session
/// starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Template to spawn from
    pub template: String,
    /// How many to spawn
    pub count: u32,
    /// Lowest x (inclusive)
    pub x_min: i32,
    /// Highest x (exclusive)
    pub x_max: i32,
    /// Lowest y (inclusive)
    pub y_min: i32,
    /// Highest y (exclusive)
    pub y_max: i32,
}

impl SpawnGroup {
    /// Picks a position inside the group's rectangle.
    pub fn pick(&self, rng: &mut fastrand::Rng) -> ScreenPos {
        ScreenPos::new(rng.i32(self.x_min..self.x_max), rng.i32(self.y_min..self.y_max))
    }

    fn validate(&self, templates: &TemplateTable) -> Result<(), ConfigError> {
        templates.get(&self.template)?;
        if self.x_min >= self.x_max {
            return Err(ConfigError::InvalidAttribute {
                template: self.template.clone(),
                attribute: "x_min",
                reason: format!("spawn range {}..{} is empty", self.x_min, self.x_max),
            });
        }
        if self.y_min >= self.y_max {
            return Err(ConfigError::InvalidAttribute {
                template: self.template.clone(),
                attribute: "y_min",
                reason: format!("spawn range {}..{} is empty", self.y_min, self.y_max),
            });
        }
        Ok(())
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Frames per second the driver aims for
    pub framerate_hz: u32,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Strip along the right and bottom edges that characters cannot enter
    pub playfield_margin: u32,
    /// Keep walking and knock-backs inside the playable area
    pub clamp_to_playfield: bool,
    /// Directory holding character sprites
    pub sprite_dir: PathBuf,
    /// Sprites kept in memory before the least recently used is evicted
    pub sprite_cache_capacity: usize,
    /// Seed for spawn placement; `None` picks one at random
    pub spawn_seed: Option<u64>,
    /// Hero driven by the keyboard; `None` means the first hero
    pub active_hero: Option<String>,
    /// Keys the host maps to actions
    pub key_bindings: KeyBindings,
    /// Gameplay constants
    pub rules: GameRules,
    /// Enemy archetypes
    pub templates: Vec<EnemyTemplate>,
    /// Heroes spawned at start
    pub heroes: Vec<HeroEntry>,
    /// Enemies spawned at start
    pub spawns: Vec<SpawnGroup>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            framerate_hz: 30,
            window_width: 800,
            window_height: 500,
            playfield_margin: 100,
            clamp_to_playfield: true,
            sprite_dir: PathBuf::from("res/img/chars"),
            sprite_cache_capacity: 64,
            spawn_seed: None,
            active_hero: None,
            key_bindings: KeyBindings::default(),
            rules: GameRules::default(),
            templates: vec![EnemyTemplate::jack_scrapper(), EnemyTemplate::shit_clown()],
            heroes: vec![HeroEntry {
                spec: HeroSpec::boonrit(),
                x: 100,
                y: 300,
            }],
            spawns: vec![SpawnGroup {
                template: "Shit Clown".to_string(),
                count: 2,
                x_min: 300,
                x_max: 400,
                y_min: 200,
                y_max: 400,
            }],
        }
    }
}

impl GameConfig {
    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read, parsed or validated is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigLoadResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigLoadResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamps numeric settings to sensible ranges and checks that templates,
    /// heroes and spawn groups are consistent.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let framerate = self.framerate_hz.clamp(1, 240);
        if framerate != self.framerate_hz {
            warn!(requested = self.framerate_hz, framerate, "Frame rate out of range, clamped");
            self.framerate_hz = framerate;
        }
        self.window_width = self.window_width.clamp(200, 7680);
        self.window_height = self.window_height.clamp(200, 4320);
        self.playfield_margin = self
            .playfield_margin
            .min(self.window_width.min(self.window_height) / 2);
        self.sprite_cache_capacity = self.sprite_cache_capacity.max(1);

        self.rules.validate()?;
        let templates = self.template_table()?;
        for hero in &self.heroes {
            hero.spec.validate()?;
        }
        if let Some(active) = &self.active_hero {
            if !self.heroes.iter().any(|hero| &hero.spec.name == active) {
                return Err(ConfigError::UnknownHero(active.clone()));
            }
        }
        for group in &self.spawns {
            group.validate(&templates)?;
        }
        Ok(())
    }

    /// Builds the template registry.
    pub fn template_table(&self) -> Result<TemplateTable, ConfigError> {
        TemplateTable::from_templates(self.templates.iter().cloned())
    }

    /// Area characters may walk in, anchored at the window origin.
    #[must_use]
    pub fn playable_area(&self) -> ScreenRect {
        ScreenRect::new(
            ScreenPos::new(0, 0),
            Extent::new(
                self.window_width.saturating_sub(self.playfield_margin),
                self.window_height.saturating_sub(self.playfield_margin),
            ),
        )
    }

    /// Gameplay rules with the playable area applied.
    #[must_use]
    pub fn effective_rules(&self) -> GameRules {
        if self.clamp_to_playfield {
            self.rules.clone().with_playfield(self.playable_area())
        } else {
            self.rules.clone()
        }
    }

    /// Random source for spawn placement.
    #[must_use]
    pub fn spawn_rng(&self) -> fastrand::Rng {
        match self.spawn_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grapevine_gameplay::{Action, KeyCode};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.framerate_hz, 30);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 500);
        assert_eq!(config.heroes[0].spec.name, "Boonrit");
        assert_eq!(config.heroes[0].position(), ScreenPos::new(100, 300));
        assert_eq!(config.spawns[0].count, 2);
    }

    #[test]
    fn test_playable_area() {
        let config = GameConfig::default();
        let area = config.playable_area();
        assert_eq!(area.extent, Extent::new(700, 400));
        assert_eq!(config.effective_rules().playfield, Some(area));

        let mut open = GameConfig::default();
        open.clamp_to_playfield = false;
        assert!(open.effective_rules().playfield.is_none());
    }

    #[test]
    fn test_config_validation_clamps() {
        let mut config = GameConfig::default();
        config.framerate_hz = 0;
        config.window_width = 10;
        config.sprite_cache_capacity = 0;

        config.validate().expect("still consistent");

        assert_eq!(config.framerate_hz, 1);
        assert_eq!(config.window_width, 200);
        assert_eq!(config.sprite_cache_capacity, 1);
        assert!(config.playfield_margin <= 100);
    }

    #[test]
    fn test_unknown_spawn_template_rejected() {
        let mut config = GameConfig::default();
        config.spawns[0].template = "Mime".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownTemplate("Mime".to_string()))
        );
    }

    #[test]
    fn test_empty_spawn_range_rejected() {
        let mut config = GameConfig::default();
        config.spawns[0].y_max = config.spawns[0].y_min;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAttribute { attribute: "y_min", .. })
        ));
    }

    #[test]
    fn test_unknown_active_hero_rejected() {
        let mut config = GameConfig::default();
        config.active_hero = Some("Kelly".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownHero("Kelly".to_string()))
        );
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let mut config = GameConfig::default();
        config.framerate_hz = 60;
        config.spawn_seed = Some(12345);
        config.rules.strike_damage = 250;
        config.key_bindings.bind(KeyCode::Space, Action::Jump);
        config.heroes.push(HeroEntry {
            spec: HeroSpec::named("Hugo"),
            x: 150,
            y: 320,
        });

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = GameConfig::load_from(&config_path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_key_bindings_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &config_path,
            r#"
[[key_bindings]]
key = "Space"
action = "Jump"

[[key_bindings]]
key = "D"
action = "Attack"
"#,
        )
        .expect("write config");

        let config = GameConfig::load_from(&config_path).expect("valid config");
        let input = config.key_bindings.snapshot([KeyCode::Space, KeyCode::D, KeyCode::Left]);
        assert!(input.is_pressed(Action::Jump));
        assert!(input.is_pressed(Action::Attack));
        assert!(!input.is_pressed(Action::MoveLeft));
    }

    #[test]
    fn test_zero_hold_rejected() {
        let mut config = GameConfig::default();
        config.rules.held_ticks = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAttribute { attribute: "held_ticks", .. })
        ));
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = GameConfig::load_from("/nonexistent/path/grapevine.toml").expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &config_path,
            r#"
framerate_hz = 60
spawn_seed = 7

[rules]
near_x = 80

[[spawns]]
template = "Jack Scrapper"
count = 1
x_min = 600
x_max = 700
y_min = 200
y_max = 400
"#,
        )
        .expect("write config");

        let config = GameConfig::load_from(&config_path).expect("valid config");
        assert_eq!(config.framerate_hz, 60);
        assert_eq!(config.rules.near_x, 80);
        assert_eq!(config.rules.near_y, 30);
        assert_eq!(config.spawns.len(), 1);
        assert_eq!(config.spawns[0].template, "Jack Scrapper");
        assert_eq!(config.heroes.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "framerate_hz = \"fast\"").expect("write config");

        let err = GameConfig::load_from(&config_path).expect_err("bad type");
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_spawn_positions_are_seeded() {
        let mut config = GameConfig::default();
        config.spawn_seed = Some(42);
        let group = &config.spawns[0];

        let mut a = config.spawn_rng();
        let mut b = config.spawn_rng();
        for _ in 0..10 {
            let pos = group.pick(&mut a);
            assert_eq!(pos, group.pick(&mut b));
            assert!((300..400).contains(&pos.x));
            assert!((200..400).contains(&pos.y));
        }
    }
}
