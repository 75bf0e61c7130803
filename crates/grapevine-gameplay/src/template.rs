//! Character attribute tables.
//!
//! Enemies are spawned from named [`EnemyTemplate`]s collected in a
//! [`TemplateTable`]. Heroes are spawned once each from an explicit
//! [`HeroSpec`]. Both are validated before any character is built.

use grapevine_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Fixed attribute table for an enemy archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Template name; instances are called `"{name} {n}"`
    pub name: String,
    /// Sprite file prefix (e.g. `shit_clown`)
    pub image_prefix: String,
    /// Experience level
    pub level: u32,
    /// Walking speed in pixels per frame
    pub speed: i32,
    /// Starting hit points
    pub hp: i32,
    /// Stamina pool
    pub stamina: i32,
    /// Fear rating
    pub fear: i32,
}

impl EnemyTemplate {
    /// The Jack Scrapper brawler.
    #[must_use]
    pub fn jack_scrapper() -> Self {
        Self {
            name: "Jack Scrapper".to_string(),
            image_prefix: "jack_scrapper".to_string(),
            level: 1,
            speed: 4,
            hp: 2000,
            stamina: 15,
            fear: 85,
        }
    }

    /// The Shit Clown grunt.
    #[must_use]
    pub fn shit_clown() -> Self {
        Self {
            name: "Shit Clown".to_string(),
            image_prefix: "shit_clown".to_string(),
            level: 1,
            speed: 4,
            hp: 1000,
            stamina: 10,
            fear: 90,
        }
    }

    /// Checks that every attribute is present and in range.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_attributes(
            &self.name,
            &self.image_prefix,
            self.level,
            self.speed,
            self.hp,
        )
    }
}

/// Explicit attribute list for a playable hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSpec {
    /// Display name
    pub name: String,
    /// Sprite file prefix (e.g. `boonrit`)
    pub image_prefix: String,
    /// Experience level
    pub level: u32,
    /// Walking speed in pixels per frame
    pub speed: i32,
    /// Starting hit points
    pub hp: i32,
    /// Stamina pool
    pub stamina: i32,
    /// Fear rating
    pub fear: i32,
}

impl HeroSpec {
    /// A hero with the standard starting attributes.
    ///
    /// The sprite prefix is the lowercased name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image_prefix: name.to_lowercase(),
            level: 1,
            speed: 3,
            hp: 10_000,
            stamina: 50,
            fear: 20,
        }
    }

    /// Boonrit, the default playable hero.
    #[must_use]
    pub fn boonrit() -> Self {
        Self::named("Boonrit")
    }

    /// Checks that every attribute is present and in range.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_attributes(
            &self.name,
            &self.image_prefix,
            self.level,
            self.speed,
            self.hp,
        )
    }
}

fn validate_attributes(
    name: &str,
    image_prefix: &str,
    level: u32,
    speed: i32,
    hp: i32,
) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::MissingAttribute {
            template: name.to_string(),
            attribute: "name",
        });
    }
    if image_prefix.trim().is_empty() {
        return Err(ConfigError::MissingAttribute {
            template: name.to_string(),
            attribute: "image_prefix",
        });
    }
    if level == 0 {
        return Err(ConfigError::InvalidAttribute {
            template: name.to_string(),
            attribute: "level",
            reason: "must be at least 1".to_string(),
        });
    }
    if speed < 0 {
        return Err(ConfigError::InvalidAttribute {
            template: name.to_string(),
            attribute: "speed",
            reason: format!("{speed} is negative"),
        });
    }
    if hp <= 0 {
        return Err(ConfigError::InvalidAttribute {
            template: name.to_string(),
            attribute: "hp",
            reason: format!("{hp} leaves the character dead on arrival"),
        });
    }
    Ok(())
}

/// Registry of enemy templates, looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTable {
    templates: Vec<EnemyTemplate>,
}

impl TemplateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the built-in archetypes.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: vec![EnemyTemplate::jack_scrapper(), EnemyTemplate::shit_clown()],
        }
    }

    /// Builds a table, validating every entry.
    pub fn from_templates<I>(templates: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = EnemyTemplate>,
    {
        let mut table = Self::new();
        for template in templates {
            table.register(template)?;
        }
        Ok(table)
    }

    /// Validates and adds a template.
    pub fn register(&mut self, template: EnemyTemplate) -> ConfigResult<()> {
        template.validate()?;
        if self.templates.iter().any(|t| t.name == template.name) {
            return Err(ConfigError::DuplicateTemplate(template.name));
        }
        self.templates.push(template);
        Ok(())
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> ConfigResult<&EnemyTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::UnknownTemplate(name.to_string()))
    }

    /// Template names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
