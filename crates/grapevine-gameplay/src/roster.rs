//! Roster and spawn registry.
//!
//! The [`Roster`] exclusively owns every character. It spawns heroes from
//! explicit attribute lists and enemies from templates, hands out ids and
//! per-template display names, and runs the per-frame sequence: tick every
//! character, resolve combat for each hero, then purge the dead.

use ahash::AHashMap;
use grapevine_common::{CharacterId, ConfigError, ConfigResult, IdAllocator, ScreenPos};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::tick;
use crate::character::{Character, CharacterError, CharacterResult};
use crate::combat::{resolve, NearSet};
use crate::events::GameEvent;
use crate::input::Input;
use crate::rules::GameRules;
use crate::template::{HeroSpec, TemplateTable};

/// What happened during one [`Roster::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Events in the order they happened, including spawns since the last
    /// frame
    pub events: Vec<GameEvent>,
    /// Characters removed at the end of the frame
    pub removed: Vec<CharacterId>,
}

impl FrameReport {
    /// Total damage dealt during the frame.
    #[must_use]
    pub fn damage_dealt(&self) -> i32 {
        self.events.iter().map(GameEvent::damage).sum()
    }
}

/// Owner of all heroes and enemies.
#[derive(Debug)]
pub struct Roster {
    ids: IdAllocator,
    templates: TemplateTable,
    serials: AHashMap<String, u32>,
    heroes: Vec<Character>,
    enemies: Vec<Character>,
    near: AHashMap<CharacterId, NearSet>,
    active_hero: Option<CharacterId>,
    rules: GameRules,
    frame: u64,
    pending: Vec<GameEvent>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(TemplateTable::builtin(), GameRules::default())
    }
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new(templates: TemplateTable, rules: GameRules) -> Self {
        Self {
            ids: IdAllocator::new(),
            templates,
            serials: AHashMap::new(),
            heroes: Vec::new(),
            enemies: Vec::new(),
            near: AHashMap::new(),
            active_hero: None,
            rules,
            frame: 0,
            pending: Vec::new(),
        }
    }

    /// Gameplay constants in use.
    #[must_use]
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Enemy templates available to [`Roster::spawn`].
    #[must_use]
    pub const fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Adds a hero. The first hero becomes the active one.
    ///
    /// Nothing is created if the attributes are invalid or a hero with the
    /// same name is already on the roster.
    pub fn spawn_hero(&mut self, spec: &HeroSpec, position: ScreenPos) -> ConfigResult<&Character> {
        spec.validate()?;
        if self.heroes.iter().any(|hero| hero.name() == spec.name) {
            return Err(ConfigError::DuplicateHero(spec.name.clone()));
        }

        let id = self.ids.allocate();
        let hero = Character::hero(id, spec, position, self.rules.hitbox);
        info!(hero = %hero.name(), %id, x = position.x, y = position.y, "Hero spawned");
        self.record_spawn(&hero);
        self.near.insert(id, NearSet::new());
        if self.active_hero.is_none() {
            self.active_hero = Some(id);
        }

        self.heroes.push(hero);
        Ok(&self.heroes[self.heroes.len() - 1])
    }

    /// Spawns an enemy from a named template.
    ///
    /// The enemy is called `"{template} {n}"`, where `n` counts every enemy
    /// ever spawned from that template. Numbers are never reused.
    pub fn spawn(&mut self, template: &str, position: ScreenPos) -> ConfigResult<&Character> {
        let template = self.templates.get(template)?;
        let serial = self.serials.entry(template.name.clone()).or_insert(0);
        *serial += 1;

        let id = self.ids.allocate();
        let enemy = Character::enemy(id, template, *serial, position, self.rules.hitbox);
        debug!(enemy = %enemy.name(), %id, x = position.x, y = position.y, "Enemy spawned");
        self.record_spawn(&enemy);

        self.enemies.push(enemy);
        Ok(&self.enemies[self.enemies.len() - 1])
    }

    fn record_spawn(&mut self, character: &Character) {
        self.pending.push(GameEvent::Spawned {
            id: character.id(),
            name: character.name().to_string(),
            position: character.position(),
        });
    }

    /// Heroes in spawn order.
    #[must_use]
    pub fn heroes(&self) -> &[Character] {
        &self.heroes
    }

    /// Enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Character] {
        &self.enemies
    }

    /// Every character, ordered by id (spawn order). Used for draw order.
    #[must_use]
    pub fn all_characters(&self) -> Vec<&Character> {
        let mut all: Vec<&Character> = self.heroes.iter().chain(self.enemies.iter()).collect();
        all.sort_by_key(|character| character.id());
        all
    }

    /// Number of characters on the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heroes.len() + self.enemies.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty() && self.enemies.is_empty()
    }

    /// Looks up a character.
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.heroes
            .iter()
            .chain(self.enemies.iter())
            .find(|character| character.id() == id)
    }

    /// Mutable access to a character, for scripted state changes between
    /// frames.
    pub fn get_mut(&mut self, id: CharacterId) -> CharacterResult<&mut Character> {
        self.heroes
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|character| character.id() == id)
            .ok_or(CharacterError::NotFound(id))
    }

    /// The hero receiving player input.
    #[must_use]
    pub fn active_hero(&self) -> Option<&Character> {
        let id = self.active_hero?;
        self.heroes.iter().find(|hero| hero.id() == id)
    }

    /// Hands player input to another hero.
    pub fn set_active_hero(&mut self, id: CharacterId) -> CharacterResult<()> {
        if self.heroes.iter().any(|hero| hero.id() == id) {
            self.active_hero = Some(id);
            info!(%id, "Active hero changed");
            Ok(())
        } else if self.enemies.iter().any(|enemy| enemy.id() == id) {
            Err(CharacterError::NotAHero(id))
        } else {
            Err(CharacterError::NotFound(id))
        }
    }

    /// Enemies currently near a hero, as of the last resolve.
    pub fn near_enemies(&self, hero: CharacterId) -> impl Iterator<Item = &Character> + '_ {
        let near = self.near.get(&hero);
        self.enemies
            .iter()
            .filter(move |enemy| near.is_some_and(|set| set.contains(enemy.id())))
    }

    /// Runs one frame.
    ///
    /// The active hero receives `input`; every other character ticks with no
    /// input. Combat is then resolved for each living hero, and characters
    /// that died during the frame are removed at its end.
    pub fn step(&mut self, input: &Input) -> CharacterResult<FrameReport> {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            events: std::mem::take(&mut self.pending),
            removed: Vec::new(),
        };

        let idle = Input::idle();
        for hero in &mut self.heroes {
            let hero_input = if Some(hero.id()) == self.active_hero {
                input
            } else {
                &idle
            };
            let outcome = tick(hero, hero_input, &self.rules)?;
            if outcome.released {
                report.events.push(GameEvent::Released { hero: hero.id() });
            }
            if outcome.died {
                report.events.push(GameEvent::Died { id: hero.id() });
            }
        }
        for enemy in &mut self.enemies {
            if tick(enemy, &idle, &self.rules)?.died {
                report.events.push(GameEvent::Died { id: enemy.id() });
            }
        }

        for hero in self.heroes.iter_mut().filter(|hero| hero.is_alive()) {
            let near = self.near.entry(hero.id()).or_default();
            let resolution = resolve(hero, &mut self.enemies, near, &self.rules);
            report.events.extend(resolution.events);
        }

        let removed = self.purge_dead();
        report.events.extend(removed.iter().map(|(id, name)| GameEvent::Removed {
            id: *id,
            name: name.clone(),
        }));
        report.removed = removed.into_iter().map(|(id, _)| id).collect();
        Ok(report)
    }

    /// Removes every dead character from all collections. Returns the ids and
    /// names of the removed characters.
    pub fn purge_dead(&mut self) -> Vec<(CharacterId, String)> {
        let mut removed = Vec::new();
        for character in self.heroes.iter().chain(self.enemies.iter()) {
            if character.is_dead() {
                removed.push((character.id(), character.name().to_string()));
            }
        }
        if removed.is_empty() {
            return removed;
        }

        self.heroes.retain(Character::is_alive);
        self.enemies.retain(Character::is_alive);
        for (id, name) in &removed {
            self.near.remove(id);
            for set in self.near.values_mut() {
                set.remove(*id);
            }
            debug!(%id, character = %name, "Removed from roster");
        }

        if let Some(active) = self.active_hero {
            if !self.heroes.iter().any(|hero| hero.id() == active) {
                self.active_hero = self.heroes.first().map(Character::id);
                info!(active = ?self.active_hero, "Active hero fell, switching");
            }
        }
        removed
    }
}
