//! Proximity and combat resolution.
//!
//! [`resolve`] runs once per frame for each hero, after every character has
//! ticked. It recomputes which enemies are near the hero, lets near enemies
//! try to grab, and applies damage while the hero's attack window overlaps
//! enemy hitboxes.
//!
//! Proximity and collision are both measured against the positions the hero
//! and enemies had when the pass began; a grab that pins the hero does not
//! change what the same pass considers near or colliding.

use grapevine_common::{CharacterId, ScreenPos, ScreenRect};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::character::Character;
use crate::cooldown::CooldownKind;
use crate::events::GameEvent;
use crate::rules::GameRules;

/// Enemies currently within the near box of one hero, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearSet {
    members: Vec<CharacterId>,
}

impl NearSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an enemy is in the set.
    #[must_use]
    pub fn contains(&self, id: CharacterId) -> bool {
        self.members.contains(&id)
    }

    /// Number of near enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no enemy is near.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Near enemies in roster order.
    pub fn iter(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.members.iter().copied()
    }

    /// Drops an enemy from the set.
    pub fn remove(&mut self, id: CharacterId) {
        self.members.retain(|&member| member != id);
    }

    /// Empties the set.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    fn recompute(&mut self, hero: ScreenPos, enemies: &[Character], rules: &GameRules) {
        self.members.clear();
        self.members.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.is_alive() && within_near_box(hero, enemy.position(), rules))
                .map(Character::id),
        );
    }
}

fn within_near_box(hero: ScreenPos, enemy: ScreenPos, rules: &GameRules) -> bool {
    let (dx, dy) = hero.axis_distance(enemy);
    dx < rules.near_x && dy < rules.near_y
}

/// Whether an enemy is inside the hero's near box.
///
/// The box is axis aligned and exclusive on both axes: `|dx| < near_x` and
/// `|dy| < near_y`.
#[must_use]
pub fn is_near(hero: &Character, enemy: &Character, rules: &GameRules) -> bool {
    within_near_box(hero.position(), enemy.position(), rules)
}

/// What one resolve pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Events in the order they happened
    pub events: Vec<GameEvent>,
    /// Enemies whose hit points ran out during this pass
    pub defeated: Vec<CharacterId>,
}

impl Resolution {
    /// Total damage dealt in this pass.
    #[must_use]
    pub fn damage_dealt(&self) -> i32 {
        self.events.iter().map(GameEvent::damage).sum()
    }
}

/// Resolves proximity, grabs and damage between one hero and the enemies.
///
/// Dead enemies are skipped and never appear in `near` afterwards. A dead
/// hero resolves nothing.
pub fn resolve(
    hero: &mut Character,
    enemies: &mut [Character],
    near: &mut NearSet,
    rules: &GameRules,
) -> Resolution {
    let mut resolution = Resolution::default();
    if hero.is_dead() {
        near.clear();
        return resolution;
    }

    let hero_pos = hero.position();
    let hero_box = hero.hitbox();

    near.recompute(hero_pos, enemies, rules);
    try_grabs(hero, enemies, near, rules, &mut resolution);
    apply_strikes(hero, hero_box, enemies, rules, &mut resolution);

    for id in &resolution.defeated {
        near.remove(*id);
    }
    resolution
}

fn try_grabs(
    hero: &mut Character,
    enemies: &mut [Character],
    near: &NearSet,
    rules: &GameRules,
    resolution: &mut Resolution,
) {
    for id in near.iter() {
        if hero.cooldowns().held.is_active() {
            trace!(hero = %hero.name(), "Already held, grab skipped");
            break;
        }
        let Some(enemy) = enemies.iter_mut().find(|enemy| enemy.id() == id) else {
            continue;
        };
        if !enemy.can_grab() {
            continue;
        }

        enemy.start_cooldown(CooldownKind::Grabbing, rules.grab_ticks);
        hero.start_cooldown(CooldownKind::Held, rules.held_ticks);
        if hero.cooldowns().held.is_active() {
            hero.set_position(enemy.position().offset(rules.grab_offset_x, 0));
        }
        debug!(enemy = %enemy.name(), hero = %hero.name(), "Grabbed");
        resolution.events.push(GameEvent::Grabbed {
            enemy: enemy.id(),
            hero: hero.id(),
        });
        // One grab per pass, even if the hold never took effect.
        break;
    }
}

fn apply_strikes(
    hero: &mut Character,
    hero_box: ScreenRect,
    enemies: &mut [Character],
    rules: &GameRules,
    resolution: &mut Resolution,
) {
    if !hero.cooldowns().attacking.is_active() {
        return;
    }

    for enemy in enemies.iter_mut() {
        if !enemy.is_alive() || !hero_box.intersects(&enemy.hitbox()) {
            continue;
        }
        if !rules.continuous_damage && !hero.register_swing_hit(enemy.id()) {
            continue;
        }

        let blocked = enemy.is_blocking();
        let damage = if blocked {
            rules.blocked_damage
        } else {
            rules.strike_damage
        };
        let hp_left = enemy.apply_damage(damage);
        trace!(
            attacker = %hero.name(),
            target = %enemy.name(),
            damage,
            blocked,
            hp_left,
            "Strike"
        );
        resolution.events.push(GameEvent::Struck {
            attacker: hero.id(),
            target: enemy.id(),
            damage,
            blocked,
            hp_left,
        });

        if hp_left <= 0 {
            enemy.mark_dead();
            debug!(enemy = %enemy.name(), "Defeated");
            resolution.defeated.push(enemy.id());
            resolution.events.push(GameEvent::Died { id: enemy.id() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::{clown_at, hero_at};
    use proptest::prelude::*;

    fn pinned(mut enemy: Character) -> Character {
        // Knocked down enemies cannot grab, so the hero stays put.
        enemy.start_cooldown(CooldownKind::Knockdown, 1000);
        enemy
    }

    #[test]
    fn test_near_box_is_exclusive() {
        let rules = GameRules::default();
        let hero = hero_at(100, 300);
        assert!(is_near(&hero, &clown_at(2, 159, 329), &rules));
        assert!(!is_near(&hero, &clown_at(3, 160, 300), &rules));
        assert!(!is_near(&hero, &clown_at(4, 100, 270), &rules));
        assert!(is_near(&hero, &clown_at(5, 41, 271), &rules));
    }

    #[test]
    fn test_first_strike_scenario() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![clown_at(2, 120, 310)];
        let mut near = NearSet::new();
        hero.start_cooldown(CooldownKind::Attacking, 20);

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);

        assert_eq!(enemies[0].hp(), 900);
        assert_eq!(resolution.damage_dealt(), 100);
        assert!(near.contains(enemies[0].id()));
    }

    #[test]
    fn test_continuous_contact_damage() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![pinned(clown_at(2, 120, 310))];
        let mut near = NearSet::new();
        hero.start_cooldown(CooldownKind::Attacking, 20);

        for _ in 0..3 {
            resolve(&mut hero, &mut enemies, &mut near, &rules);
        }
        assert_eq!(enemies[0].hp(), 700);
    }

    #[test]
    fn test_blocked_contact_damage() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemy = clown_at(2, 120, 310);
        enemy.start_cooldown(CooldownKind::Blocking, 100);
        let mut enemies = vec![enemy];
        let mut near = NearSet::new();
        hero.start_cooldown(CooldownKind::Attacking, 20);

        for _ in 0..3 {
            let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);
            assert!(matches!(
                resolution.events.as_slice(),
                [GameEvent::Struck {
                    damage: 10,
                    blocked: true,
                    ..
                }]
            ));
        }
        assert_eq!(enemies[0].hp(), 970);
    }

    #[test]
    fn test_single_hit_swings() {
        let rules = GameRules::default().with_single_hit_swings();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![pinned(clown_at(2, 120, 310))];
        let mut near = NearSet::new();

        hero.start_cooldown(CooldownKind::Attacking, 20);
        for _ in 0..3 {
            resolve(&mut hero, &mut enemies, &mut near, &rules);
        }
        assert_eq!(enemies[0].hp(), 900);

        hero.start_cooldown(CooldownKind::Attacking, 20);
        resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert_eq!(enemies[0].hp(), 800);
    }

    #[test]
    fn test_no_damage_without_attack() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![pinned(clown_at(2, 120, 310))];
        let mut near = NearSet::new();

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert_eq!(resolution.damage_dealt(), 0);
        assert_eq!(enemies[0].hp(), 1000);
    }

    #[test]
    fn test_near_but_not_colliding_takes_no_damage() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![pinned(clown_at(2, 140, 300))];
        let mut near = NearSet::new();
        hero.start_cooldown(CooldownKind::Attacking, 20);

        resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert_eq!(near.len(), 1);
        assert_eq!(enemies[0].hp(), 1000);
    }

    #[test]
    fn test_killing_blow_removes_from_near_set() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemy = pinned(clown_at(2, 120, 310));
        enemy.set_hp(60);
        let mut enemies = vec![enemy];
        let mut near = NearSet::new();
        hero.start_cooldown(CooldownKind::Attacking, 20);

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert_eq!(enemies[0].hp(), 0);
        assert!(enemies[0].is_dead());
        assert_eq!(resolution.defeated, vec![enemies[0].id()]);
        assert!(near.is_empty());

        // Dead enemies are excluded from later passes.
        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert!(resolution.events.is_empty());
        assert!(near.is_empty());
    }

    #[test]
    fn test_grab_exclusivity() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![clown_at(2, 110, 300), clown_at(3, 90, 305)];
        let mut near = NearSet::new();

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);

        assert_eq!(near.len(), 2);
        assert!(hero.cooldowns().held.is_active());
        assert!(enemies[0].is_grabbing());
        assert!(!enemies[1].is_grabbing());
        assert_eq!(hero.position(), ScreenPos::new(140, 300));
        let grabs = resolution
            .events
            .iter()
            .filter(|event| matches!(event, GameEvent::Grabbed { .. }))
            .count();
        assert_eq!(grabs, 1);

        // Still held on the next pass: nobody else grabs.
        resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert!(!enemies[1].is_grabbing());
    }

    #[test]
    fn test_one_grab_per_pass_without_hold() {
        let rules = GameRules {
            held_ticks: 0,
            ..GameRules::default()
        };
        let mut hero = hero_at(100, 300);
        let mut enemies = vec![clown_at(2, 110, 300), clown_at(3, 90, 305)];
        let mut near = NearSet::new();

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);

        assert!(!hero.cooldowns().held.is_active());
        assert!(enemies[0].is_grabbing());
        assert!(!enemies[1].is_grabbing());
        let grabs = resolution
            .events
            .iter()
            .filter(|event| matches!(event, GameEvent::Grabbed { .. }))
            .count();
        assert_eq!(grabs, 1);
    }

    #[test]
    fn test_dead_hero_resolves_nothing() {
        let rules = GameRules::default();
        let mut hero = hero_at(100, 300);
        hero.mark_dead();
        let mut enemies = vec![clown_at(2, 110, 300)];
        let mut near = NearSet::new();

        let resolution = resolve(&mut hero, &mut enemies, &mut near, &rules);
        assert!(resolution.events.is_empty());
        assert!(near.is_empty());
        assert!(!enemies[0].is_grabbing());
    }

    proptest! {
        #[test]
        fn prop_near_set_tracks_positions(
            positions in proptest::collection::vec((0i32..400, 200i32..400), 1..8),
            hero_x in 0i32..400,
            hero_y in 200i32..400,
        ) {
            let rules = GameRules::default();
            let mut hero = hero_at(hero_x, hero_y);
            let mut enemies: Vec<Character> = positions
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| pinned(clown_at(i as u64 + 2, x, y)))
                .collect();
            let mut near = NearSet::new();

            resolve(&mut hero, &mut enemies, &mut near, &rules);
            for enemy in &enemies {
                let expected = enemy.position().x.abs_diff(hero_x) < 60
                    && enemy.position().y.abs_diff(hero_y) < 30;
                prop_assert_eq!(near.contains(enemy.id()), expected);
            }

            // Move everyone out of reach, then back.
            let original: Vec<ScreenPos> = enemies.iter().map(Character::position).collect();
            for enemy in &mut enemies {
                enemy.set_position(ScreenPos::new(hero_x + 60, enemy.position().y));
            }
            resolve(&mut hero, &mut enemies, &mut near, &rules);
            prop_assert!(near.is_empty());

            for (enemy, pos) in enemies.iter_mut().zip(original) {
                enemy.set_position(pos);
            }
            resolve(&mut hero, &mut enemies, &mut near, &rules);
            for enemy in &enemies {
                let expected = enemy.position().x.abs_diff(hero_x) < 60
                    && enemy.position().y.abs_diff(hero_y) < 30;
                prop_assert_eq!(near.contains(enemy.id()), expected);
            }
        }
    }
}
