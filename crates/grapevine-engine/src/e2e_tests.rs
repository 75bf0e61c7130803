//! End-to-end tests: configuration in, frames through the session, sprites
//! and reports out.

#![cfg(test)]

use grapevine_common::ScreenPos;
use grapevine_gameplay::{Action, CooldownKind, GameEvent, Input, Pose};

use crate::config::{GameConfig, SpawnGroup};
use crate::session::{JsonLinesPresenter, RunEnd, ScriptedInput, Session};
use crate::sprites::sprite_name;
use crate::timing::Unpaced;

/// A config with the hero at (100, 300) and one clown placed exactly at
/// (`x`, `y`).
fn duel_config(x: i32, y: i32) -> GameConfig {
    let mut config = GameConfig::default();
    config.spawn_seed = Some(1);
    config.spawns = vec![SpawnGroup {
        template: "Shit Clown".to_string(),
        count: 1,
        x_min: x,
        x_max: x + 1,
        y_min: y,
        y_max: y + 1,
    }];
    config
}

mod combat_tests {
    use super::*;

    #[test]
    fn e2e_first_punch_takes_a_hundred() {
        let mut session = Session::from_config(&duel_config(120, 310)).expect("valid config");
        let clown = session.roster().enemies()[0].id();
        assert_eq!(session.roster().get(clown).expect("clown").position(), ScreenPos::new(120, 310));

        let report = session.frame(&Input::pressing(&[Action::Attack])).expect("frame");

        assert_eq!(report.damage_dealt(), 100);
        assert_eq!(session.roster().get(clown).expect("clown").hp(), 900);
    }

    #[test]
    fn e2e_grabbed_hero_breaks_free() {
        let mut session = Session::from_config(&duel_config(120, 310)).expect("valid config");
        let hero = session.roster().active_hero().expect("hero").id();

        let report = session.frame(&Input::idle()).expect("frame");
        assert!(report
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::Grabbed { .. })));
        let held = session.roster().get(hero).expect("hero");
        assert_eq!(held.position(), ScreenPos::new(150, 310));
        assert_eq!(held.pose(), Pose::Held);
        assert_eq!(sprite_name(&held.appearance()).as_deref(), Some("boonrit-held.png"));

        // Struggling does nothing while held.
        let mut released_at = None;
        for frame in 2..=61 {
            let report = session.frame(&Input::pressing(&[Action::MoveLeft])).expect("frame");
            if report.events.contains(&GameEvent::Released { hero }) {
                released_at = Some(frame);
                break;
            }
        }
        assert_eq!(released_at, Some(61));
        // Knocked back 40, then free to take one step left in the same frame.
        assert_eq!(session.roster().get(hero).expect("hero").position(), ScreenPos::new(187, 310));
    }

    #[test]
    fn e2e_blocking_clown_soaks_hits() {
        let mut session = Session::from_config(&duel_config(120, 310)).expect("valid config");
        let clown = session.roster().enemies()[0].id();
        session
            .roster_mut()
            .get_mut(clown)
            .expect("clown")
            .start_cooldown(CooldownKind::Blocking, 100);

        for _ in 0..3 {
            session.frame(&Input::pressing(&[Action::Attack])).expect("frame");
        }
        assert_eq!(session.roster().get(clown).expect("clown").hp(), 970);
    }

    #[test]
    fn e2e_clown_beaten_and_removed() {
        let mut session = Session::from_config(&duel_config(115, 300)).expect("valid config");
        let clown = session.roster().enemies()[0].id();
        session
            .roster_mut()
            .get_mut(clown)
            .expect("clown")
            .start_cooldown(CooldownKind::Stun, 1000);

        let mut source = ScriptedInput::default().then(Input::pressing(&[Action::Attack]), 15);
        let mut presenter = JsonLinesPresenter::new(Vec::new()).events_only();
        let summary = session
            .run(&mut source, &mut presenter, &mut Unpaced::default())
            .expect("run");

        assert_eq!(summary.end, RunEnd::Quit);
        assert_eq!(summary.frames, 15);
        assert_eq!(summary.damage_dealt, 1000);
        assert_eq!(summary.removed, 1);
        assert!(session.roster().enemies().is_empty());

        let log = String::from_utf8(presenter.into_inner()).expect("utf8");
        assert!(log.contains("\"Removed\""));
        assert!(log.contains("Shit Clown 1"));
    }
}

mod movement_tests {
    use super::*;

    #[test]
    fn e2e_hero_stays_in_playable_area() {
        let mut config = GameConfig::default();
        config.spawns.clear();
        let mut session = Session::from_config(&config).expect("valid config");

        let mut source = ScriptedInput::default().then(Input::pressing(&[Action::MoveRight, Action::MoveDown]), 400);
        session
            .run(&mut source, &mut JsonLinesPresenter::new(std::io::sink()), &mut Unpaced::default())
            .expect("run");

        let hero = session.roster().active_hero().expect("hero");
        assert_eq!(hero.position(), ScreenPos::new(700 - 30, 400 - 20));
    }

    #[test]
    fn e2e_jump_arc_lands() {
        let mut config = GameConfig::default();
        config.spawns.clear();
        let mut session = Session::from_config(&config).expect("valid config");

        session.frame(&Input::pressing(&[Action::Jump])).expect("frame");
        session.frame(&Input::idle()).expect("frame");
        let hero = session.roster().active_hero().expect("hero");
        assert_eq!(hero.pose(), Pose::Jumping);
        assert_eq!(hero.position().y, 297);

        for _ in 0..59 {
            session.frame(&Input::idle()).expect("frame");
        }
        let hero = session.roster().active_hero().expect("hero");
        assert_eq!(hero.pose(), Pose::Idle);
        assert_eq!(hero.position().y, 300);
    }
}
