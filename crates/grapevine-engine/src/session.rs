//! The frame driver.
//!
//! A [`Session`] owns the roster built from a [`GameConfig`] and runs the
//! per-frame sequence: sample input, step the roster (tick every character,
//! resolve combat, purge the dead), present, then wait for the next tick.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use grapevine_common::{ConfigError, GrapevineError, GrapevineResult};
use grapevine_gameplay::{EventBus, FrameReport, GameEvent, Input, InputSource, Roster};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::timing::FrameClock;

/// Receives the roster after every frame.
///
/// Implemented by the presentation layer to draw sprites or play sounds.
pub trait Presenter {
    /// Shows one frame.
    fn present(&mut self, roster: &Roster, report: &FrameReport) -> GrapevineResult<()>;
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The input source asked to quit
    Quit,
    /// Every hero was removed
    HeroesDown,
}

/// Totals for a [`Session::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the run stopped
    pub end: RunEnd,
    /// Frames stepped during the run
    pub frames: u64,
    /// Damage dealt across all frames
    pub damage_dealt: i64,
    /// Characters removed during the run
    pub removed: usize,
    /// Events the event bus had no room for
    pub events_dropped: u64,
}

/// A running game.
#[derive(Debug)]
pub struct Session {
    roster: Roster,
    framerate_hz: u32,
    bus: Option<EventBus>,
}

impl Session {
    /// Builds a session: validates the configuration, spawns the heroes and
    /// places the initial spawn groups.
    pub fn from_config(config: &GameConfig) -> GrapevineResult<Self> {
        let mut config = config.clone();
        config.validate()?;

        let mut roster = Roster::new(config.template_table()?, config.effective_rules());
        for hero in &config.heroes {
            roster.spawn_hero(&hero.spec, hero.position())?;
        }
        if let Some(name) = &config.active_hero {
            let id = roster
                .heroes()
                .iter()
                .find(|hero| hero.name() == name)
                .map(grapevine_gameplay::Character::id)
                .ok_or_else(|| ConfigError::UnknownHero(name.clone()))?;
            roster.set_active_hero(id)?;
        }

        let mut rng = config.spawn_rng();
        for group in &config.spawns {
            for _ in 0..group.count {
                roster.spawn(&group.template, group.pick(&mut rng))?;
            }
        }

        info!(
            heroes = roster.heroes().len(),
            enemies = roster.enemies().len(),
            framerate = config.framerate_hz,
            "Session ready"
        );
        Ok(Self {
            roster,
            framerate_hz: config.framerate_hz,
            bus: None,
        })
    }

    /// Loads the configuration file at `path` and builds a session from it.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = GameConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?;
        Self::from_config(&config).context("building session")
    }

    /// Publishes every frame's events to `bus` as well as returning them.
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// The attached event bus, for subscribing consumers.
    #[must_use]
    pub const fn event_bus(&self) -> Option<&EventBus> {
        self.bus.as_ref()
    }

    /// The roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Mutable roster, for scripted changes between frames.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Target frame rate from the configuration.
    #[must_use]
    pub const fn framerate_hz(&self) -> u32 {
        self.framerate_hz
    }

    /// Runs one frame with the given input.
    pub fn frame(&mut self, input: &Input) -> GrapevineResult<FrameReport> {
        let report = self.roster.step(input)?;
        if let Some(bus) = &self.bus {
            let dropped = bus.publish_all(&report.events);
            if dropped > 0 {
                warn!(frame = report.frame, dropped, "Event consumers falling behind");
            }
        }
        for event in &report.events {
            if let GameEvent::Removed { name, .. } = event {
                info!(character = %name, frame = report.frame, "Character removed");
            }
        }
        Ok(report)
    }

    /// Runs frames until the input source quits or no hero is left.
    pub fn run<S, P, C>(&mut self, source: &mut S, presenter: &mut P, clock: &mut C) -> GrapevineResult<RunSummary>
    where
        S: InputSource,
        P: Presenter,
        C: FrameClock,
    {
        let mut summary = RunSummary {
            end: RunEnd::Quit,
            frames: 0,
            damage_dealt: 0,
            removed: 0,
            events_dropped: 0,
        };
        let dropped_before = self.bus.as_ref().map_or(0, EventBus::dropped);
        info!(framerate = self.framerate_hz, "Session running");

        loop {
            clock.begin_frame();
            let Some(input) = source.sample() else {
                summary.end = RunEnd::Quit;
                break;
            };

            let report = self.frame(&input)?;
            presenter.present(&self.roster, &report)?;

            summary.frames += 1;
            summary.damage_dealt += i64::from(report.damage_dealt());
            summary.removed += report.removed.len();

            if self.roster.heroes().is_empty() {
                summary.end = RunEnd::HeroesDown;
                break;
            }
            clock.wait_for_next_frame();
        }

        summary.events_dropped = self
            .bus
            .as_ref()
            .map_or(0, |bus| bus.dropped() - dropped_before);
        info!(
            end = ?summary.end,
            frames = summary.frames,
            damage = summary.damage_dealt,
            "Session stopped"
        );
        Ok(summary)
    }
}

/// Replays a fixed list of snapshots, then quits.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Input>,
}

impl ScriptedInput {
    /// Creates a script from per-frame snapshots.
    pub fn new<I: IntoIterator<Item = Input>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Appends `count` copies of a snapshot.
    #[must_use]
    pub fn then(mut self, input: Input, count: usize) -> Self {
        self.frames.extend(std::iter::repeat(input).take(count));
        self
    }

    /// Frames left to replay.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> Option<Input> {
        self.frames.pop_front()
    }
}

/// Writes each frame report as one JSON line.
#[derive(Debug)]
pub struct JsonLinesPresenter<W: Write> {
    out: W,
    skip_quiet: bool,
}

impl<W: Write> JsonLinesPresenter<W> {
    /// Writes every frame.
    pub fn new(out: W) -> Self {
        Self {
            out,
            skip_quiet: false,
        }
    }

    /// Only writes frames with at least one event.
    #[must_use]
    pub fn events_only(mut self) -> Self {
        self.skip_quiet = true;
        self
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for JsonLinesPresenter<W> {
    fn present(&mut self, _roster: &Roster, report: &FrameReport) -> GrapevineResult<()> {
        if self.skip_quiet && report.events.is_empty() {
            return Ok(());
        }
        let line = serde_json::to_string(report)
            .map_err(|e| GrapevineError::Serialization(e.to_string()))?;
        writeln!(self.out, "{line}")?;
        debug!(frame = report.frame, events = report.events.len(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeroEntry, SpawnGroup};
    use crate::timing::Unpaced;
    use grapevine_gameplay::{Action, HeroSpec};

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.spawn_seed = Some(7);
        config.spawns.clear();
        config
    }

    struct Recorder {
        frames: Vec<u64>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, _roster: &Roster, report: &FrameReport) -> GrapevineResult<()> {
            self.frames.push(report.frame);
            Ok(())
        }
    }

    #[test]
    fn test_default_session_layout() {
        let mut config = GameConfig::default();
        config.spawn_seed = Some(99);
        let session = Session::from_config(&config).expect("valid config");

        let roster = session.roster();
        assert_eq!(roster.heroes().len(), 1);
        assert_eq!(roster.enemies().len(), 2);
        assert_eq!(roster.enemies()[0].name(), "Shit Clown 1");
        assert_eq!(roster.enemies()[1].name(), "Shit Clown 2");
        for enemy in roster.enemies() {
            assert!((300..400).contains(&enemy.position().x));
            assert!((200..400).contains(&enemy.position().y));
        }
        assert_eq!(session.framerate_hz(), 30);
    }

    #[test]
    fn test_seeded_sessions_match() {
        let mut config = GameConfig::default();
        config.spawn_seed = Some(5);
        let a = Session::from_config(&config).expect("valid");
        let b = Session::from_config(&config).expect("valid");
        let pa: Vec<_> = a.roster().enemies().iter().map(|e| e.position()).collect();
        let pb: Vec<_> = b.roster().enemies().iter().map(|e| e.position()).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_active_hero_from_config() {
        let mut config = quiet_config();
        config.heroes.push(HeroEntry {
            spec: HeroSpec::named("Victoria"),
            x: 400,
            y: 300,
        });
        config.active_hero = Some("Victoria".to_string());

        let session = Session::from_config(&config).expect("valid");
        let active = session.roster().active_hero().expect("active");
        assert_eq!(active.name(), "Victoria");
    }

    #[test]
    fn test_bad_config_builds_nothing() {
        let mut config = quiet_config();
        config.spawns.push(SpawnGroup {
            template: "Mime".to_string(),
            count: 1,
            x_min: 0,
            x_max: 10,
            y_min: 0,
            y_max: 10,
        });
        let err = Session::from_config(&config).expect_err("unknown template");
        assert!(matches!(err, GrapevineError::Config(ConfigError::UnknownTemplate(_))));
    }

    #[test]
    fn test_run_until_quit() {
        let mut session = Session::from_config(&quiet_config()).expect("valid");
        let mut source = ScriptedInput::default()
            .then(Input::pressing(&[Action::MoveRight]), 5)
            .then(Input::idle(), 2);
        let mut presenter = Recorder { frames: Vec::new() };
        let mut clock = Unpaced::default();

        let summary = session
            .run(&mut source, &mut presenter, &mut clock)
            .expect("run");

        assert_eq!(summary.end, RunEnd::Quit);
        assert_eq!(summary.frames, 7);
        assert_eq!(presenter.frames, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(clock.frames(), 8);
        let hero = session.roster().active_hero().expect("hero");
        assert_eq!(hero.position().x, 115);
    }

    #[test]
    fn test_run_stops_when_heroes_down() {
        let mut session = Session::from_config(&quiet_config()).expect("valid");
        let hero = session.roster().active_hero().expect("hero").id();
        session.roster_mut().get_mut(hero).expect("hero").set_hp(0);

        let mut source = ScriptedInput::default().then(Input::idle(), 10);
        let mut presenter = Recorder { frames: Vec::new() };
        let summary = session
            .run(&mut source, &mut presenter, &mut Unpaced::default())
            .expect("run");

        assert_eq!(summary.end, RunEnd::HeroesDown);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(source.remaining(), 9);
    }

    #[test]
    fn test_frames_publish_to_event_bus() {
        let mut session = Session::from_config(&quiet_config())
            .expect("valid")
            .with_event_bus(EventBus::new(16));
        let receiver = session.event_bus().expect("bus").subscribe();

        let report = session.frame(&Input::idle()).expect("frame");
        let published: Vec<GameEvent> = receiver.try_iter().collect();
        assert_eq!(published, report.events);
        assert!(matches!(published[0], GameEvent::Spawned { .. }));
    }

    #[test]
    fn test_run_reports_dropped_events() {
        let mut config = quiet_config();
        config.heroes.push(HeroEntry {
            spec: HeroSpec::named("Victoria"),
            x: 400,
            y: 300,
        });
        let mut session = Session::from_config(&config)
            .expect("valid")
            .with_event_bus(EventBus::new(1));

        let mut source = ScriptedInput::default().then(Input::idle(), 1);
        let summary = session
            .run(&mut source, &mut Recorder { frames: Vec::new() }, &mut Unpaced::default())
            .expect("run");

        // Two spawn events, room for one.
        assert_eq!(summary.events_dropped, 1);
        assert_eq!(session.event_bus().expect("bus").drain().len(), 1);
    }

    #[test]
    fn test_json_lines_presenter() {
        let mut session = Session::from_config(&quiet_config()).expect("valid");
        let mut presenter = JsonLinesPresenter::new(Vec::new()).events_only();

        for _ in 0..3 {
            let report = session.frame(&Input::idle()).expect("frame");
            presenter.present(session.roster(), &report).expect("write");
        }

        let out = String::from_utf8(presenter.into_inner()).expect("utf8");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 1);
        let report: FrameReport = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(report.frame, 1);
        assert!(matches!(report.events[0], GameEvent::Spawned { .. }));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let session = Session::load(dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(session.roster().heroes().len(), 1);
    }

    #[test]
    fn test_load_reports_context() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("grapevine.toml");
        std::fs::write(&path, "framerate_hz = [").expect("write");

        let err = Session::load(&path).expect_err("bad toml");
        assert!(format!("{err:#}").starts_with("loading "));
    }
}
