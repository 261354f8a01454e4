#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gameplay orchestrator sequencing levels, spawns and the game-over flow.
//!
//! The orchestrator owns the timer service, the entity registry and the
//! random source. Each call to [`Gameplay::tick`] first runs the
//! orchestrator's own state machine and then dispatches one registry frame.

mod campaign;

use std::{fmt, time::Duration};

use glam::Vec2;
use moon_patrol_core::{
    Announcement, Canvas, EntityId, GameplayConfig, InputCode, LevelDescriptor, SimulationError,
};
use moon_patrol_system_actors::{spawn_enemy, EnemyTuning, Overlay, Rover, Skyline, Stars};
use moon_patrol_system_timing::{ClockSource, TimerOwner, Timers};
use moon_patrol_world::{Entity, Frame, Registry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use campaign::default_campaign;

const LEVEL_TIMER: &str = "level";
const GAME_OVER_ALARM: &str = "game-over";
const GAME_OVER_TEXT: &str = "Game Over";

/// Coarse state of the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    /// Levels advance, enemies spawn and the world scrolls.
    Playing,
    /// The player was defeated; waiting for the game-over alarm.
    GameOverPending,
    /// Re-initialising the first level.
    Resetting,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Playing => "playing",
            Self::GameOverPending => "game over pending",
            Self::Resetting => "resetting",
        };
        f.write_str(label)
    }
}

/// Summary of one orchestrated frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Orchestrator phase after the frame.
    pub phase: GamePhase,
    /// Index of the active level.
    pub level_index: usize,
    /// Name of the active level.
    pub level_name: String,
    /// Number of entities dispatched this frame.
    pub live: usize,
    /// Number of overlapping collidable pairs.
    pub collisions: usize,
    /// Whether a collision reaction raised the game-over flag.
    pub game_over_raised: bool,
}

/// Orchestrates the live world of one game session.
#[derive(Debug)]
pub struct Gameplay {
    config: GameplayConfig,
    levels: Vec<LevelDescriptor>,
    level: usize,
    phase: GamePhase,
    player: EntityId,
    timers: Timers,
    registry: Registry,
    rng: ChaCha8Rng,
    announcement: Option<Announcement>,
    announcements: u64,
}

impl Gameplay {
    /// Creates a session on the first level with a fresh rover.
    ///
    /// Fails with [`SimulationError::NoLevels`] when `levels` is empty.
    pub fn new(
        config: GameplayConfig,
        levels: Vec<LevelDescriptor>,
        clock: Box<dyn ClockSource>,
    ) -> Result<Self, SimulationError> {
        if levels.is_empty() {
            return Err(SimulationError::NoLevels);
        }

        let mut registry = Registry::new(config.entity_cap);
        let player = registry.add(Box::new(Rover::new()));
        let mut gameplay = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            levels,
            level: 0,
            phase: GamePhase::Playing,
            player,
            timers: Timers::new(clock),
            registry,
            announcement: None,
            announcements: 0,
        };
        gameplay.start_level(0);
        Ok(gameplay)
    }

    /// Advances the session by one frame, drawing every live entity onto `canvas`.
    pub fn tick(
        &mut self,
        input: &[InputCode],
        canvas: &mut dyn Canvas,
    ) -> Result<FrameReport, SimulationError> {
        match self.phase {
            GamePhase::Playing => self.play(),
            GamePhase::GameOverPending => {
                if self.timers.alarm(TimerOwner::Gameplay, GAME_OVER_ALARM) {
                    self.phase = GamePhase::Resetting;
                }
            }
            GamePhase::Resetting => {}
        }
        if self.phase == GamePhase::Resetting {
            self.reset();
        }

        let mut frame = Frame {
            timers: &mut self.timers,
            rng: &mut self.rng,
            input,
            announcement: self.announcement.as_ref(),
        };
        let report = self.registry.tick(&mut frame, canvas)?;

        if report.game_over_raised && self.phase == GamePhase::Playing {
            log::info!("player {} defeated on {}", self.player, self.level().name);
            self.phase = GamePhase::GameOverPending;
            self.timers.set_alarm(
                TimerOwner::Gameplay,
                GAME_OVER_ALARM,
                self.config.game_over_delay(),
            );
            self.announce(GAME_OVER_TEXT);
        }

        Ok(FrameReport {
            phase: self.phase,
            level_index: self.level,
            level_name: self.level().name.clone(),
            live: report.live,
            collisions: report.collisions,
            game_over_raised: report.game_over_raised,
        })
    }

    /// Buffers `entity` for insertion at the start of the next frame.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) -> EntityId {
        self.registry.add(entity)
    }

    /// Buffers removal of `id` at the start of the next frame.
    pub fn destroy(&mut self, id: EntityId) {
        self.registry.remove(id);
    }

    /// Current orchestrator phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Index of the active level.
    #[must_use]
    pub const fn level_index(&self) -> usize {
        self.level
    }

    /// Descriptor of the active level.
    #[must_use]
    pub fn level(&self) -> &LevelDescriptor {
        &self.levels[self.level]
    }

    /// Identifier of the persistent player entity.
    #[must_use]
    pub const fn player(&self) -> EntityId {
        self.player
    }

    /// Most recent announcement.
    #[must_use]
    pub fn announcement(&self) -> Option<&Announcement> {
        self.announcement.as_ref()
    }

    /// Live world.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Tuning the session runs with.
    #[must_use]
    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Time elapsed since the session started.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    fn play(&mut self) {
        if !self.timers.timer_is_active(TimerOwner::Gameplay, LEVEL_TIMER) {
            let next = (self.level + 1) % self.levels.len();
            self.start_level(next);
        }
        self.spawn_due_enemies();

        let scroll = self.level().scroll_speed.unwrap_or(self.config.scroll_speed);
        self.registry.move_world(Vec2::new(-scroll, 0.0));
    }

    fn spawn_due_enemies(&mut self) {
        let level = &self.levels[self.level];
        let tuning = EnemyTuning::from_level(level);
        for rule in &level.spawns {
            let timer = rule.kind.timer_name();
            if self.timers.timer_is_active(TimerOwner::Gameplay, timer) {
                continue;
            }
            let interval = self.config.difficulty.scale_interval(rule.interval());
            self.timers
                .activate_timer(TimerOwner::Gameplay, timer, interval);
            let id = self
                .registry
                .add(spawn_enemy(rule.kind, tuning, &mut self.rng));
            log::debug!("spawned {:?} {id}", rule.kind);
        }
    }

    fn start_level(&mut self, index: usize) {
        self.level = index;
        self.registry.destroy_all_except(&[self.player]);

        let level = &self.levels[index];
        log::info!("starting level {index}: {}", level.name);
        let _ = self.registry.add(Box::new(Stars::new()));
        if let Some(skyline) = &level.skyline {
            let _ = self.registry.add(Box::new(Skyline::new(skyline)));
        }
        let _ = self.registry.add(Box::new(Overlay::new()));

        let tuning = EnemyTuning::from_level(level);
        for wave in &level.opening_wave {
            for _ in 0..wave.count {
                let _ = self
                    .registry
                    .add(spawn_enemy(wave.kind, tuning, &mut self.rng));
            }
        }

        let difficulty = self.config.difficulty;
        for rule in &level.spawns {
            self.timers.activate_timer(
                TimerOwner::Gameplay,
                rule.kind.timer_name(),
                difficulty.scale_interval(rule.interval()),
            );
        }
        self.timers.activate_timer(
            TimerOwner::Gameplay,
            LEVEL_TIMER,
            self.config.level_duration(),
        );

        let name = level.name.clone();
        self.announce(&name);
    }

    fn reset(&mut self) {
        log::info!("resetting campaign after game over");
        self.timers
            .cancel_alarm(TimerOwner::Gameplay, GAME_OVER_ALARM);
        self.player = self.registry.add(Box::new(Rover::new()));
        self.start_level(0);
        self.phase = GamePhase::Playing;
    }

    fn announce(&mut self, text: &str) {
        self.announcements += 1;
        self.announcement = Some(Announcement::new(
            self.announcements,
            text,
            self.config.banner_duration(),
        ));
    }
}
