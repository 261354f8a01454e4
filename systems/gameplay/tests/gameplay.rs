use std::time::Duration;

use glam::Vec2;
use moon_patrol_core::{
    Difficulty, DrawCommand, DrawList, EntityKind, GameplayConfig, InputCode, LevelDescriptor,
    SimulationError, SpawnKind, ARENA_WIDTH,
};
use moon_patrol_system_actors::{Bomb, ROVER_START};
use moon_patrol_system_gameplay::{default_campaign, FrameReport, GamePhase, Gameplay};
use moon_patrol_system_timing::ManualClock;
use moon_patrol_world::query;

fn config() -> GameplayConfig {
    GameplayConfig {
        level_duration_ms: 1_000,
        game_over_delay_ms: 2_000,
        ..GameplayConfig::default()
    }
}

fn districts() -> Vec<LevelDescriptor> {
    vec![
        LevelDescriptor::named("L0").with_opening_wave(SpawnKind::Crater, 1),
        LevelDescriptor::named("L1")
            .with_skyline("canyon", 960.0, 644.0)
            .with_opening_wave(SpawnKind::Crater, 2),
        LevelDescriptor::named("L2").with_opening_wave(SpawnKind::Crater, 3),
    ]
}

fn session(config: GameplayConfig, levels: Vec<LevelDescriptor>) -> (Gameplay, ManualClock) {
    let clock = ManualClock::new();
    let gameplay =
        Gameplay::new(config, levels, Box::new(clock.clone())).expect("levels are available");
    (gameplay, clock)
}

fn step(gameplay: &mut Gameplay) -> FrameReport {
    let mut canvas = DrawList::new();
    gameplay
        .tick(&[], &mut canvas)
        .expect("frame stays below the cap")
}

fn count(gameplay: &Gameplay, kind: EntityKind) -> usize {
    query::count_of(gameplay.registry(), kind)
}

#[test]
fn empty_campaign_is_rejected() {
    let result = Gameplay::new(
        GameplayConfig::default(),
        Vec::new(),
        Box::new(ManualClock::new()),
    );
    assert_eq!(result.err(), Some(SimulationError::NoLevels));
}

#[test]
fn first_frame_builds_the_opening_level() {
    let (mut gameplay, _clock) = session(config(), districts());
    let report = step(&mut gameplay);

    assert_eq!(report.phase, GamePhase::Playing);
    assert_eq!(report.level_index, 0);
    assert_eq!(report.level_name, "L0");
    assert_eq!(report.live, 4, "rover, stars, overlay and one crater");
    assert!(gameplay.registry().contains(gameplay.player()));
    assert_eq!(
        gameplay.announcement().map(|announcement| announcement.text()),
        Some("L0")
    );
}

#[test]
fn levels_wrap_around_and_tear_down_the_previous_level() {
    let (mut gameplay, clock) = session(config(), districts());
    let player = gameplay.player();
    let _ = step(&mut gameplay);

    let mut visited = Vec::new();
    for transition in 1..=4u64 {
        clock.set(Duration::from_millis(transition * 1_000));
        let report = step(&mut gameplay);
        visited.push(report.level_index);
        let _ = step(&mut gameplay);

        let expected_craters = report.level_index + 1;
        assert_eq!(count(&gameplay, EntityKind::Crater), expected_craters);
        assert_eq!(count(&gameplay, EntityKind::Stars), 1);
        assert_eq!(count(&gameplay, EntityKind::Overlay), 1);
        assert_eq!(
            count(&gameplay, EntityKind::Skyline),
            usize::from(report.level_index == 1)
        );
        assert!(gameplay.registry().contains(player), "player persists");
    }

    assert_eq!(visited, vec![1, 2, 0, 1]);
    assert_eq!(gameplay.level().name, "L1");
}

#[test]
fn spawn_cadence_follows_the_level_rules() {
    let level = LevelDescriptor::named("Quarry").with_spawn(SpawnKind::Crater, Duration::from_secs(1));
    let (mut gameplay, clock) = session(
        GameplayConfig {
            level_duration_ms: 60_000,
            ..GameplayConfig::default()
        },
        vec![level],
    );

    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 0);

    clock.set(Duration::from_millis(1_000));
    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 1);

    clock.set(Duration::from_millis(1_500));
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 1);

    clock.set(Duration::from_millis(2_000));
    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 2);
}

#[test]
fn easy_difficulty_doubles_spawn_intervals() {
    let level = LevelDescriptor::named("Quarry").with_spawn(SpawnKind::Crater, Duration::from_secs(1));
    let (mut gameplay, clock) = session(
        GameplayConfig {
            level_duration_ms: 60_000,
            difficulty: Difficulty::Easy,
            ..GameplayConfig::default()
        },
        vec![level],
    );

    let _ = step(&mut gameplay);
    clock.set(Duration::from_millis(1_000));
    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 0);

    clock.set(Duration::from_millis(2_000));
    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(count(&gameplay, EntityKind::Crater), 1);
}

#[test]
fn world_scrolls_static_content_each_frame() {
    let level = LevelDescriptor::named("Flats")
        .with_opening_wave(SpawnKind::Crater, 1)
        .with_scroll_speed(5.0);
    let (mut gameplay, _clock) = session(
        GameplayConfig {
            level_duration_ms: 60_000,
            ..GameplayConfig::default()
        },
        vec![level],
    );

    let _ = step(&mut gameplay);
    let crater = |gameplay: &Gameplay| {
        query::snapshots(gameplay.registry())
            .into_iter()
            .find(|snapshot| snapshot.kind == EntityKind::Crater)
            .map(|snapshot| snapshot.position.x)
    };
    let start = crater(&gameplay).expect("crater is live");
    let _ = step(&mut gameplay);
    let _ = step(&mut gameplay);
    assert_eq!(crater(&gameplay), Some(start - 10.0));

    let stars = query::snapshots(gameplay.registry())
        .into_iter()
        .find(|snapshot| snapshot.kind == EntityKind::Stars)
        .map(|snapshot| snapshot.position);
    assert_eq!(stars, Some(Vec2::ZERO));
}

#[test]
fn defeat_waits_for_the_alarm_then_restarts_with_a_fresh_rover() {
    let (mut gameplay, clock) = session(
        GameplayConfig {
            level_duration_ms: 60_000,
            ..config()
        },
        districts(),
    );
    let first_rover = gameplay.player();
    let _ = gameplay.spawn(Box::new(Bomb::new(ROVER_START + Vec2::new(50.0, 10.0))));

    let report = step(&mut gameplay);
    assert!(report.game_over_raised);
    assert_eq!(report.phase, GamePhase::GameOverPending);
    assert_eq!(
        gameplay.announcement().map(|announcement| announcement.text()),
        Some("Game Over")
    );

    let _ = step(&mut gameplay);
    assert!(!gameplay.registry().contains(first_rover));

    clock.set(Duration::from_millis(1_999));
    let report = step(&mut gameplay);
    assert_eq!(report.phase, GamePhase::GameOverPending);

    clock.set(Duration::from_millis(2_000));
    let report = step(&mut gameplay);
    assert_eq!(report.phase, GamePhase::Playing);
    assert_eq!(report.level_index, 0);
    assert_ne!(gameplay.player(), first_rover);

    let report = step(&mut gameplay);
    assert!(gameplay.registry().contains(gameplay.player()));
    assert_eq!(report.live, 4);
    assert_eq!(count(&gameplay, EntityKind::Rover), 1);
}

#[test]
fn game_over_message_is_drawn_inside_the_arena_after_long_scrolling() {
    let (mut gameplay, clock) = session(
        GameplayConfig {
            level_duration_ms: 60_000,
            ..GameplayConfig::default()
        },
        vec![LevelDescriptor::named("Quiet")],
    );
    for _ in 0..600 {
        let _ = step(&mut gameplay);
        clock.advance(Duration::from_millis(16));
    }

    let _ = gameplay.spawn(Box::new(Bomb::new(ROVER_START + Vec2::new(50.0, 10.0))));
    let mut drawn = Vec::new();
    for _ in 0..3 {
        let mut canvas = DrawList::new();
        let _ = gameplay
            .tick(&[], &mut canvas)
            .expect("frame stays below the cap");
        clock.advance(Duration::from_millis(16));
        drawn.extend(canvas.into_vec().into_iter().filter_map(|command| match command {
            DrawCommand::Text { text, position, .. } if text == "Game Over" => Some(position),
            _ => None,
        }));
    }

    assert!(!drawn.is_empty(), "game over message is shown");
    for position in drawn {
        assert!(
            (0.0..ARENA_WIDTH).contains(&position.x),
            "message drawn at x={}",
            position.x
        );
    }
}

#[test]
fn runaway_spawning_hits_the_cap() {
    let level = LevelDescriptor::named("Swarm").with_opening_wave(SpawnKind::Crater, 10);
    let (mut gameplay, _clock) = session(
        GameplayConfig {
            entity_cap: 12,
            ..GameplayConfig::default()
        },
        vec![level],
    );

    let mut canvas = DrawList::new();
    let error = gameplay
        .tick(&[], &mut canvas)
        .expect_err("thirteen entities exceed a cap of twelve");
    assert_eq!(
        error,
        SimulationError::TooManyEntities {
            count: 13,
            cap: 12
        }
    );
}

#[test]
fn identical_seeds_replay_identically() {
    let script = |frame: usize| -> Vec<InputCode> {
        let mut pressed = Vec::new();
        if frame % 90 < 30 {
            pressed.push(InputCode::Right);
        }
        if frame % 45 == 0 {
            pressed.push(InputCode::Jump);
        }
        if frame % 20 == 0 {
            pressed.push(InputCode::Shoot);
        }
        pressed
    };

    let run = || {
        let (mut gameplay, clock) = session(GameplayConfig::default(), default_campaign());
        let mut frames = Vec::new();
        for frame in 0..900 {
            let mut canvas = DrawList::new();
            let report = gameplay
                .tick(&script(frame), &mut canvas)
                .expect("frame stays below the cap");
            frames.push((report, canvas));
            clock.advance(Duration::from_micros(16_667));
        }
        frames
    };

    let first = run();
    let second = run();
    assert_eq!(first.len(), second.len());
    assert!(first == second, "replays diverged");
}
