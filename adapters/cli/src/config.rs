//! Game file loading.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use moon_patrol_core::{GameplayConfig, LevelDescriptor};
use moon_patrol_system_gameplay::default_campaign;
use serde::Deserialize;

/// Game file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "assets/moon_patrol.toml";

/// Gameplay tuning and level content of one session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct GameFile {
    /// Orchestrator tuning.
    #[serde(default)]
    pub(crate) gameplay: GameplayConfig,
    /// Levels in the order they are played.
    #[serde(default = "default_campaign")]
    pub(crate) levels: Vec<LevelDescriptor>,
}

impl Default for GameFile {
    fn default() -> Self {
        Self {
            gameplay: GameplayConfig::default(),
            levels: default_campaign(),
        }
    }
}

/// Parses a game file from TOML text.
pub(crate) fn parse(contents: &str) -> Result<GameFile> {
    toml::from_str(contents).context("failed to parse game file toml contents")
}

/// Loads the game file at `path`, or the default one when no path is given.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is used
/// when present and the built-in campaign otherwise.
pub(crate) fn load(path: Option<&Path>) -> Result<GameFile> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !fallback.is_file() {
                log::info!("no game file at {DEFAULT_CONFIG_PATH}; using the built-in campaign");
                return Ok(GameFile::default());
            }
            fallback
        }
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read game file at {}", path.display()))?;
    let file = parse(&contents).with_context(|| format!("invalid game file {}", path.display()))?;
    log::info!(
        "loaded {} levels from {}",
        file.levels.len(),
        path.display()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moon_patrol_core::{Difficulty, SpawnKind, WaveEntry};
    use std::time::Duration;

    #[test]
    fn empty_file_falls_back_to_defaults() {
        let file = parse("").expect("empty file parses");
        assert_eq!(file, GameFile::default());
    }

    #[test]
    fn partial_gameplay_table_keeps_remaining_defaults() {
        let file = parse(
            r#"
            [gameplay]
            seed = 7
            difficulty = "easy"
            "#,
        )
        .expect("gameplay table parses");

        assert_eq!(file.gameplay.seed, 7);
        assert_eq!(file.gameplay.difficulty, Difficulty::Easy);
        assert_eq!(file.gameplay.level_duration(), Duration::from_secs(60));
        assert_eq!(file.levels, default_campaign());
    }

    #[test]
    fn levels_are_read_in_order() {
        let file = parse(
            r#"
            [[levels]]
            name = "District 1"
            skyline = { sprite = "city", width = 960.0, height = 644.0 }
            opening_wave = [{ kind = "ufo", count = 1 }, { kind = "triangle", count = 1 }]
            spawns = [{ kind = "rock", interval_ms = 3000 }]

            [[levels]]
            name = "District 2"
            scroll_speed = 3.0
            enemy_speed_scale = 1.5
            "#,
        )
        .expect("levels parse");

        assert_eq!(file.levels.len(), 2);
        let first = &file.levels[0];
        assert_eq!(first.name, "District 1");
        assert_eq!(
            first.opening_wave,
            vec![
                WaveEntry {
                    kind: SpawnKind::Ufo,
                    count: 1
                },
                WaveEntry {
                    kind: SpawnKind::Triangle,
                    count: 1
                },
            ]
        );
        assert_eq!(first.spawns[0].interval(), Duration::from_secs(3));
        assert_eq!(first.enemy_shots_per_second, 1.0);

        let second = &file.levels[1];
        assert_eq!(second.skyline, None);
        assert_eq!(second.scroll_speed, Some(3.0));
        assert_eq!(second.enemy_speed_scale, 1.5);
    }

    #[test]
    fn unknown_enemy_kinds_are_rejected() {
        let result = parse(
            r#"
            [[levels]]
            name = "Broken"
            opening_wave = [{ kind = "dragon", count = 1 }]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn bundled_game_file_matches_the_built_in_campaign() {
        let file = parse(include_str!("../../../assets/moon_patrol.toml"))
            .expect("bundled game file parses");
        assert_eq!(file.levels, default_campaign());
        assert_eq!(file.gameplay.seed, 7);
        assert_eq!(file.gameplay.entity_cap, 2_000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load(Some(Path::new("definitely/not/here.toml")));
        let message = format!("{:#}", result.expect_err("missing file fails"));
        assert!(message.contains("definitely/not/here.toml"));
    }
}
