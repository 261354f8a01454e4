//! Built-in level sequence used when no content file is supplied.

use std::time::Duration;

use moon_patrol_core::{LevelDescriptor, SpawnKind};

/// Width shared by the bundled skyline images.
const SKYLINE_WIDTH: f32 = 960.0;
/// Height shared by the bundled skyline images.
const SKYLINE_HEIGHT: f32 = 644.0;

/// Three districts of rising difficulty.
#[must_use]
pub fn default_campaign() -> Vec<LevelDescriptor> {
    vec![
        LevelDescriptor::named("District 1")
            .with_skyline("city", SKYLINE_WIDTH, SKYLINE_HEIGHT)
            .with_opening_wave(SpawnKind::Ufo, 1)
            .with_opening_wave(SpawnKind::Triangle, 1)
            .with_spawn(SpawnKind::Rock, Duration::from_millis(3_000))
            .with_spawn(SpawnKind::Crater, Duration::from_millis(7_000)),
        LevelDescriptor::named("District 2")
            .with_skyline("canyon", SKYLINE_WIDTH, SKYLINE_HEIGHT)
            .with_opening_wave(SpawnKind::Ufo, 2)
            .with_opening_wave(SpawnKind::Triangle, 1)
            .with_spawn(SpawnKind::Rock, Duration::from_millis(2_500))
            .with_spawn(SpawnKind::FloorBomb, Duration::from_millis(4_000))
            .with_spawn(SpawnKind::Crater, Duration::from_millis(6_000)),
        {
            let mut level = LevelDescriptor::named("District 3")
                .with_skyline("ruins", SKYLINE_WIDTH, SKYLINE_HEIGHT)
                .with_opening_wave(SpawnKind::Ufo, 2)
                .with_opening_wave(SpawnKind::Triangle, 2)
                .with_spawn(SpawnKind::Ufo, Duration::from_millis(10_000))
                .with_spawn(SpawnKind::Rock, Duration::from_millis(2_000))
                .with_spawn(SpawnKind::FloorBomb, Duration::from_millis(3_000))
                .with_spawn(SpawnKind::Crater, Duration::from_millis(5_000))
                .with_scroll_speed(3.0);
            level.enemy_speed_scale = 1.25;
            level.enemy_shots_per_second = 1.5;
            level
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_names_are_unique_and_ordered() {
        let names: Vec<String> = default_campaign()
            .into_iter()
            .map(|level| level.name)
            .collect();
        assert_eq!(names, vec!["District 1", "District 2", "District 3"]);
    }
}
