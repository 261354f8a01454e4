#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Concrete entity kinds of Moon Patrol.
//!
//! Every kind implements [`moon_patrol_world::Entity`] and opts into the
//! movable and collidable capabilities it needs. Collision reactions switch
//! on the peer's [`moon_patrol_core::EntityKind`] tag.

mod flying;
mod hazards;
mod projectiles;
mod rover;
mod scenery;

use glam::Vec2;
use moon_patrol_core::{LevelDescriptor, SpawnKind, ARENA_HEIGHT};
use moon_patrol_world::Entity;
use rand::RngCore;

pub use flying::{Triangle, Ufo};
pub use hazards::{Crater, FloorBomb, Rock};
pub use projectiles::{Bomb, ForwardShot, UpwardShot};
pub use rover::{DamagePhase, JumpPhase, Rover, ROVER_START};
pub use scenery::{Overlay, Skyline, Stars};

/// Vertical coordinate of the ground line the rover drives on.
pub const GROUND_LINE: f32 = ARENA_HEIGHT - 55.0;

/// Per-level adjustments applied to enemies when they are spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTuning {
    speed_scale: f32,
    shots_per_second: f32,
}

impl EnemyTuning {
    /// Creates tuning from a speed multiplier and a saucer fire rate.
    #[must_use]
    pub const fn new(speed_scale: f32, shots_per_second: f32) -> Self {
        Self {
            speed_scale,
            shots_per_second,
        }
    }

    /// Extracts the enemy tuning authored for a level.
    #[must_use]
    pub fn from_level(level: &LevelDescriptor) -> Self {
        Self::new(level.enemy_speed_scale, level.enemy_shots_per_second)
    }

    /// Multiplier applied to authored enemy speeds.
    #[must_use]
    pub const fn speed_scale(&self) -> f32 {
        self.speed_scale
    }

    /// Bombs dropped per second by each saucer.
    #[must_use]
    pub const fn shots_per_second(&self) -> f32 {
        self.shots_per_second
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Builds a freshly initialised enemy of `kind`.
pub fn spawn_enemy(
    kind: SpawnKind,
    tuning: EnemyTuning,
    rng: &mut dyn RngCore,
) -> Box<dyn Entity> {
    match kind {
        SpawnKind::Ufo => Box::new(Ufo::new(tuning, rng)),
        SpawnKind::Triangle => Box::new(Triangle::new(tuning, rng)),
        SpawnKind::Rock => Box::new(Rock::new(tuning)),
        SpawnKind::FloorBomb => Box::new(FloorBomb::new(tuning)),
        SpawnKind::Crater => Box::new(Crater::new()),
    }
}

/// Moves `position` toward `target` by at most `step`; returns `true` once within one step.
pub(crate) fn step_toward(position: &mut Vec2, target: Vec2, step: f32) -> bool {
    let offset = target - *position;
    let distance = offset.length();
    if distance < step || distance == 0.0 {
        return true;
    }
    *position += offset / distance * step;
    false
}
