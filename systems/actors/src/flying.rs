//! Airborne enemies that roam the upper part of the arena.

use std::time::Duration;

use glam::Vec2;
use moon_patrol_core::{Canvas, EntityKind, Hitbox, SimulationError, ARENA_WIDTH};
use moon_patrol_world::{Body, Collidable, CollisionPeer, Entity, FrameContext, Movable};
use rand::{Rng, RngCore};

use crate::{projectiles::Bomb, step_toward, EnemyTuning};

const CRUISE_ALTITUDE_MIN: f32 = 100.0;
const CRUISE_ALTITUDE_MAX: f32 = 150.0;
const MIN_HOP_DISTANCE: f32 = 200.0;
const TARGET_ATTEMPTS: usize = 64;

const UFO_SPEED: f32 = 2.0;
const UFO_SCALE: f32 = 0.25;
const UFO_WIDTH: f32 = 80.0;
const UFO_RANGE_X: f32 = 700.0;
const UFO_CURVE_STEPS: u32 = 20;
const UFO_HITBOX: Hitbox = Hitbox::new(0.0, 20.0, 60.0, 25.0);
const UFO_BOMB_TIMER: &str = "drop-bomb";
const UFO_BOMB_OFFSET: Vec2 = Vec2::new(22.0, 40.0);

const TRIANGLE_SPEED: f32 = 3.0;
const TRIANGLE_SCALE: f32 = 0.08;
const TRIANGLE_WIDTH: f32 = 40.0;
const TRIANGLE_SPAWN_Y: f32 = -100.0;
const TRIANGLE_SPIN_STEPS: u32 = 10;
const TRIANGLE_HITBOX: Hitbox = Hitbox::new(0.0, 0.0, 40.0, 40.0);

fn cruise_point(range_x: f32, rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(
        rng.gen_range(0.0..range_x),
        rng.gen_range(CRUISE_ALTITUDE_MIN..CRUISE_ALTITUDE_MAX),
    )
}

/// Picks a cruising target at least [`MIN_HOP_DISTANCE`] away from `from`.
///
/// Gives up after a bounded number of draws and keeps the last candidate.
fn pick_target(from: Vec2, range_x: f32, rng: &mut dyn RngCore) -> Vec2 {
    let mut candidate = cruise_point(range_x, rng);
    for _ in 1..TARGET_ATTEMPTS {
        if candidate.distance(from) >= MIN_HOP_DISTANCE {
            break;
        }
        candidate = cruise_point(range_x, rng);
    }
    candidate
}

/// Target seeking shared by the flying enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Flight {
    target: Vec2,
    arrived: bool,
    manoeuvre: u32,
}

impl Flight {
    fn toward(target: Vec2) -> Self {
        Self {
            target,
            arrived: false,
            manoeuvre: 0,
        }
    }
}

/// Saucer that hops between targets, loops a short curve and drops bombs.
#[derive(Debug)]
pub struct Ufo {
    body: Body,
    flight: Flight,
    heading_right: bool,
    bomb_interval: Duration,
}

impl Ufo {
    /// Creates a saucer at a random spot on the cruising band.
    pub fn new(tuning: EnemyTuning, rng: &mut dyn RngCore) -> Self {
        let start = Vec2::new(
            rng.gen_range(0.0..ARENA_WIDTH - UFO_WIDTH),
            CRUISE_ALTITUDE_MIN,
        );
        Self::at(start, tuning, rng)
    }

    /// Creates a saucer at `position`.
    pub fn at(position: Vec2, tuning: EnemyTuning, rng: &mut dyn RngCore) -> Self {
        let target = pick_target(position, UFO_RANGE_X, rng);
        let shots = tuning.shots_per_second().max(f32::EPSILON);
        Self {
            body: Body::new(position, UFO_SPEED * tuning.speed_scale()).with_scale(UFO_SCALE),
            flight: Flight::toward(target),
            heading_right: target.x >= position.x,
            bomb_interval: Duration::from_secs_f32(1.0 / shots),
        }
    }

    fn curve(&mut self) {
        let angle = self.flight.manoeuvre as f32 / 10.0;
        let sway = angle.sin();
        if self.heading_right {
            self.body.position.x -= sway;
        } else {
            self.body.position.x += sway;
        }
        self.body.position.y -= angle.cos();
    }
}

impl Entity for Ufo {
    fn kind(&self) -> EntityKind {
        EntityKind::Ufo
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.y < 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_image("ufo", self.body.position, self.body.scale, self.body.rotation);
    }

    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        Some(self)
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Movable for Ufo {
    fn update_position(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        let owner = ctx.owner();
        if !ctx.timers().timer_is_active(owner, UFO_BOMB_TIMER) {
            ctx.timers()
                .activate_timer(owner, UFO_BOMB_TIMER, self.bomb_interval);
            let _ = ctx.spawn(Box::new(Bomb::new(self.body.position + UFO_BOMB_OFFSET)));
        }

        if !self.flight.arrived {
            self.flight.arrived =
                step_toward(&mut self.body.position, self.flight.target, self.body.speed);
        } else if self.flight.manoeuvre < UFO_CURVE_STEPS {
            self.curve();
            self.flight.manoeuvre += 1;
        } else {
            let target = pick_target(self.body.position, UFO_RANGE_X, ctx.rng());
            self.heading_right = target.x >= self.body.position.x;
            self.flight = Flight::toward(target);
        }
        Ok(())
    }
}

impl Collidable for Ufo {
    fn hitbox(&self) -> Hitbox {
        UFO_HITBOX
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        if other.kind == EntityKind::UpwardShot {
            ctx.destroy_self();
        }
        Ok(())
    }
}

/// Spinning flyer that drops in from above the arena.
#[derive(Debug)]
pub struct Triangle {
    body: Body,
    flight: Flight,
}

impl Triangle {
    /// Creates a flyer above the arena at a random horizontal position.
    pub fn new(tuning: EnemyTuning, rng: &mut dyn RngCore) -> Self {
        let start = Vec2::new(
            rng.gen_range(0.0..ARENA_WIDTH - TRIANGLE_WIDTH),
            TRIANGLE_SPAWN_Y,
        );
        let target = pick_target(start, ARENA_WIDTH - 1.0, rng);
        Self {
            body: Body::new(start, TRIANGLE_SPEED * tuning.speed_scale())
                .with_scale(TRIANGLE_SCALE),
            flight: Flight::toward(target),
        }
    }
}

impl Entity for Triangle {
    fn kind(&self) -> EntityKind {
        EntityKind::Triangle
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_image(
            "triangle",
            self.body.position,
            self.body.scale,
            self.body.rotation,
        );
    }

    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        Some(self)
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Movable for Triangle {
    fn update_position(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if !self.flight.arrived {
            self.flight.arrived =
                step_toward(&mut self.body.position, self.flight.target, self.body.speed);
        } else if self.flight.manoeuvre < TRIANGLE_SPIN_STEPS {
            self.body.rotation = (self.body.rotation + self.flight.manoeuvre as f32 * 2.0) % 360.0;
            self.flight.manoeuvre += 1;
        } else {
            let target = pick_target(self.body.position, ARENA_WIDTH - 1.0, ctx.rng());
            self.flight = Flight::toward(target);
        }
        Ok(())
    }
}

impl Collidable for Triangle {
    fn hitbox(&self) -> Hitbox {
        TRIANGLE_HITBOX
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        if other.kind == EntityKind::UpwardShot {
            ctx.destroy_self();
        }
        Ok(())
    }
}
