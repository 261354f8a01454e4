//! Ground hazards the rover has to jump over or shoot.

use glam::Vec2;
use moon_patrol_core::{
    Canvas, Color, EntityKind, Hitbox, Rect, Shape, SimulationError, ARENA_HEIGHT, ARENA_WIDTH,
};
use moon_patrol_world::{Body, Collidable, CollisionPeer, Entity, FrameContext, Movable};

use crate::EnemyTuning;

const ROCK_SIZE: f32 = 40.0;
const ROCK_SPEED: f32 = 3.0;
const FLOOR_BOMB_WIDTH: f32 = 20.0;
const FLOOR_BOMB_HEIGHT: f32 = 5.0;
const FLOOR_BOMB_SPEED: f32 = 4.0;
const CRATER_WIDTH: f32 = 80.0;
const CRATER_HEIGHT: f32 = 20.0;

fn destroyed_by_rover_or_cannon(other: &CollisionPeer, ctx: &mut FrameContext<'_, '_>) {
    if matches!(other.kind, EntityKind::Rover | EntityKind::ForwardShot) {
        ctx.destroy_self();
    }
}

/// Boulder rolling toward the rover.
#[derive(Debug)]
pub struct Rock {
    body: Body,
}

impl Rock {
    /// Creates a boulder at the right edge of the ground.
    #[must_use]
    pub fn new(tuning: EnemyTuning) -> Self {
        Self::at(
            Vec2::new(ARENA_WIDTH, ARENA_HEIGHT - 50.0),
            tuning,
        )
    }

    /// Creates a boulder at `position`.
    #[must_use]
    pub fn at(position: Vec2, tuning: EnemyTuning) -> Self {
        Self {
            body: Body::new(position, ROCK_SPEED * tuning.speed_scale()),
        }
    }
}

impl Entity for Rock {
    fn kind(&self) -> EntityKind {
        EntityKind::Rock
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.x < 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let half = ROCK_SIZE / 2.0;
        canvas.draw_shape(
            Shape::Oval {
                center: self.body.position + Vec2::splat(half),
                width: ROCK_SIZE,
                height: ROCK_SIZE,
            },
            Color::GRAY,
            true,
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

impl Movable for Rock {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.x -= self.body.speed;
        Ok(())
    }
}

impl Collidable for Rock {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(0.0, 0.0, ROCK_SIZE, ROCK_SIZE)
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        destroyed_by_rover_or_cannon(other, ctx);
        Ok(())
    }
}

/// Flat mine sliding along the ground.
#[derive(Debug)]
pub struct FloorBomb {
    body: Body,
}

impl FloorBomb {
    /// Creates a mine at the right edge of the ground.
    #[must_use]
    pub fn new(tuning: EnemyTuning) -> Self {
        Self {
            body: Body::new(
                Vec2::new(ARENA_WIDTH, ARENA_HEIGHT - 10.0),
                FLOOR_BOMB_SPEED * tuning.speed_scale(),
            ),
        }
    }
}

impl Entity for FloorBomb {
    fn kind(&self) -> EntityKind {
        EntityKind::FloorBomb
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.x < 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let position = self.body.position;
        canvas.draw_shape(
            Shape::Rectangle(Rect::new(
                position.x,
                position.y,
                FLOOR_BOMB_WIDTH,
                FLOOR_BOMB_HEIGHT,
            )),
            Color::YELLOW,
            true,
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

impl Movable for FloorBomb {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.x -= self.body.speed;
        Ok(())
    }
}

impl Collidable for FloorBomb {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(0.0, 0.0, FLOOR_BOMB_WIDTH, FLOOR_BOMB_HEIGHT)
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        destroyed_by_rover_or_cannon(other, ctx);
        Ok(())
    }
}

/// Hole in the ground carried along by world scrolling.
#[derive(Debug)]
pub struct Crater {
    body: Body,
}

impl Crater {
    /// Creates a crater just beyond the right edge of the ground.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Body::new(Vec2::new(ARENA_WIDTH, ARENA_HEIGHT - CRATER_HEIGHT), 0.0),
        }
    }
}

impl Default for Crater {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Crater {
    fn kind(&self) -> EntityKind {
        EntityKind::Crater
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.x + CRATER_WIDTH < 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let position = self.body.position;
        canvas.draw_shape(
            Shape::Rectangle(Rect::new(
                position.x,
                position.y,
                CRATER_WIDTH,
                CRATER_HEIGHT,
            )),
            Color::BLACK,
            true,
        );
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        Some(self)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

impl Collidable for Crater {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(0.0, 0.0, CRATER_WIDTH, CRATER_HEIGHT)
    }

    fn on_collision(
        &mut self,
        _other: &CollisionPeer,
        _ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        Ok(())
    }
}
