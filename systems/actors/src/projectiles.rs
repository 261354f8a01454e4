//! Shots fired by the rover and bombs dropped by saucers.

use glam::Vec2;
use moon_patrol_core::{
    Canvas, Color, EntityKind, Hitbox, Rect, Shape, SimulationError, ARENA_HEIGHT,
};
use moon_patrol_world::{Body, Collidable, CollisionPeer, Entity, FrameContext, Movable};

const UPWARD_MUZZLE: Vec2 = Vec2::new(70.0, -20.0);
const UPWARD_SPEED: f32 = 3.0;
const UPWARD_HITBOX: Hitbox = Hitbox::new(0.0, 0.0, 6.0, 16.0);

const FORWARD_MUZZLE: Vec2 = Vec2::new(110.0, 0.0);
const FORWARD_SPEED: f32 = 1.5;
const FORWARD_RANGE: f32 = 300.0;
const FORWARD_HITBOX: Hitbox = Hitbox::new(0.0, 0.0, 24.0, 50.0);

const BOMB_SIZE: f32 = 15.0;
const BOMB_SPEED: f32 = 1.0;

/// Anti-air shot climbing from the rover's turret.
#[derive(Debug)]
pub struct UpwardShot {
    body: Body,
}

impl UpwardShot {
    /// Creates a shot fired by a rover standing at `rover`.
    #[must_use]
    pub fn new(rover: Vec2) -> Self {
        Self {
            body: Body::new(rover + UPWARD_MUZZLE, UPWARD_SPEED),
        }
    }
}

impl Entity for UpwardShot {
    fn kind(&self) -> EntityKind {
        EntityKind::UpwardShot
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.y + UPWARD_HITBOX.size().y < 0.0 {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_shape(
            Shape::Rectangle(UPWARD_HITBOX.placed_at(self.body.position)),
            Color::WHITE,
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

impl Movable for UpwardShot {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.y -= self.body.speed;
        Ok(())
    }
}

impl Collidable for UpwardShot {
    fn hitbox(&self) -> Hitbox {
        UPWARD_HITBOX
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        if other.kind.is_flyer() || other.kind == EntityKind::Bomb {
            ctx.destroy_self();
        }
        Ok(())
    }
}

/// Cannon shot travelling a fixed distance ahead of the rover.
#[derive(Debug)]
pub struct ForwardShot {
    body: Body,
    limit_x: f32,
}

impl ForwardShot {
    /// Creates a shot fired by a rover standing at `rover`.
    ///
    /// The firing position is copied, so the range does not follow the rover.
    #[must_use]
    pub fn new(rover: Vec2) -> Self {
        Self {
            body: Body::new(rover + FORWARD_MUZZLE, FORWARD_SPEED),
            limit_x: rover.x + FORWARD_RANGE,
        }
    }
}

impl Entity for ForwardShot {
    fn kind(&self) -> EntityKind {
        EntityKind::ForwardShot
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.x > self.limit_x {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_text("-O", self.body.position, 30.0, Color::RED, 0.0);
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

impl Movable for ForwardShot {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.x += self.body.speed;
        Ok(())
    }
}

impl Collidable for ForwardShot {
    fn hitbox(&self) -> Hitbox {
        FORWARD_HITBOX
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        if matches!(other.kind, EntityKind::Rock | EntityKind::FloorBomb) {
            ctx.destroy_self();
        }
        Ok(())
    }
}

/// Bomb falling from a saucer.
#[derive(Debug)]
pub struct Bomb {
    body: Body,
}

impl Bomb {
    /// Creates a bomb released at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            body: Body::new(position, BOMB_SPEED),
        }
    }
}

impl Entity for Bomb {
    fn kind(&self) -> EntityKind {
        EntityKind::Bomb
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.body.position.y > ARENA_HEIGHT {
            ctx.destroy_self();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let position = self.body.position;
        canvas.draw_shape(
            Shape::Rectangle(Rect::new(position.x, position.y, BOMB_SIZE, BOMB_SIZE)),
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

impl Movable for Bomb {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.y += self.body.speed;
        Ok(())
    }
}

impl Collidable for Bomb {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(0.0, 0.0, BOMB_SIZE, BOMB_SIZE)
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        if matches!(other.kind, EntityKind::Rover | EntityKind::UpwardShot) {
            ctx.destroy_self();
        }
        Ok(())
    }
}
