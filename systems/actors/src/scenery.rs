//! Backdrops and the announcement overlay.

use glam::Vec2;
use moon_patrol_core::{
    Canvas, Color, EntityKind, SimulationError, SkylineDescriptor, ARENA_HEIGHT, ARENA_WIDTH,
};
use moon_patrol_world::{Body, Entity, FrameContext, Movable};

const OVERLAY_TIMER: &str = "message";
const OVERLAY_FONT_SIZE: f32 = 50.0;

/// Star field pinned behind everything else.
///
/// It is movable with a stationary position update, so world scrolling leaves
/// it in place.
#[derive(Debug)]
pub struct Stars {
    body: Body,
}

impl Stars {
    /// Creates the star field covering the arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Body::new(Vec2::ZERO, 0.0),
        }
    }
}

impl Default for Stars {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Stars {
    fn kind(&self) -> EntityKind {
        EntityKind::Stars
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_image("stars", self.body.position, self.body.scale, 0.0);
    }

    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        Some(self)
    }
}

impl Movable for Stars {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// Level skyline anchored to the bottom edge and scrolled by the world.
#[derive(Debug)]
pub struct Skyline {
    body: Body,
    sprite: String,
    width: f32,
}

impl Skyline {
    /// Creates the skyline described by a level.
    #[must_use]
    pub fn new(descriptor: &SkylineDescriptor) -> Self {
        Self {
            body: Body::new(Vec2::new(0.0, ARENA_HEIGHT - descriptor.height), 0.0),
            sprite: descriptor.sprite.clone(),
            width: descriptor.width,
        }
    }
}

impl Entity for Skyline {
    fn kind(&self) -> EntityKind {
        EntityKind::Skyline
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        if self.width > 0.0 {
            self.body.position.x = self.body.position.x.rem_euclid(self.width) - self.width;
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.width <= 0.0 {
            canvas.draw_image(&self.sprite, self.body.position, self.body.scale, 0.0);
            return;
        }
        let mut x = self.body.position.x;
        while x < ARENA_WIDTH {
            canvas.draw_image(
                &self.sprite,
                Vec2::new(x, self.body.position.y),
                self.body.scale,
                0.0,
            );
            x += self.width;
        }
    }
}

/// Centred text presenting the orchestrator's announcements.
///
/// Like [`Stars`] it is movable with a stationary position update, so the
/// text stays centred while the world scrolls.
#[derive(Debug)]
pub struct Overlay {
    body: Body,
    seen: Option<u64>,
    text: String,
    visible: bool,
}

impl Overlay {
    /// Creates an overlay with nothing to show.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Body::new(
                Vec2::new(
                    ARENA_WIDTH / 2.0 - OVERLAY_FONT_SIZE * 4.0,
                    ARENA_HEIGHT / 2.0 - OVERLAY_FONT_SIZE / 2.0,
                ),
                0.0,
            ),
            seen: None,
            text: String::new(),
            visible: false,
        }
    }

    /// Text of the most recent announcement picked up by the overlay.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reports whether the text is currently drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Overlay {
    fn kind(&self) -> EntityKind {
        EntityKind::Overlay
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        let owner = ctx.owner();
        let fresh = ctx
            .announcement()
            .filter(|announcement| self.seen != Some(announcement.serial()))
            .map(|announcement| {
                (
                    announcement.serial(),
                    announcement.text().to_owned(),
                    announcement.duration(),
                )
            });
        if let Some((serial, text, duration)) = fresh {
            self.seen = Some(serial);
            self.text = text;
            ctx.timers().activate_timer(owner, OVERLAY_TIMER, duration);
        }
        self.visible = ctx.timers().timer_is_active(owner, OVERLAY_TIMER);
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.visible {
            canvas.draw_text(
                &self.text,
                self.body.position,
                OVERLAY_FONT_SIZE,
                Color::WHITE,
                0.0,
            );
        }
    }

    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        Some(self)
    }
}

impl Movable for Overlay {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        Ok(())
    }
}
