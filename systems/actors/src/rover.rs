//! Player-controlled lunar rover.

use std::time::Duration;

use glam::Vec2;
use moon_patrol_core::{
    Canvas, Color, EntityId, EntityKind, Hitbox, InputCode, SimulationError, ARENA_WIDTH,
};
use moon_patrol_system_behavior::{Phase, PhaseMachine};
use moon_patrol_world::{Body, Collidable, CollisionPeer, Entity, FrameContext, Movable};

use crate::{
    projectiles::{ForwardShot, UpwardShot},
    GROUND_LINE,
};

/// Position the rover starts from.
pub const ROVER_START: Vec2 = Vec2::new(200.0, GROUND_LINE);

const ROVER_SPEED: f32 = 2.0;
const ROVER_SCALE: f32 = 0.1;
const ROVER_HITBOX: Hitbox = Hitbox::new(2.0, 0.0, 130.0, 50.0);
const CRUISE_MIN_X: f32 = 100.0;
const CRUISE_MAX_X: f32 = 300.0;
const UPWARD_SHOT_COOLDOWN: Duration = Duration::from_millis(200);
const UPWARD_SHOT_TIMER: &str = "upward-shot";

/// Steps of the jump arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpPhase {
    /// Resting on the ground.
    Grounded,
    /// Ten pixels up, rising.
    Rising10,
    /// Twenty pixels up, rising.
    Rising20,
    /// Thirty pixels up, rising.
    Rising30,
    /// Forty pixels up, rising.
    Rising40,
    /// Highest point of the arc.
    Apex,
    /// Forty pixels up, falling.
    Falling40,
    /// Thirty pixels up, falling.
    Falling30,
    /// Twenty pixels up, falling.
    Falling20,
    /// Ten pixels up, falling.
    Falling10,
}

impl JumpPhase {
    /// Vertical offset from the ground line.
    #[must_use]
    pub const fn lift(self) -> f32 {
        match self {
            Self::Grounded => 0.0,
            Self::Rising10 | Self::Falling10 => -10.0,
            Self::Rising20 | Self::Falling20 => -20.0,
            Self::Rising30 | Self::Falling30 => -30.0,
            Self::Rising40 | Self::Falling40 => -40.0,
            Self::Apex => -50.0,
        }
    }
}

impl Phase for JumpPhase {
    const MACHINE: &'static str = "jump";
    const SEQUENCE: &'static [Self] = &[
        Self::Grounded,
        Self::Rising10,
        Self::Rising20,
        Self::Rising30,
        Self::Rising40,
        Self::Apex,
        Self::Falling40,
        Self::Falling30,
        Self::Falling20,
        Self::Falling10,
    ];

    fn dwell(self) -> Duration {
        Duration::from_millis(60)
    }
}

/// Steps of the damage sequence played after running into a ground hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamagePhase {
    /// Undamaged.
    Intact,
    /// First damage frame.
    Damaged1,
    /// Second damage frame.
    Damaged2,
    /// Wreck shown before the rover recovers.
    Wrecked,
}

impl DamagePhase {
    const fn glyph(self) -> (&'static str, f32) {
        match self {
            Self::Intact | Self::Wrecked => ("X", 50.0),
            Self::Damaged1 => ("Y", 90.0),
            Self::Damaged2 => ("Z", 130.0),
        }
    }
}

impl Phase for DamagePhase {
    const MACHINE: &'static str = "damage";
    const SEQUENCE: &'static [Self] = &[Self::Intact, Self::Damaged1, Self::Damaged2, Self::Wrecked];

    fn dwell(self) -> Duration {
        match self {
            Self::Intact => Duration::ZERO,
            Self::Damaged1 => Duration::from_millis(100),
            Self::Damaged2 => Duration::from_millis(200),
            Self::Wrecked => Duration::from_millis(1_000),
        }
    }
}

/// Player vehicle driving along the ground.
#[derive(Debug)]
pub struct Rover {
    body: Body,
    wheel_rotation: f32,
    jump: PhaseMachine<JumpPhase>,
    damage: PhaseMachine<DamagePhase>,
    forward_shot: Option<EntityId>,
}

impl Rover {
    /// Creates a rover resting at [`ROVER_START`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Body::new(ROVER_START, ROVER_SPEED).with_scale(ROVER_SCALE),
            wheel_rotation: 0.0,
            jump: PhaseMachine::new(),
            damage: PhaseMachine::new(),
            forward_shot: None,
        }
    }

    /// Current step of the jump arc.
    #[must_use]
    pub fn jump_phase(&self) -> JumpPhase {
        self.jump.current().unwrap_or(JumpPhase::Grounded)
    }

    /// Current step of the damage sequence.
    #[must_use]
    pub fn damage_phase(&self) -> DamagePhase {
        self.damage.current().unwrap_or(DamagePhase::Intact)
    }

    fn steer(&mut self, ctx: &FrameContext<'_, '_>) {
        let max_x = ARENA_WIDTH - ROVER_HITBOX.size().x;
        let position = &mut self.body.position;
        if ctx.is_pressed(InputCode::Left) {
            position.x -= self.body.speed;
        }
        if ctx.is_pressed(InputCode::Right) {
            position.x += self.body.speed;
        }
        position.x = position.x.clamp(0.0, max_x);
    }

    fn shoot(&mut self, ctx: &mut FrameContext<'_, '_>) {
        let owner = ctx.owner();
        let origin = self.body.position;
        if !ctx.timers().timer_is_active(owner, UPWARD_SHOT_TIMER) {
            ctx.timers()
                .activate_timer(owner, UPWARD_SHOT_TIMER, UPWARD_SHOT_COOLDOWN);
            let _ = ctx.spawn(Box::new(UpwardShot::new(origin)));
        }

        let reloaded = self.forward_shot.map_or(true, |id| !ctx.is_live(id));
        if reloaded {
            self.forward_shot = Some(ctx.spawn(Box::new(ForwardShot::new(origin))));
        }
    }
}

impl Default for Rover {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Rover {
    fn kind(&self) -> EntityKind {
        EntityKind::Rover
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.steer(ctx);
        if ctx.is_pressed(InputCode::Jump) {
            self.jump.trigger();
        }
        if ctx.is_pressed(InputCode::Shoot) {
            self.shoot(ctx);
        }
        let owner = ctx.owner();
        if let Some(DamagePhase::Wrecked) = self.damage.drive(owner, ctx.timers())? {
            log::debug!("rover {} wrecked", ctx.id());
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let position = self.body.position;
        let scale = self.body.scale;
        canvas.draw_image("rover", position, scale, 0.0);
        for (offset, base) in [
            (Vec2::new(2.0, 24.0), 150.0),
            (Vec2::new(32.0, 24.0), 0.0),
            (Vec2::new(100.0, 24.0), 100.0),
        ] {
            canvas.draw_image("tire", position + offset, scale, base + self.wheel_rotation * 2.0);
        }
        if self.damage.is_running() {
            let (glyph, size) = self.damage_phase().glyph();
            canvas.draw_text(glyph, position, size, Color::WHITE, 0.0);
        }
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

impl Movable for Rover {
    fn update_position(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        let position = &mut self.body.position;
        if position.x < CRUISE_MIN_X {
            position.x += 1.0;
        } else if position.x >= CRUISE_MAX_X {
            position.x -= 1.0;
        }

        let owner = ctx.owner();
        let _ = self.jump.drive(owner, ctx.timers())?;
        self.body.position.y = GROUND_LINE + self.jump_phase().lift();
        self.wheel_rotation = (self.wheel_rotation + self.body.speed) % 360.0;
        Ok(())
    }
}

impl Collidable for Rover {
    fn hitbox(&self) -> Hitbox {
        ROVER_HITBOX
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        match other.kind {
            EntityKind::Bomb => {
                log::debug!("rover {} struck by bomb {}", ctx.id(), other.id);
                ctx.raise_game_over();
                ctx.destroy_self();
            }
            kind if kind.is_ground_hazard() => self.damage.trigger(),
            _ => {}
        }
        Ok(())
    }
}
