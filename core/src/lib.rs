#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Moon Patrol runtime.
//!
//! This crate defines the vocabulary that connects the entity registry, the
//! concrete actors, the gameplay orchestrator and the presentation adapters.
//! Entities are identified by [`EntityId`] and tagged with an [`EntityKind`];
//! collisions are resolved over [`Rect`] values derived from each entity's
//! [`Hitbox`]; drawing happens exclusively through the narrow [`Canvas`]
//! contract, whose recording implementation [`DrawList`] is replayed by the
//! rendering adapters. Level content and gameplay tuning are plain
//! deserialisable descriptors consumed read-only by the orchestrator.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Moon Patrol";

/// Width of the playable arena measured in pixels.
pub const ARENA_WIDTH: f32 = 960.0;

/// Height of the playable arena measured in pixels.
pub const ARENA_HEIGHT: f32 = 540.0;

/// Hard cap on the number of live entities held by the registry.
pub const ENTITY_CAP: usize = 2000;

/// Unique identifier allocated to an entity when it is handed to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of entity kinds known to the runtime.
///
/// Collision reactions switch on this tag instead of inspecting concrete types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Player-controlled lunar rover.
    Rover,
    /// Saucer that wanders the sky and drops bombs.
    Ufo,
    /// Spinning flyer that wanders the sky.
    Triangle,
    /// Boulder rolling toward the rover along the ground.
    Rock,
    /// Flat mine sliding along the ground.
    FloorBomb,
    /// Hole in the ground that scrolls with the world.
    Crater,
    /// Anti-air shot fired upwards by the rover.
    UpwardShot,
    /// Cannon shot fired forwards by the rover.
    ForwardShot,
    /// Bomb dropped by a saucer.
    Bomb,
    /// Full-screen star backdrop.
    Stars,
    /// Level skyline drawn behind the ground.
    Skyline,
    /// Text overlay presenting announcements.
    Overlay,
}

impl EntityKind {
    /// Human readable label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rover => "rover",
            Self::Ufo => "ufo",
            Self::Triangle => "triangle",
            Self::Rock => "rock",
            Self::FloorBomb => "floor bomb",
            Self::Crater => "crater",
            Self::UpwardShot => "upward shot",
            Self::ForwardShot => "forward shot",
            Self::Bomb => "bomb",
            Self::Stars => "stars",
            Self::Skyline => "skyline",
            Self::Overlay => "overlay",
        }
    }

    /// Reports whether the kind is an airborne enemy.
    #[must_use]
    pub const fn is_flyer(self) -> bool {
        matches!(self, Self::Ufo | Self::Triangle)
    }

    /// Reports whether the kind is a ground hazard that damages the rover.
    #[must_use]
    pub const fn is_ground_hazard(self) -> bool {
        matches!(self, Self::Rock | Self::FloorBomb | Self::Crater)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Enemy kinds that levels may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    /// Bomb-dropping saucer.
    Ufo,
    /// Spinning flyer.
    Triangle,
    /// Rolling boulder.
    Rock,
    /// Sliding ground mine.
    FloorBomb,
    /// Scrolling hole in the ground.
    Crater,
}

impl SpawnKind {
    /// Name of the orchestrator timer that throttles spawns of this kind.
    #[must_use]
    pub const fn timer_name(self) -> &'static str {
        match self {
            Self::Ufo => "spawn-ufo",
            Self::Triangle => "spawn-triangle",
            Self::Rock => "spawn-rock",
            Self::FloorBomb => "spawn-floor-bomb",
            Self::Crater => "spawn-crater",
        }
    }
}

impl From<SpawnKind> for EntityKind {
    fn from(kind: SpawnKind) -> Self {
        match kind {
            SpawnKind::Ufo => Self::Ufo,
            SpawnKind::Triangle => Self::Triangle,
            SpawnKind::Rock => Self::Rock,
            SpawnKind::FloorBomb => Self::FloorBomb,
            SpawnKind::Crater => Self::Crater,
        }
    }
}

/// Input codes produced by adapters and consumed by the player controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputCode {
    /// Drive toward the left edge.
    Left,
    /// Drive toward the right edge.
    Right,
    /// Start a jump.
    Jump,
    /// Fire both cannons.
    Shoot,
}

/// Axis-aligned rectangle expressed in arena pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    /// Left edge of the rectangle.
    pub x: f32,
    /// Top edge of the rectangle.
    pub y: f32,
    /// Horizontal extent of the rectangle.
    pub width: f32,
    /// Vertical extent of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge of the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge of the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Reports whether the rectangle encloses a positive area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Tests whether two rectangles overlap.
    ///
    /// Rectangles that merely share an edge do not overlap, and a rectangle
    /// without area never overlaps anything.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.has_area()
            && other.has_area()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Collision box fixed at construction and positioned relative to an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    offset: Vec2,
    size: Vec2,
}

impl Hitbox {
    /// Creates a hitbox with the provided offset from the owner's position and size.
    #[must_use]
    pub const fn new(offset_x: f32, offset_y: f32, width: f32, height: f32) -> Self {
        Self {
            offset: Vec2::new(offset_x, offset_y),
            size: Vec2::new(width, height),
        }
    }

    /// Offset of the box's top-left corner from the owner's position.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Width and height of the box.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Places the hitbox at the provided owner position.
    #[must_use]
    pub fn placed_at(&self, position: Vec2) -> Rect {
        let origin = position + self.offset;
        Rect::new(origin.x, origin.y, self.size.x, self.size.y)
    }
}

/// Opaque RGBA color used by draw commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Color {
    /// Pure white.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);
    /// Pure black.
    pub const BLACK: Self = Self::from_rgb(0x00, 0x00, 0x00);
    /// Signal red.
    pub const RED: Self = Self::from_rgb(0xff, 0x00, 0x00);
    /// Signal green.
    pub const GREEN: Self = Self::from_rgb(0x00, 0xff, 0x00);
    /// Signal yellow.
    pub const YELLOW: Self = Self::from_rgb(0xff, 0xff, 0x00);
    /// Neutral gray.
    pub const GRAY: Self = Self::from_rgb(0x80, 0x80, 0x80);

    /// Creates an opaque color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 0xff)
    }

    /// Creates a color from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }
}

/// Geometric primitive understood by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rectangle(Rect),
    /// Ellipse centred on a point.
    Oval {
        /// Centre of the ellipse.
        center: Vec2,
        /// Horizontal diameter.
        width: f32,
        /// Vertical diameter.
        height: f32,
    },
    /// Straight line segment.
    Line {
        /// Start of the segment.
        from: Vec2,
        /// End of the segment.
        to: Vec2,
    },
}

/// Narrow renderer contract consumed by entity draw hooks.
pub trait Canvas {
    /// Draws a named image with its top-left corner at `position`.
    fn draw_image(&mut self, sprite: &str, position: Vec2, scale: f32, rotation: f32);

    /// Draws a geometric primitive.
    fn draw_shape(&mut self, shape: Shape, color: Color, filled: bool);

    /// Draws a line of text with its top-left corner at `position`.
    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: Color, rotation: f32);
}

/// Single recorded renderer call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Image blit.
    Image {
        /// Sprite identifier resolved by the adapter.
        sprite: String,
        /// Top-left corner in arena pixels.
        position: Vec2,
        /// Uniform scale where `1.0` is the image's native size.
        scale: f32,
        /// Rotation in degrees.
        rotation: f32,
    },
    /// Geometric primitive.
    Shape {
        /// Primitive to draw.
        shape: Shape,
        /// Stroke or fill color.
        color: Color,
        /// Whether the primitive is filled.
        filled: bool,
    },
    /// Line of text.
    Text {
        /// Text content.
        text: String,
        /// Top-left corner in arena pixels.
        position: Vec2,
        /// Font size in pixels.
        size: f32,
        /// Text color.
        color: Color,
        /// Rotation in degrees.
        rotation: f32,
    },
}

/// Canvas that records draw calls so adapters can replay them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Creates an empty draw list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every recorded command while keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Iterator over the recorded commands in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Reports whether no command has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Consumes the list, yielding the recorded commands.
    #[must_use]
    pub fn into_vec(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Canvas for DrawList {
    fn draw_image(&mut self, sprite: &str, position: Vec2, scale: f32, rotation: f32) {
        self.commands.push(DrawCommand::Image {
            sprite: sprite.to_owned(),
            position,
            scale,
            rotation,
        });
    }

    fn draw_shape(&mut self, shape: Shape, color: Color, filled: bool) {
        self.commands.push(DrawCommand::Shape {
            shape,
            color,
            filled,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: Color, rotation: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            size,
            color,
            rotation,
        });
    }
}

/// Message the orchestrator asks the overlay to present.
///
/// The serial distinguishes two consecutive announcements carrying the same
/// text, so presenters restart their display timer for each one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    serial: u64,
    text: String,
    duration: Duration,
}

impl Announcement {
    /// Creates an announcement shown for the provided duration.
    #[must_use]
    pub fn new(serial: u64, text: impl Into<String>, duration: Duration) -> Self {
        Self {
            serial,
            text: text.into(),
            duration,
        }
    }

    /// Serial number assigned by the publisher.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Text presented to the player.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How long the text stays visible.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Difficulty preset applied to spawn cadences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Relaxed cadence: spawn intervals are doubled.
    Easy,
    /// Cadence exactly as authored by the level.
    #[default]
    Standard,
}

impl Difficulty {
    /// Scales an authored spawn interval for this difficulty.
    #[must_use]
    pub fn scale_interval(self, interval: Duration) -> Duration {
        match self {
            Self::Easy => interval.saturating_mul(2),
            Self::Standard => interval,
        }
    }
}

/// Tuning of the gameplay orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Time each level stays active before the next one is loaded.
    pub level_duration_ms: u64,
    /// Delay between the player's defeat and the reset of the campaign.
    pub game_over_delay_ms: u64,
    /// Time announcements stay on screen.
    pub banner_duration_ms: u64,
    /// Horizontal distance the world scrolls per frame unless a level overrides it.
    pub scroll_speed: f32,
    /// Hard cap on live entities.
    pub entity_cap: usize,
    /// Seed for the deterministic random number generator.
    pub seed: u64,
    /// Difficulty preset applied to spawn cadences.
    pub difficulty: Difficulty,
}

impl GameplayConfig {
    /// Time each level stays active.
    #[must_use]
    pub const fn level_duration(&self) -> Duration {
        Duration::from_millis(self.level_duration_ms)
    }

    /// Delay between defeat and reset.
    #[must_use]
    pub const fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }

    /// Time announcements stay on screen.
    #[must_use]
    pub const fn banner_duration(&self) -> Duration {
        Duration::from_millis(self.banner_duration_ms)
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            level_duration_ms: 60_000,
            game_over_delay_ms: 2_000,
            banner_duration_ms: 2_000,
            scroll_speed: 2.0,
            entity_cap: ENTITY_CAP,
            seed: 0x6d6f_6f6e_7061_7472,
            difficulty: Difficulty::Standard,
        }
    }
}

/// Skyline image drawn behind the ground of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkylineDescriptor {
    /// Sprite identifier of the skyline image.
    pub sprite: String,
    /// Width of the image in pixels, used for horizontal wrapping.
    pub width: f32,
    /// Height of the image in pixels, used to anchor it to the bottom edge.
    pub height: f32,
}

/// Number of enemies of one kind spawned when a level starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Enemy kind to spawn.
    pub kind: SpawnKind,
    /// Number of instances.
    pub count: u32,
}

/// Recurring spawn of one enemy kind while a level is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Enemy kind to spawn.
    pub kind: SpawnKind,
    /// Authored time between two spawns.
    pub interval_ms: u64,
}

impl SpawnRule {
    /// Creates a spawn rule.
    ///
    /// Intervals beyond `u64::MAX` milliseconds saturate.
    #[must_use]
    pub fn new(kind: SpawnKind, interval: Duration) -> Self {
        Self {
            kind,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Authored time between two spawns.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Read-only description of a single level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Name announced when the level starts.
    pub name: String,
    /// Optional skyline drawn behind the ground.
    #[serde(default)]
    pub skyline: Option<SkylineDescriptor>,
    /// Enemies spawned as soon as the level starts.
    #[serde(default)]
    pub opening_wave: Vec<WaveEntry>,
    /// Enemies spawned periodically while the level is active.
    #[serde(default)]
    pub spawns: Vec<SpawnRule>,
    /// Overrides the configured world scroll speed.
    #[serde(default)]
    pub scroll_speed: Option<f32>,
    /// Multiplier applied to enemy speeds.
    #[serde(default = "default_enemy_speed_scale")]
    pub enemy_speed_scale: f32,
    /// Bombs dropped per second by each saucer.
    #[serde(default = "default_enemy_shots_per_second")]
    pub enemy_shots_per_second: f32,
}

fn default_enemy_speed_scale() -> f32 {
    1.0
}

fn default_enemy_shots_per_second() -> f32 {
    1.0
}

impl LevelDescriptor {
    /// Creates an empty level with default enemy tuning.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skyline: None,
            opening_wave: Vec::new(),
            spawns: Vec::new(),
            scroll_speed: None,
            enemy_speed_scale: default_enemy_speed_scale(),
            enemy_shots_per_second: default_enemy_shots_per_second(),
        }
    }

    /// Attaches a skyline to the level.
    #[must_use]
    pub fn with_skyline(mut self, sprite: impl Into<String>, width: f32, height: f32) -> Self {
        self.skyline = Some(SkylineDescriptor {
            sprite: sprite.into(),
            width,
            height,
        });
        self
    }

    /// Adds enemies spawned when the level starts.
    #[must_use]
    pub fn with_opening_wave(mut self, kind: SpawnKind, count: u32) -> Self {
        self.opening_wave.push(WaveEntry { kind, count });
        self
    }

    /// Adds a recurring spawn rule.
    #[must_use]
    pub fn with_spawn(mut self, kind: SpawnKind, interval: Duration) -> Self {
        self.spawns.push(SpawnRule::new(kind, interval));
        self
    }

    /// Overrides the world scroll speed while the level is active.
    #[must_use]
    pub fn with_scroll_speed(mut self, scroll_speed: f32) -> Self {
        self.scroll_speed = Some(scroll_speed);
        self
    }
}

/// Failures that terminate or reject a simulation step.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The registry grew beyond its hard cap, which signals a runaway spawn defect.
    #[error("too many entities: {count} live entities exceed the cap of {cap}")]
    TooManyEntities {
        /// Number of live entities after applying buffered changes.
        count: usize,
        /// Configured cap.
        cap: usize,
    },
    /// A behavior state machine was driven into a phase outside its sequence.
    #[error("state machine `{machine}` has no phase {phase}")]
    UnknownPhase {
        /// Name of the machine.
        machine: &'static str,
        /// Debug rendering of the rejected phase.
        phase: String,
    },
    /// The orchestrator was constructed without any level.
    #[error("no levels are available")]
    NoLevels,
}
