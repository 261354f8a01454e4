#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Moon Patrol.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Each frame the adapter polls the keyboard, lets the caller record the
//! frame into a [`DrawList`] and replays the recorded commands through a
//! letterboxed [`Viewport`].

mod sprites;

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::{
    color::Color as MacroquadColor,
    input::{is_key_down, is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
};
use moon_patrol_core::{Color, DrawCommand, DrawList, InputCode, Shape};
use moon_patrol_rendering::{
    normalized_channels, FrameInput, Presentation, RenderingBackend, Viewport,
};
use std::{
    collections::HashSet,
    f32::consts::TAU,
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use self::sprites::SpriteAtlas;

/// Keys polled every frame and the input code each one produces.
pub const KEY_BINDINGS: [(KeyCode, InputCode); 5] = [
    (KeyCode::Left, InputCode::Left),
    (KeyCode::Right, InputCode::Right),
    (KeyCode::Space, InputCode::Jump),
    (KeyCode::Up, InputCode::Jump),
    (KeyCode::D, InputCode::Shoot),
];

const PLACEHOLDER_SIZE: f32 = 40.0;
const OUTLINE_THICKNESS: f32 = 2.0;
const ELLIPSE_SEGMENTS: usize = 24;

/// Builds the frame input from the keys reported as held by `is_down`.
#[must_use]
pub fn frame_input_from(is_down: impl Fn(KeyCode) -> bool) -> FrameInput {
    FrameInput::from_pressed(
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| is_down(*key))
            .map(|(_, code)| *code),
    )
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    sprite_manifest: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Loads sprites from the manifest at `path` when the window opens.
    ///
    /// Without a manifest every image is drawn as an outlined placeholder.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.sprite_manifest = path;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut DrawList) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            arena,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: arena.x.round() as i32,
            window_height: arena.y.round() as i32,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let sprite_atlas = match sprite_manifest {
                Some(path) => match SpriteAtlas::from_manifest_path(&path)
                    .with_context(|| format!("failed to initialise sprite atlas from {}", path.display()))
                {
                    Ok(atlas) => {
                        log::info!("loaded {} sprites", atlas.texture_count());
                        Some(atlas)
                    }
                    Err(error) => {
                        let _ = outcome_sender.send(Err(error));
                        return;
                    }
                },
                None => None,
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut missing_sprites = HashSet::new();
            let mut canvas = DrawList::new();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let input = frame_input_from(is_key_down);

                canvas.clear();
                let simulation_start = Instant::now();
                if let Err(error) = update(frame_dt, input, &mut canvas) {
                    let _ = outcome_sender.send(Err(error));
                    return;
                }
                let simulation = simulation_start.elapsed();

                macroquad::window::clear_background(background);
                let window = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let render_start = Instant::now();
                match Viewport::fit(arena, window) {
                    Ok(viewport) => {
                        replay(&canvas, &viewport, sprite_atlas.as_ref(), &mut missing_sprites)
                    }
                    Err(error) => log::debug!("skipping frame: {error}"),
                }
                let render = render_start.elapsed();

                let breakdown = FrameBreakdown {
                    frame: frame_dt,
                    simulation,
                    render,
                };
                if let Some(FpsMetrics {
                    per_second,
                    avg_simulation,
                    avg_render,
                }) = fps_counter.record_frame(breakdown)
                {
                    if show_fps {
                        log::info!(
                            "FPS: {:.2} | sim: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }

            let _ = outcome_sender.send(Ok(()));
        });

        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))
    }
}

fn replay(
    canvas: &DrawList,
    viewport: &Viewport,
    atlas: Option<&SpriteAtlas>,
    missing_sprites: &mut HashSet<String>,
) {
    for command in canvas.iter() {
        match command {
            DrawCommand::Image {
                sprite,
                position,
                scale,
                rotation,
            } => match atlas.filter(|atlas| atlas.contains(sprite)) {
                Some(atlas) => atlas.draw(
                    sprite,
                    viewport.to_window(*position),
                    viewport.length(*scale),
                    *rotation,
                ),
                None => {
                    if missing_sprites.insert(sprite.clone()) {
                        log::warn!("sprite `{sprite}` is not loaded; drawing a placeholder");
                    }
                    draw_placeholder(sprite, *position, viewport);
                }
            },
            DrawCommand::Shape {
                shape,
                color,
                filled,
            } => draw_shape(shape, *color, *filled, viewport),
            DrawCommand::Text {
                text,
                position,
                size,
                color,
                ..
            } => {
                let anchor = viewport.to_window(*position);
                let font_size = viewport.length(*size);
                let _ = macroquad::text::draw_text(
                    text,
                    anchor.x,
                    anchor.y + font_size,
                    font_size,
                    to_macroquad_color(*color),
                );
            }
        }
    }
}

fn draw_placeholder(sprite: &str, position: Vec2, viewport: &Viewport) {
    let corner = viewport.to_window(position);
    let size = viewport.length(PLACEHOLDER_SIZE);
    let color = to_macroquad_color(Color::GRAY);
    macroquad::shapes::draw_rectangle_lines(
        corner.x,
        corner.y,
        size,
        size,
        OUTLINE_THICKNESS,
        color,
    );
    let _ = macroquad::text::draw_text(sprite, corner.x, corner.y - 2.0, 16.0, color);
}

fn draw_shape(shape: &Shape, color: Color, filled: bool, viewport: &Viewport) {
    let color = to_macroquad_color(color);
    match shape {
        Shape::Rectangle(rect) => {
            let corner = viewport.to_window(Vec2::new(rect.x, rect.y));
            let width = viewport.length(rect.width);
            let height = viewport.length(rect.height);
            if filled {
                macroquad::shapes::draw_rectangle(corner.x, corner.y, width, height, color);
            } else {
                macroquad::shapes::draw_rectangle_lines(
                    corner.x,
                    corner.y,
                    width,
                    height,
                    OUTLINE_THICKNESS,
                    color,
                );
            }
        }
        Shape::Oval {
            center,
            width,
            height,
        } => {
            let center = viewport.to_window(*center);
            let outline = ellipse_outline(
                center,
                viewport.length(*width),
                viewport.length(*height),
                ELLIPSE_SEGMENTS,
            );
            for (index, start) in outline.iter().enumerate() {
                let end = outline[(index + 1) % outline.len()];
                if filled {
                    macroquad::shapes::draw_triangle(
                        to_macroquad_vec(center),
                        to_macroquad_vec(*start),
                        to_macroquad_vec(end),
                        color,
                    );
                } else {
                    macroquad::shapes::draw_line(
                        start.x,
                        start.y,
                        end.x,
                        end.y,
                        OUTLINE_THICKNESS,
                        color,
                    );
                }
            }
        }
        Shape::Line { from, to } => {
            let from = viewport.to_window(*from);
            let to = viewport.to_window(*to);
            macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, OUTLINE_THICKNESS, color);
        }
    }
}

/// Points on the outline of an axis-aligned ellipse, counter-clockwise from its rightmost point.
fn ellipse_outline(center: Vec2, width: f32, height: f32, segments: usize) -> Vec<Vec2> {
    let segments = segments.max(3);
    let radii = Vec2::new(width, height) / 2.0;
    (0..segments)
        .map(|index| {
            let angle = TAU * index as f32 / segments as f32;
            center + Vec2::new(angle.cos(), -angle.sin()) * radii
        })
        .collect()
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

fn to_macroquad_color(color: Color) -> MacroquadColor {
    let [red, green, blue, alpha] = normalized_channels(color);
    MacroquadColor::new(red, green, blue, alpha)
}
