#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Moon Patrol adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use moon_patrol_core::{Color, DrawList, InputCode, ARENA_HEIGHT, ARENA_WIDTH};
use std::{error::Error, fmt, time::Duration};

/// Converts a byte color into floating point channels in the range 0.0..=1.0.
#[must_use]
pub fn normalized_channels(color: Color) -> [f32; 4] {
    [
        f32::from(color.red()) / 255.0,
        f32::from(color.green()) / 255.0,
        f32::from(color.blue()) / 255.0,
        f32::from(color.alpha()) / 255.0,
    ]
}

/// Input snapshot gathered by adapters before advancing the simulation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Input codes held down during this frame, without duplicates.
    pub pressed: Vec<InputCode>,
}

impl FrameInput {
    /// Creates an input snapshot from the held codes, dropping duplicates.
    #[must_use]
    pub fn from_pressed(codes: impl IntoIterator<Item = InputCode>) -> Self {
        let mut pressed = Vec::new();
        for code in codes {
            if !pressed.contains(&code) {
                pressed.push(code);
            }
        }
        Self { pressed }
    }
}

/// Letterboxed transform from arena pixels to window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Viewport {
    /// Fits an arena of size `arena` into a window of size `window`, preserving its aspect ratio.
    pub fn fit(arena: Vec2, window: Vec2) -> Result<Self, RenderingError> {
        if !(arena.x > 0.0 && arena.y > 0.0) {
            return Err(RenderingError::InvalidArena { size: arena });
        }
        if !(window.x > 0.0 && window.y > 0.0) {
            return Err(RenderingError::InvalidWindow { size: window });
        }

        let scale = (window.x / arena.x).min(window.y / arena.y);
        let offset = (window - arena * scale) / 2.0;
        Ok(Self { scale, offset })
    }

    /// Uniform arena-to-window scale factor.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Window-space position of the arena's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Maps an arena position into window space.
    #[must_use]
    pub fn to_window(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    /// Maps an arena length into window space.
    #[must_use]
    pub fn length(&self, length: f32) -> f32 {
        length * self.scale
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Size of the simulated arena in pixels.
    pub arena: Vec2,
}

impl Presentation {
    /// Constructs a presentation of the standard arena.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            arena: Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
        }
    }
}

/// Rendering backend capable of presenting Moon Patrol frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update` closure receives the real frame delta and the
    /// input captured by the adapter, and records the frame into the supplied
    /// draw list. An error returned by `update` stops the loop and is returned
    /// from `run`.
    fn run<F>(self, presentation: Presentation, update: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut DrawList) -> AnyResult<()> + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The arena must have a positive width and height.
    InvalidArena {
        /// Rejected arena size.
        size: Vec2,
    },
    /// The window must have a positive width and height.
    InvalidWindow {
        /// Rejected window size.
        size: Vec2,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArena { size } => {
                write!(f, "arena size must be positive (received {size})")
            }
            Self::InvalidWindow { size } => {
                write!(f, "window size must be positive (received {size})")
            }
        }
    }
}

impl Error for RenderingError {}
