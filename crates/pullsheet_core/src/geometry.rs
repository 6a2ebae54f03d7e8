//! Sheet geometry
//!
//! Maps abstract [`SheetSize`] requests to concrete heights in the current
//! [`Viewport`]. Heights are always resolved on demand; the viewport can change
//! between two calls (rotation, split view) and nothing here caches a result.

use serde::{Deserialize, Serialize};

/// Gap kept between a full-screen sheet and the top safe-area edge
pub const FULL_SCREEN_TOP_MARGIN: f32 = 20.0;

/// Requested sheet size
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSize {
    /// Fixed height in logical pixels
    Fixed(f32),
    /// Tallest size the viewport allows
    FullScreen,
}

impl SheetSize {
    /// Resolve this size against a viewport
    pub fn height(&self, viewport: &Viewport) -> f32 {
        viewport.height_for(Some(*self))
    }
}

/// Host viewport metrics
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Top safe-area inset (status bar, notch)
    #[serde(default)]
    pub top_safe_inset: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            top_safe_inset: 0.0,
        }
    }

    /// Builder: set the top safe-area inset
    pub fn with_top_inset(mut self, inset: f32) -> Self {
        self.top_safe_inset = inset;
        self
    }

    /// Concrete height for a size request
    ///
    /// `None` resolves to 0. Negative or non-finite results reduce to 0.
    pub fn height_for(&self, size: Option<SheetSize>) -> f32 {
        let height = match size {
            None => 0.0,
            Some(SheetSize::Fixed(height)) => height,
            Some(SheetSize::FullScreen) => {
                self.height - self.top_safe_inset - FULL_SCREEN_TOP_MARGIN
            }
        };
        sanitize(height)
    }

    /// Width of the sheet container, capped at `max_width`
    pub fn sheet_width(&self, max_width: f32) -> f32 {
        sanitize(self.width.min(max_width))
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
