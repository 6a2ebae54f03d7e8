//! Rendered container geometry
//!
//! The host draws the sheet from this snapshot every frame. Heights are in
//! points; `translate_y` pushes the sheet down from its resting position.

use pullsheet_animation::TrackId;
use pullsheet_core::DragFrame;
use serde::Serialize;

use crate::config::Color;

pub(crate) const HEIGHT: TrackId = 0;
pub(crate) const TRANSLATE_Y: TrackId = 1;
pub(crate) const OVERLAY_ALPHA: TrackId = 2;

/// What the host should render
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ContainerState {
    pub width: f32,
    pub height: f32,
    pub translate_y: f32,
    pub corner_radius: f32,
    pub handle_color: Color,
    /// Dimming overlay; its alpha animates during present and dismissal
    pub overlay: Color,
}

impl ContainerState {
    pub(crate) fn new(
        width: f32,
        height: f32,
        corner_radius: f32,
        handle_color: Color,
        overlay: Color,
    ) -> Self {
        Self {
            width,
            height,
            translate_y: 0.0,
            corner_radius,
            handle_color,
            overlay,
        }
    }

    /// Current value of an animated track
    pub(crate) fn track(&self, track: TrackId) -> f32 {
        match track {
            HEIGHT => self.height,
            TRANSLATE_Y => self.translate_y,
            _ => self.overlay.a,
        }
    }

    pub(crate) fn set_track(&mut self, track: TrackId, value: f32) {
        match track {
            HEIGHT => self.height = value.max(0.0),
            TRANSLATE_Y => self.translate_y = value,
            _ => self.overlay.a = value.clamp(0.0, 1.0),
        }
    }

    pub(crate) fn apply_frame(&mut self, frame: DragFrame) {
        self.height = frame.height;
        self.translate_y = frame.translate_y;
    }
}
