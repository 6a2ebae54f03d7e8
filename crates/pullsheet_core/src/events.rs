//! Gesture input model
//!
//! Platform-agnostic drag samples and touch targets. Hosts translate their
//! native pan/tap recognizers into these types before handing them to a sheet.

use serde::{Deserialize, Serialize};

/// Event type identifier consumed by [`StateTransitions`](crate::fsm::StateTransitions)
pub type EventType = u32;

/// Drag lifecycle events
pub mod event_types {
    use super::EventType;

    pub const DRAG_BEGIN: EventType = 1;
    pub const DRAG_CHANGE: EventType = 2;
    /// Drag released and resolved to a snap point
    pub const DRAG_COMMIT: EventType = 3;
    /// Drag released and resolved to a dismissal
    pub const DRAG_DISMISS: EventType = 4;
    /// Drag cancelled or failed
    pub const DRAG_CANCEL: EventType = 5;
    /// The settle animation following a drag finished
    pub const SETTLED: EventType = 10;
}

/// 2D point or vector in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Phase of a drag sample
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    /// Handled like `Cancelled`
    Failed,
}

/// One sample from the host's drag recognizer
///
/// `translation` is cumulative since the gesture started, in the sheet's
/// superview coordinates (y grows downward). `velocity` is in pixels per
/// second with the same orientation: positive `y` moves the finger down.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragSample {
    pub phase: DragPhase,
    pub translation: Point,
    #[serde(default)]
    pub velocity: Point,
}

impl DragSample {
    pub fn new(phase: DragPhase, translation_y: f32, velocity_y: f32) -> Self {
        Self {
            phase,
            translation: Point::new(0.0, translation_y),
            velocity: Point::new(0.0, velocity_y),
        }
    }

    pub fn began() -> Self {
        Self::new(DragPhase::Began, 0.0, 0.0)
    }

    pub fn changed(translation_y: f32) -> Self {
        Self::new(DragPhase::Changed, translation_y, 0.0)
    }

    pub fn ended(translation_y: f32, velocity_y: f32) -> Self {
        Self::new(DragPhase::Ended, translation_y, velocity_y)
    }

    pub fn cancelled(translation_y: f32) -> Self {
        Self::new(DragPhase::Cancelled, translation_y, 0.0)
    }
}

/// What kind of element a touch landed on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchTarget {
    /// An interactive control (button, switch, text field)
    Control,
    /// The pull bar / handle strip at the top of the sheet
    Handle,
    /// Anything else inside the sheet
    #[default]
    Content,
}

/// The start of a candidate touch stream, offered to arbitration
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchStart {
    /// Element the touch landed on
    #[serde(default)]
    pub target: TouchTarget,
    /// Location relative to the top-left corner of the sheet container
    pub location: Point,
    /// Initial velocity of the stream in pixels per second
    #[serde(default)]
    pub velocity: Point,
}

impl TouchStart {
    pub fn new(target: TouchTarget, location_y: f32, velocity_y: f32) -> Self {
        Self {
            target,
            location: Point::new(0.0, location_y),
            velocity: Point::new(0.0, velocity_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_from_json() {
        let sample: DragSample =
            serde_json::from_str(r#"{"phase":"ended","translation":{"x":0,"y":-40}}"#).unwrap();
        assert_eq!(sample.phase, DragPhase::Ended);
        assert_eq!(sample.translation.y, -40.0);
        assert_eq!(sample.velocity, Point::ZERO);
    }
}
