//! Touch arbitration between the sheet drag and a child scroll region
//!
//! Evaluated synchronously when a touch stream starts, before either gesture
//! claims it. The child's scroll gesture waits for the sheet's drag to fail,
//! so the sheet always gets first refusal; these functions decide whether it
//! takes the stream.

use crate::events::{TouchStart, TouchTarget};
use crate::scroll::ScrollMetrics;

/// Why a touch stream went where it went
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arbitration {
    /// No child region to compete with
    NoChildRegion,
    /// Upward stream and the sheet can still grow
    Expand,
    /// Upward stream but the sheet is at its largest point
    AtLargest,
    /// Downward stream on the handle while the child is scrolled
    HandlePull,
    /// Downward stream inside scrolled content
    ChildScrolled,
    /// Downward stream, child at top, sheet can shrink or be dismissed
    ShrinkOrDismiss,
    /// Downward stream, child at top, nowhere for the sheet to go
    Pinned,
}

impl Arbitration {
    /// Whether the sheet's drag takes the stream
    pub fn allows_sheet_drag(&self) -> bool {
        matches!(
            self,
            Arbitration::NoChildRegion
                | Arbitration::Expand
                | Arbitration::HandlePull
                | Arbitration::ShrinkOrDismiss
        )
    }
}

/// Snapshot of the sheet and its child at touch-down
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArbitrationInput {
    pub touch: TouchStart,
    /// Height of the size the sheet is resting at
    pub current_height: f32,
    /// Smallest snap point height
    pub min_height: f32,
    /// Largest snap point height
    pub max_height: f32,
    pub dismissable: bool,
    /// Height of the pull bar strip at the top of the sheet
    pub handle_height: f32,
    /// Bound child region, if any
    pub child: Option<ScrollMetrics>,
}

/// Touches on interactive controls never start a sheet drag
pub fn should_receive_touch(target: TouchTarget) -> bool {
    target != TouchTarget::Control
}

/// Decide who owns a touch stream
pub fn arbitrate(input: &ArbitrationInput) -> Arbitration {
    let Some(child) = input.child else {
        return Arbitration::NoChildRegion;
    };

    if input.touch.velocity.y < 0.0 {
        return if input.max_height > input.current_height {
            Arbitration::Expand
        } else {
            Arbitration::AtLargest
        };
    }

    if !child.is_at_top() {
        return if input.touch.location.y <= input.handle_height {
            Arbitration::HandlePull
        } else {
            Arbitration::ChildScrolled
        };
    }

    if input.min_height < input.current_height || input.dismissable {
        Arbitration::ShrinkOrDismiss
    } else {
        Arbitration::Pinned
    }
}

/// Whether the sheet's drag gesture may begin for this stream
pub fn should_begin_drag(input: &ArbitrationInput) -> bool {
    if !should_receive_touch(input.touch.target) {
        return false;
    }
    let verdict = arbitrate(input);
    tracing::trace!(?verdict, "touch arbitration");
    verdict.allows_sheet_drag()
}
